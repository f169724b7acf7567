use crate::Errors;
use anyhow::Result;
use log::debug;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;

/// Selects the execution path of the IoU and NMS kernels
///
/// The sequential executor runs the kernels on the calling thread. A parallel
/// executor owns a dedicated thread pool; it is immutable once built and may be
/// shared by concurrent calls.
///
#[derive(Clone, Debug, Default)]
pub struct Executor {
    pool: Option<Arc<ThreadPool>>,
}

impl Executor {
    pub fn sequential() -> Self {
        Self::default()
    }

    /// Parallel executor with one worker per logical CPU
    ///
    /// Fails with [`Errors::ParallelUnavailable`] on machines that report a single CPU.
    ///
    pub fn parallel() -> Result<Self> {
        ExecutorBuilder::default().build()
    }

    pub fn is_parallel(&self) -> bool {
        self.pool.is_some()
    }

    /// Worker threads available to the kernels
    ///
    pub fn threads(&self) -> usize {
        self.pool.as_ref().map_or(1, |p| p.current_num_threads())
    }

    /// Runs `op` inside the executor's pool, or on the calling thread for the sequential executor
    ///
    pub(crate) fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

/// Builder for the parallel [`Executor`]
///
pub struct ExecutorBuilder {
    threads: usize,
    require_hardware_parallelism: bool,
}

/// Default builder
/// threads count is set to number cpu cores (threads)
///
impl Default for ExecutorBuilder {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}

impl ExecutorBuilder {
    /// Creates a new builder
    ///
    /// # Parameters
    /// * `threads` - number of worker threads in the pool, must be positive.
    ///
    /// The machine is required to report at least 2 CPUs unless
    /// [`ExecutorBuilder::require_hardware_parallelism`] turns the check off.
    ///
    pub fn new(threads: usize) -> Self {
        ExecutorBuilder {
            threads,
            require_hardware_parallelism: true,
        }
    }

    /// When set (the default), building fails on machines that report a single CPU.
    /// When cleared, the pool is built anyway and its workers share the single CPU.
    ///
    pub fn require_hardware_parallelism(mut self, require: bool) -> Self {
        self.require_hardware_parallelism = require;
        self
    }

    pub fn build(self) -> Result<Executor> {
        if self.threads == 0 {
            return Err(
                Errors::ParallelUnavailable("zero worker threads requested".to_string()).into(),
            );
        }

        let cpus = num_cpus::get();
        if self.require_hardware_parallelism && cpus < 2 {
            return Err(Errors::ParallelUnavailable(format!(
                "the machine reports {} CPU, at least 2 are required",
                cpus
            ))
            .into());
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .thread_name(|i| format!("rbox-worker-{}", i))
            .build()
            .map_err(|e| Errors::ParallelUnavailable(e.to_string()))?;

        debug!(
            "Parallel executor is built: {} threads on {} CPUs",
            self.threads, cpus
        );

        Ok(Executor {
            pool: Some(Arc::new(pool)),
        })
    }
}
