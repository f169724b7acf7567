use crate::Errors;
use geo::CoordFloat;
use std::fmt::Debug;
use std::str::FromStr;

mod private {
    pub trait Sealed {}

    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// Element width of box arrays accepted by the kernels
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementType {
    F32,
    F64,
}

impl FromStr for ElementType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "f32" | "float32" | "float" => Ok(ElementType::F32),
            "f64" | "float64" | "double" => Ok(ElementType::F64),
            other => Err(Errors::UnsupportedElementType(other.to_string()).into()),
        }
    }
}

/// Floating point types the box kernels are instantiated for.
///
/// The trait is sealed: only `f32` and `f64` implement it, so a kernel never
/// runs on an unsupported element type and never mixes widths within a call.
///
pub trait BoxFloat: CoordFloat + Debug + Default + Send + Sync + private::Sealed + 'static {
    const ELEMENT_TYPE: ElementType;
    const HALF: Self;
    const TWO_PI: Self;

    fn from_f64_lossy(v: f64) -> Self;
}

impl BoxFloat for f32 {
    const ELEMENT_TYPE: ElementType = ElementType::F32;
    const HALF: Self = 0.5;
    const TWO_PI: Self = std::f32::consts::TAU;

    fn from_f64_lossy(v: f64) -> Self {
        v as f32
    }
}

impl BoxFloat for f64 {
    const ELEMENT_TYPE: ElementType = ElementType::F64;
    const HALF: Self = 0.5;
    const TWO_PI: Self = std::f64::consts::TAU;

    fn from_f64_lossy(v: f64) -> Self {
        v
    }
}
