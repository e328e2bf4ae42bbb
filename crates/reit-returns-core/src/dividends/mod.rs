pub mod smoothing;
pub mod yields;
