//! contains utils used in splitting inputs and parameters

pub mod files;
pub mod parameters;

pub use files::*;
pub use parameters::*;
