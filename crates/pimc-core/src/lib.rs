#![deny(missing_docs)]
#![doc = "Core value types shared by the PIMC estimator and action crates."]

pub mod errors;
pub mod vector;

pub use errors::{ErrorInfo, PimcError};
pub use vector::{Vec3, Vector, NDIM};
