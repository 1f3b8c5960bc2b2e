#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod validation;

pub use error::Error;
pub use validation::{Validation, ValidationError, validate_answer};
