pub mod error;
pub mod extract;
pub mod rest;

pub use error::ApiError;
