//! Types shared between the relay's feature crates and its HTTP layer

mod error;

pub use error::{ErrorBody, ErrorDetail, HttpError};
