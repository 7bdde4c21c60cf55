//! Configuration validation
//!
//! Rejects configurations the trainer cannot run before any network is built.

mod error;
mod validator;

#[cfg(test)]
mod proptests;

pub use error::ValidationError;
pub use validator::validate_config;
