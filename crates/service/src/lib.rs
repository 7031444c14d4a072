//! Service layer for the catering admin backend.
//! - Repositories own the SQL, services own the transaction per use case.
//! - Validation and entities come from the `models` crate.
//! - Every failure is a [`errors::ServiceError`].

pub mod auth;
pub mod catalog;
pub mod errors;
pub mod orders;
#[cfg(test)]
pub mod test_support;

pub use errors::ServiceError;
