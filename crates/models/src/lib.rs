//! Record shapes shared by the repository, service and HTTP layers, with
//! their sea-orm entity definitions and request validation.

pub mod errors;
pub mod db;
pub mod product;
pub mod order;
pub mod admin;

pub use errors::{FieldViolation, Violations};

#[cfg(test)]
mod tests;
