//! Admin login: credential lookup in the store, then a token exchange with
//! the external auth service.

pub mod issuer;
pub mod repository;
pub mod service;

pub use issuer::{HttpTokenIssuer, TokenIssuer};
pub use repository::{AdminRepository, SeaOrmAdminRepository};
pub use service::AuthService;
