//! Product catalog: repository capability, its sea-orm implementation and
//! the transactional service on top.

pub mod repository;
pub mod service;

pub use repository::{ProductRepository, SeaOrmProductRepository};
pub use service::ProductService;
