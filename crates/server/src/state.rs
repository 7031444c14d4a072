use std::sync::Arc;

use common::OperationLog;
use sea_orm::DatabaseConnection;
use service::auth::{AuthService, SeaOrmAdminRepository, TokenIssuer};
use service::catalog::{ProductService, SeaOrmProductRepository};
use service::orders::{OrderService, SeaOrmOrderRepository};

/// Shared by every handler; cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    pub products: Arc<ProductService<SeaOrmProductRepository>>,
    pub orders: Arc<OrderService<SeaOrmOrderRepository>>,
    pub auth: Arc<AuthService<SeaOrmAdminRepository>>,
    pub oplog: Arc<dyn OperationLog>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, oplog: Arc<dyn OperationLog>, issuer: Arc<dyn TokenIssuer>) -> Self {
        let products = ProductService::new(db.clone(), Arc::new(SeaOrmProductRepository::new(oplog.clone())));
        let orders = OrderService::new(db.clone(), Arc::new(SeaOrmOrderRepository::new(oplog.clone())));
        let auth = AuthService::new(db, Arc::new(SeaOrmAdminRepository::new(oplog.clone())), issuer);
        Self { products: Arc::new(products), orders: Arc::new(orders), auth: Arc::new(auth), oplog }
    }
}
