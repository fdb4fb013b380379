use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::services::order_client::OrderStatusClient;

#[derive(Clone)]
pub struct OrderState {
    pub orm: DatabaseConnection,
}

#[derive(Clone)]
pub struct CartState {
    pub orm: DatabaseConnection,
}

#[derive(Clone)]
pub struct PaymentState {
    pub orm: DatabaseConnection,
    pub orders: Arc<dyn OrderStatusClient>,
}
