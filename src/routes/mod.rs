use axum::Router;

use crate::{
    server::build_app,
    state::{CartState, OrderState, PaymentState},
};

pub mod cart;
pub mod doc;
pub mod health;
pub mod orders;
pub mod payments;
pub mod recommend;

// Each service binary serves exactly one of these.

pub fn order_api(state: OrderState) -> Router {
    build_app::<doc::OrderApiDoc>(orders::router().with_state(state))
}

pub fn cart_api(state: CartState) -> Router {
    build_app::<doc::CartApiDoc>(cart::router().with_state(state))
}

pub fn payment_relay(state: PaymentState) -> Router {
    build_app::<doc::PaymentApiDoc>(payments::router().with_state(state))
}

pub fn recommend_api() -> Router {
    build_app::<doc::RecommendApiDoc>(recommend::router())
}
