use utoipa::OpenApi;
use utoipa::openapi::OpenApi as OpenApiSpec;
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        cart::{AddToCartRequest, CartCleared, CartItemBody, CartList, UpdateQuantityRequest},
        orders::{CreateOrderRequest, OrderCreated, OrderLineRequest, OrderList, OrderWithItems, UpdateStatusRequest},
        payments::{PaymentCallbackRequest, PaymentConfirmed},
    },
    models::{CartItem, Order, OrderItem},
    response::{Empty, ErrorResponse},
    routes::{cart, health, orders, payments, recommend},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::readiness,
        orders::list_orders,
        orders::list_user_orders,
        orders::create_order,
        orders::get_order,
        orders::update_order_status,
    ),
    components(
        schemas(
            Order,
            OrderItem,
            CreateOrderRequest,
            OrderLineRequest,
            UpdateStatusRequest,
            OrderCreated,
            OrderList,
            OrderWithItems,
            Empty,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Orders", description = "Order placement and status transitions"),
    )
)]
pub struct OrderApiDoc;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::readiness,
        cart::add_to_cart,
        cart::cart_list,
        cart::update_quantity,
        cart::remove_from_cart,
        cart::clear_cart,
    ),
    components(
        schemas(
            CartItem,
            AddToCartRequest,
            UpdateQuantityRequest,
            CartList,
            CartItemBody,
            CartCleared,
            Empty,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Cart", description = "Per-user cart lines"),
    )
)]
pub struct CartApiDoc;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::readiness,
        payments::payment_callback,
    ),
    components(
        schemas(PaymentCallbackRequest, PaymentConfirmed, ErrorResponse)
    ),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Payments", description = "Payment confirmation relay"),
    )
)]
pub struct PaymentApiDoc;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::readiness,
        recommend::recommend_for_user,
    ),
    components(schemas(recommend::Recommendations)),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Recommendations", description = "Product recommendations"),
    )
)]
pub struct RecommendApiDoc;

pub fn scalar_docs<D: OpenApi>() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", D::openapi())
}
