//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. For this reason, any long, non-cpu-bound operation (e.g. I/O,
//! database operations, etc.) should be expressed as futures or asynchronous functions. Async handlers get executed
//! concurrently by worker threads and thus don't block execution.

use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use log::*;
use stock_reservation_engine::{
    db_types::OrderId,
    order_objects::OrderQueryFilter,
    traits::{OrderManagement, ReservationDatabase},
    OrderFlowApi,
    OrderQueryApi,
};

use crate::{
    data_objects::{NewOrderRequest, ResetResult, StockUpdateRequest},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------

route!(create_order => Post "/orders" impl ReservationDatabase);
/// Route handler for the order creation endpoint
///
/// Clients must supply their customer id in the `SRG-Customer-Id` header. The body carries the recipient details
/// and the order lines. Stock for every line is reserved atomically, so a request either results in a new
/// `WaitingPayment` order with all its stock held, or no order at all.
///
/// Returns 201 with the order and its items on success, and 400 if any line cannot be covered by the available
/// stock.
pub async fn create_order<B: ReservationDatabase>(
    req: HttpRequest,
    body: web::Json<NewOrderRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let customer_id = req
        .headers()
        .get("SRG-Customer-Id")
        .ok_or_else(|| ServerError::InvalidRequestBody("The SRG-Customer-Id header is missing.".to_string()))?
        .to_str()
        .map_err(|e| {
            debug!("💻️ Could not read the SRG-Customer-Id header. {e}");
            ServerError::InvalidRequestBody("The SRG-Customer-Id header is not valid UTF-8.".to_string())
        })?
        .to_string();
    let order = body.into_inner().into_new_order(customer_id);
    debug!("💻️ POST create_order {} for customer {}", order.order_id, order.customer_id);
    let result = api.place_order(order).await.map_err(|e| {
        debug!("💻️ Could not place order. {e}");
        e
    })?;
    Ok(HttpResponse::Created().json(result))
}

route!(order_by_id => Get "/orders/{order_id}" impl OrderManagement);
/// Use `/orders/{order_id}` to fetch a specific order, with its line items, by its order id.
pub async fn order_by_id<B: OrderManagement>(
    path: web::Path<OrderId>,
    api: web::Data<OrderQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET order_by_id({order_id})");
    let order = api.fetch_order(&order_id).await.map_err(|e| {
        debug!("💻️ Could not fetch order. {e}");
        ServerError::BackendError(e.to_string())
    })?;
    match order {
        Some(order) => Ok(HttpResponse::Ok().json(order)),
        None => Err(ServerError::NoRecordFound(format!("Order {order_id} does not exist."))),
    }
}

route!(orders_search => Get "/search/orders" impl OrderManagement);
pub async fn orders_search<B: OrderManagement>(
    query: web::Query<OrderQueryFilter>,
    api: web::Data<OrderQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET orders search for [{query}]");
    let query = query.into_inner();
    let orders = api.search_orders(query).await.map_err(|e| {
        debug!("💻️ Could not fetch orders. {e}");
        ServerError::BackendError(e.to_string())
    })?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(pay_order => Post "/orders/{order_id}/pay" impl ReservationDatabase);
/// Route handler for the payment confirmation endpoint
///
/// Marks a `WaitingPayment` order as `Paid` and cancels its expiry timer. The reserved stock is kept. Paying an
/// order that has already expired, been cancelled, or been paid returns 409 and changes nothing.
pub async fn pay_order<B: ReservationDatabase>(
    path: web::Path<OrderId>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ POST pay_order({order_id})");
    let order = api.confirm_payment(&order_id).await.map_err(|e| {
        debug!("💻️ Could not confirm payment. {e}");
        e
    })?;
    Ok(HttpResponse::Ok().json(order))
}

route!(cancel_order => Post "/orders/{order_id}/cancel" impl ReservationDatabase);
/// Route handler for the order cancellation endpoint
///
/// Cancels a `WaitingPayment` order and returns its reserved stock. Finalized orders return 409.
pub async fn cancel_order<B: ReservationDatabase>(
    path: web::Path<OrderId>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ POST cancel_order({order_id})");
    let order = api.cancel_order(&order_id).await.map_err(|e| {
        debug!("💻️ Could not cancel order. {e}");
        e
    })?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Stock  ----------------------------------------------------

route!(stock_level => Get "/stock/{product_id}/{size_id}" impl OrderManagement);
pub async fn stock_level<B: OrderManagement>(
    path: web::Path<(i64, i64)>,
    api: web::Data<OrderQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let (product_id, size_id) = path.into_inner();
    debug!("💻️ GET stock_level({product_id}, {size_id})");
    let level = api.fetch_stock_level(product_id, size_id).await.map_err(|e| {
        debug!("💻️ Could not fetch stock level. {e}");
        ServerError::BackendError(e.to_string())
    })?;
    match level {
        Some(level) => Ok(HttpResponse::Ok().json(level)),
        None => Err(ServerError::NoRecordFound(format!("No stock record for product {product_id} size {size_id}."))),
    }
}

//----------------------------------------------   Test support  ----------------------------------------------------

route!(set_stock => Put "/test/stock" impl ReservationDatabase);
/// Seeds or replaces the stock level for a product and size. Meant for test rigs and admin tooling, so it is not
/// exposed without the `/test` prefix.
pub async fn set_stock<B: ReservationDatabase>(
    body: web::Json<StockUpdateRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let update = body.into_inner();
    debug!("💻️ PUT set_stock({}, {}) = {}", update.product_id, update.size_id, update.available);
    let level = api.db().set_stock_level(update.product_id, update.size_id, update.available).await.map_err(|e| {
        debug!("💻️ Could not set stock level. {e}");
        e
    })?;
    Ok(HttpResponse::Ok().json(level))
}

route!(reset_orders => Delete "/test/orders" impl ReservationDatabase);
/// Cancels every order still waiting for payment and returns their stock. Meant for test rigs that need a clean
/// slate between scenarios.
pub async fn reset_orders<B: ReservationDatabase>(
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ DELETE reset_orders");
    let cancelled = api.cancel_all_waiting_orders().await.map_err(|e| {
        debug!("💻️ Could not reset orders. {e}");
        e
    })?;
    Ok(HttpResponse::Ok().json(ResetResult { cancelled: cancelled.len() }))
}
