use std::{path::Path, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use stock_reservation_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    run_migrations,
    ExpiryQueue,
    OrderFlowApi,
    OrderQueryApi,
    SqliteDatabase,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    expiry_worker::start_expiry_worker,
    routes::{
        health,
        CancelOrderRoute,
        CreateOrderRoute,
        OrderByIdRoute,
        OrdersSearchRoute,
        PayOrderRoute,
        ResetOrdersRoute,
        SetStockRoute,
        StockLevelRoute,
    },
};

pub const EVENT_BUFFER_SIZE: usize = 25;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    // SQLite creates a missing database file, but not a missing directory
    if let Some(dir) = config.database_url.strip_prefix("sqlite://").and_then(|p| Path::new(p).parent()) {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    run_migrations(db.pool()).await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let queue = ExpiryQueue::new();
    let handlers = create_event_handlers();
    let producers = handlers.producers();
    handlers.start_handlers().await;
    if config.disable_expiry_worker {
        warn!("🚀️ The expiry worker is disabled. Stock held by unpaid orders will NOT be returned automatically.");
    } else {
        start_expiry_worker(
            db.clone(),
            queue.clone(),
            producers.clone(),
            config.payment_window,
            config.expiry_poll_interval,
            config.expiry_sweep_interval,
        );
    }
    let srv = create_server_instance(config, db, queue, producers)?;
    Ok(srv.await?)
}

/// Assigns the order lifecycle event handlers.
///
/// The standalone server does not talk to an upstream storefront, so the handlers only write an audit trail to the
/// log. Deployments that need to notify another system subscribe their own hooks here.
fn create_event_handlers() -> EventHandlers {
    let mut hooks = EventHooks::default();
    hooks.on_order_paid(|ev| {
        Box::pin(async move {
            info!(
                "📬️ Order {} has been paid. Its {} reserved units are now allocated for good.",
                ev.order.order_id, ev.order.total_quantity
            );
        })
    });
    hooks.on_order_annulled(|ev| {
        Box::pin(async move {
            info!(
                "📬️ Order {} is now {} and its {} reserved units have been returned to stock.",
                ev.order.order_id, ev.status, ev.order.total_quantity
            );
        })
    });
    EventHandlers::new(EVENT_BUFFER_SIZE, hooks)
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    queue: ExpiryQueue,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let payment_window = config.payment_window;
    let srv = HttpServer::new(move || {
        let order_flow = OrderFlowApi::new(db.clone(), queue.clone(), producers.clone(), payment_window);
        let order_query = OrderQueryApi::new(db.clone());
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("srg::access_log"))
            .app_data(web::Data::new(order_flow))
            .app_data(web::Data::new(order_query));
        let api_scope = web::scope("/api")
            .service(CreateOrderRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(OrdersSearchRoute::<SqliteDatabase>::new())
            .service(PayOrderRoute::<SqliteDatabase>::new())
            .service(CancelOrderRoute::<SqliteDatabase>::new())
            .service(StockLevelRoute::<SqliteDatabase>::new())
            .service(SetStockRoute::<SqliteDatabase>::new())
            .service(ResetOrdersRoute::<SqliteDatabase>::new());
        app.service(health).service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
