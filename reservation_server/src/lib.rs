//! # Stock reservation server
//! This module hosts the HTTP front for the stock reservation engine. It is responsible for:
//! Accepting order placement, payment and cancellation requests from storefront clients.
//! Translating engine errors into meaningful HTTP status codes.
//! Running the background worker that returns stock held by orders whose payment window has lapsed.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/orders`: Order placement, and `/api/orders/{order_id}` plus its `/pay` and `/cancel` actions.
//! * `/api/stock/{product_id}/{size_id}`: The current free stock for a product and size.
//! * `/api/search/orders`: Order search for admin tooling.
//! * `/api/test/...`: Stock seeding and order reset endpoints for test rigs.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod expiry_worker;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
