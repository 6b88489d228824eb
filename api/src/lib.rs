//! # Campus API
//!
//! Typed client for the commerce endpoints used by checkout:
//!
//! - `GET /cart`
//! - `GET /payment-methods`
//! - `POST /orders`
//! - `POST /orders/{id}/process`
//!
//! Authentication goes through an explicit [`Session`] passed to the client at
//! construction. Requests made without an active session fail with
//! [`ApiError::Unauthenticated`] before reaching the network.
//!
//! ## Example
//!
//! ```no_run
//! use campus_api::{CheckoutApi, HttpCheckoutApi, Session};
//!
//! # async fn example() -> Result<(), campus_api::ApiError> {
//! let session = Session::with_token("token");
//! let api = HttpCheckoutApi::new("http://localhost:8000/api/v1", session)?;
//! let cart = api.cart().await?;
//! println!("{} items, total {}", cart.item_count(), cart.total);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod session;
pub mod types;

pub use client::{ApiFuture, CheckoutApi, HttpCheckoutApi};
pub use error::ApiError;
pub use session::Session;
pub use types::{
    CartId, CartLineItem, CartSummary, CreateOrderRequest, CreatedOrder, OrderId, PaymentMethod,
    PaymentProvider, ProcessOrderRequest, UnknownProvider,
};

/// Re-exported so downstream crates share one decimal type for amounts
pub use rust_decimal::Decimal;
