//! # Campus Checkout
//!
//! Headless multi-step checkout for the Campus e-learning platform.
//!
//! ```text
//! LoadingCart ─► ReviewingCart ─► EnteringBilling ─► SelectingPayment ─► Submitting ─► Confirmed
//!                                                            ▲                 │
//!                                                            └──── failure ────┘
//! ```
//!
//! The flow is a [`CheckoutReducer`] run by a [`CheckoutStore`]:
//!
//! - **Cart Summary Loader** ([`loader`]): `GET /cart` with retry, plus
//!   `GET /payment-methods` to narrow the payment choice
//! - **Step Navigator** ([`navigator`]): explicit steps, forward moves gated on
//!   per-step validation
//! - **Billing Form Validator** ([`validator`]): pure field → message map
//! - **Order Submitter** ([`submitter`]): create order, then process it;
//!   a created order survives a failed payment so a retry never double-orders
//! - **Confirmation View** ([`summary`]): money formatting and confirmation text
//!
//! ## Example
//!
//! ```no_run
//! use campus_api::{HttpCheckoutApi, PaymentProvider, Session};
//! use campus_checkout::{CheckoutAction, CheckoutEnvironment, CheckoutReducer, CheckoutState, CheckoutStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = Session::with_token("token");
//! let api = HttpCheckoutApi::new("http://localhost:8000/api/v1", session)?;
//! let store = CheckoutStore::new(
//!     CheckoutState::default(),
//!     CheckoutReducer,
//!     CheckoutEnvironment::new(Arc::new(api)),
//! );
//!
//! store.send(CheckoutAction::LoadCart).await?.wait().await;
//! store.send(CheckoutAction::Advance).await?;
//! // ... edit billing, advance, select a payment method, advance again
//! store.send(CheckoutAction::SelectPayment(PaymentProvider::Stripe)).await?;
//!
//! // Leaving checkout: drop anything still in flight
//! store.dispose();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod form;
pub mod loader;
pub mod navigator;
pub mod reducer;
pub mod submitter;
pub mod summary;
pub mod validator;

pub use config::{CheckoutConfig, ConfigError};
pub use form::{BillingField, BillingInfo, CheckoutForm, PaymentSelection};
pub use navigator::{CheckoutStep, Confirmation, SubmitStage, Transition};
pub use reducer::{
    CheckoutAction, CheckoutEnvironment, CheckoutReducer, CheckoutState, CheckoutStore,
};
pub use summary::{format_money, SummaryView};
pub use validator::{validate_billing, CheckoutField, FieldErrors};
