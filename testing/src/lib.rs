//! # Campus Testing
//!
//! Testing utilities for Campus client flows.
//!
//! This crate provides:
//! - [`FixedClock`] for deterministic timestamps
//! - [`MockCheckoutApi`], a scripted in-memory backend with a call log
//! - [`ReducerTest`], a Given-When-Then harness for reducers
//! - Fixtures and proptest strategies for commerce types
//!
//! ## Example
//!
//! ```ignore
//! use campus_testing::{fixtures, MockCheckoutApi};
//!
//! #[tokio::test]
//! async fn loads_cart() {
//!     let api = MockCheckoutApi::new().with_cart(Ok(fixtures::cart()));
//!     let store = CheckoutStore::new(CheckoutState::default(), CheckoutReducer, env(api.clone()));
//!
//!     store.send(CheckoutAction::LoadCart).await.unwrap().wait().await;
//!
//!     assert_eq!(api.calls().len(), 2);
//! }
//! ```

use chrono::{DateTime, Utc};
use campus_core::environment::Clock;

mod api_mock;

pub use api_mock::{ApiCall, MockCheckoutApi};
pub use reducer_test::{assertions, ReducerTest};

/// Mock implementations of environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use campus_testing::mocks::FixedClock;
    /// use campus_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone, Copy)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Canned backend payloads
pub mod fixtures {
    use campus_api::{
        CartId, CartLineItem, CartSummary, CreatedOrder, Decimal, OrderId, PaymentMethod,
    };

    /// A two-item USD cart totalling $270.60
    #[must_use]
    pub fn cart() -> CartSummary {
        CartSummary {
            cart_id: CartId::new("cart-42"),
            items: vec![
                CartLineItem {
                    id: "course-1".to_string(),
                    name: "Mindful Mornings".to_string(),
                    quantity: 1,
                    line_total: Decimal::new(14999, 2),
                },
                CartLineItem {
                    id: "course-2".to_string(),
                    name: "Breathwork Basics".to_string(),
                    quantity: 1,
                    line_total: Decimal::new(9999, 2),
                },
            ],
            subtotal: Decimal::new(24998, 2),
            discount: Decimal::ZERO,
            tax: Decimal::new(2062, 2),
            total: Decimal::new(27060, 2),
            currency: "USD".to_string(),
        }
    }

    /// A cart with no line items
    #[must_use]
    pub fn empty_cart() -> CartSummary {
        CartSummary {
            cart_id: CartId::new("cart-0"),
            items: Vec::new(),
            subtotal: Decimal::ZERO,
            discount: Decimal::ZERO,
            tax: Decimal::ZERO,
            total: Decimal::ZERO,
            currency: "USD".to_string(),
        }
    }

    /// Backend listing with both supported providers enabled
    #[must_use]
    pub fn payment_methods() -> Vec<PaymentMethod> {
        vec![
            PaymentMethod {
                code: "stripe".to_string(),
                name: "Credit / debit card".to_string(),
                enabled: true,
            },
            PaymentMethod {
                code: "razorpay".to_string(),
                name: "UPI / netbanking".to_string(),
                enabled: true,
            },
        ]
    }

    /// Order returned by `POST /orders`
    #[must_use]
    pub fn created_order() -> CreatedOrder {
        CreatedOrder {
            id: OrderId::new("991"),
            order_number: "ORD-2025-0991".to_string(),
        }
    }
}

/// Test helpers
pub mod helpers {
    /// Install a test tracing subscriber (idempotent)
    ///
    /// Honours `RUST_LOG`; output is captured by the test harness.
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    }
}

/// Property-based testing strategies
pub mod properties {
    use proptest::prelude::*;

    /// Text with at least one non-whitespace character
    pub fn non_blank_text() -> impl Strategy<Value = String> {
        "[ ]{0,2}[A-Za-z0-9][A-Za-z0-9 ,.'-]{0,30}"
    }

    /// Text made only of whitespace (including the empty string)
    pub fn blank_text() -> impl Strategy<Value = String> {
        "[ \t]{0,5}"
    }

    /// Addresses of the form `local@domain.tld`
    pub fn valid_email() -> impl Strategy<Value = String> {
        ("[a-z0-9._+-]{1,12}", "[a-z0-9-]{1,10}", "[a-z]{2,6}")
            .prop_map(|(local, domain, tld)| format!("{local}@{domain}.{tld}"))
    }

    /// Strings that are not `local@domain.tld`
    pub fn invalid_email() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-z0-9]{1,12}",
            "[a-z0-9]{1,8}@[a-z0-9]{1,8}",
            "@[a-z0-9]{1,8}\\.[a-z]{2,4}",
            "[a-z0-9]{1,8}@\\.[a-z]{2,4}",
            "[a-z0-9]{1,4} [a-z0-9]{1,4}@[a-z0-9]{1,8}\\.[a-z]{2,4}",
        ]
    }
}

pub use mocks::{test_clock, FixedClock};
