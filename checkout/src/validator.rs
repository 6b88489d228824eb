//! Per-step validation
//!
//! Validators are pure: they return a field-keyed error map and never fail.
//! An empty map means the input is valid. Maps are ordered by field so the
//! same input always yields the same map.

use crate::form::{BillingField, BillingInfo, PaymentSelection};
use campus_api::CartSummary;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

/// Shape accepted for email addresses: `local@domain.tld` without whitespace
pub const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

#[allow(clippy::expect_used)] // Constant pattern, covered by tests
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"));

/// A field that can carry an inline error
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CheckoutField {
    /// The cart as a whole
    Cart,
    /// A billing form field
    Billing(BillingField),
    /// The payment method choice
    PaymentMethod,
}

impl fmt::Display for CheckoutField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cart => f.write_str("cart"),
            Self::Billing(field) => write!(f, "{field}"),
            Self::PaymentMethod => f.write_str("payment method"),
        }
    }
}

/// Field → message map; empty means valid
pub type FieldErrors = BTreeMap<CheckoutField, String>;

/// Whether `email` looks like `local@domain.tld`
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email.trim())
}

/// Check the billing form
///
/// Required fields (name, email, address, city, zip) must be non-blank after
/// trimming, and the email must match [`EMAIL_PATTERN`].
#[must_use]
pub fn validate_billing(billing: &BillingInfo) -> FieldErrors {
    let mut errors = FieldErrors::new();

    for field in BillingField::REQUIRED {
        if billing.get(field).trim().is_empty() {
            errors.insert(
                CheckoutField::Billing(field),
                format!("{} is required", field.label()),
            );
        }
    }

    let email_key = CheckoutField::Billing(BillingField::Email);
    if !errors.contains_key(&email_key) && !is_valid_email(&billing.email) {
        errors.insert(email_key, "Enter a valid email address".to_string());
    }

    errors
}

/// Check that there is something to buy
#[must_use]
pub fn validate_cart(cart: Option<&CartSummary>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    match cart {
        Some(cart) if !cart.is_empty() => {},
        Some(_) => {
            errors.insert(CheckoutField::Cart, "Your cart is empty".to_string());
        },
        None => {
            errors.insert(CheckoutField::Cart, "Your cart has not loaded yet".to_string());
        },
    }
    errors
}

/// Check that a supported payment method is selected
#[must_use]
pub fn validate_payment(payment: &PaymentSelection) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if payment.supported().is_empty() {
        errors.insert(
            CheckoutField::PaymentMethod,
            "No payment methods are currently available".to_string(),
        );
    } else if payment.valid_selection().is_none() {
        errors.insert(
            CheckoutField::PaymentMethod,
            "Choose a payment method".to_string(),
        );
    }
    errors
}
