//! Wire types for the commerce endpoints

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Backend ids arrive as either JSON numbers or strings
fn flexible_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Identifier of the cart being checked out
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartId(#[serde(deserialize_with = "flexible_id")] String);

impl CartId {
    /// Creates a new `CartId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a created order
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(#[serde(deserialize_with = "flexible_id")] String);

impl OrderId {
    /// Creates a new `OrderId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One line of the cart
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Item identifier (course, bundle, shop item)
    #[serde(alias = "item_id", deserialize_with = "flexible_id")]
    pub id: String,
    /// Display name
    #[serde(alias = "display_name", alias = "title")]
    pub name: String,
    /// Quantity
    #[serde(default = "one")]
    pub quantity: u32,
    /// Server-computed line total
    #[serde(alias = "total")]
    pub line_total: Decimal,
}

const fn one() -> u32 {
    1
}

/// Read-only snapshot of the cart with server-computed pricing
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSummary {
    /// Cart identifier
    #[serde(alias = "id")]
    pub cart_id: CartId,
    /// Line items
    #[serde(default)]
    pub items: Vec<CartLineItem>,
    /// Sum of line totals
    pub subtotal: Decimal,
    /// Total discount applied
    #[serde(default, alias = "discount_total")]
    pub discount: Decimal,
    /// Tax amount
    #[serde(default, alias = "tax_amount")]
    pub tax: Decimal,
    /// Grand total
    #[serde(alias = "grand_total")]
    pub total: Decimal,
    /// ISO 4217 currency code
    #[serde(default = "default_currency", alias = "currency_code")]
    pub currency: String,
}

impl CartSummary {
    /// Whether the cart has no line items
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total quantity across all lines
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Whether `total == subtotal - discount + tax`
    ///
    /// The server is authoritative; this is only used for diagnostics.
    #[must_use]
    pub fn totals_consistent(&self) -> bool {
        self.subtotal - self.discount + self.tax == self.total
    }
}

/// Payment providers the client knows how to hand off to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    /// Stripe
    Stripe,
    /// Razorpay
    Razorpay,
}

impl PaymentProvider {
    /// Every provider the client supports
    pub const ALL: [Self; 2] = [Self::Stripe, Self::Razorpay];

    /// Wire tag
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stripe => "stripe",
            Self::Razorpay => "razorpay",
        }
    }
}

impl fmt::Display for PaymentProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown payment provider tag
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported payment method: {0}")]
pub struct UnknownProvider(pub String);

impl FromStr for PaymentProvider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stripe" => Ok(Self::Stripe),
            "razorpay" => Ok(Self::Razorpay),
            _ => Err(UnknownProvider(s.to_string())),
        }
    }
}

/// A payment method offered by the backend
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    /// Provider tag (`stripe`, `razorpay`, ...)
    #[serde(alias = "id", alias = "provider")]
    pub code: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Whether the method can currently be used
    #[serde(default = "enabled_by_default", alias = "is_active")]
    pub enabled: bool,
}

const fn enabled_by_default() -> bool {
    true
}

impl PaymentMethod {
    /// The provider this method maps to, if the client supports it
    #[must_use]
    pub fn provider(&self) -> Option<PaymentProvider> {
        self.code.parse().ok()
    }
}

/// Body of `POST /orders`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CreateOrderRequest {
    /// Cart being purchased
    pub cart_id: CartId,
    /// Billing name
    pub billing_name: String,
    /// Billing email
    pub billing_email: String,
    /// Single-line billing address
    pub billing_address: String,
    /// Free-form notes from the customer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_notes: Option<String>,
    /// Selected payment provider
    pub payment_method: PaymentProvider,
}

/// Response of `POST /orders` (extra fields are ignored)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedOrder {
    /// Order identifier used in follow-up calls
    pub id: OrderId,
    /// Human-readable order number shown to the customer
    #[serde(deserialize_with = "flexible_id")]
    pub order_number: String,
}

/// Body of `POST /orders/{id}/process`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProcessOrderRequest {
    /// Provider capturing the payment
    pub payment_method: PaymentProvider,
}
