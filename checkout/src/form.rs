//! Local form state collected during checkout

use campus_api::{CartSummary, PaymentMethod, PaymentProvider};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Billing form fields
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingField {
    /// Full name
    Name,
    /// Email address
    Email,
    /// Street address
    Address,
    /// City
    City,
    /// State or region
    State,
    /// Postal code
    Zip,
    /// Country
    Country,
}

impl BillingField {
    /// Every billing field, in form order
    pub const ALL: [Self; 7] = [
        Self::Name,
        Self::Email,
        Self::Address,
        Self::City,
        Self::State,
        Self::Zip,
        Self::Country,
    ];

    /// Fields that must be non-blank
    pub const REQUIRED: [Self; 5] = [Self::Name, Self::Email, Self::Address, Self::City, Self::Zip];

    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Email => "Email",
            Self::Address => "Address",
            Self::City => "City",
            Self::State => "State",
            Self::Zip => "ZIP code",
            Self::Country => "Country",
        }
    }
}

impl fmt::Display for BillingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Billing details entered by the customer
///
/// Starts empty and is edited field by field. Nothing is sent to the backend
/// until the order is submitted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingInfo {
    /// Full name
    pub name: String,
    /// Email address
    pub email: String,
    /// Street address
    pub address: String,
    /// City
    pub city: String,
    /// State or region
    pub state: String,
    /// Postal code
    pub zip: String,
    /// Country
    pub country: String,
}

impl BillingInfo {
    /// Current value of `field`
    #[must_use]
    pub fn get(&self, field: BillingField) -> &str {
        match field {
            BillingField::Name => &self.name,
            BillingField::Email => &self.email,
            BillingField::Address => &self.address,
            BillingField::City => &self.city,
            BillingField::State => &self.state,
            BillingField::Zip => &self.zip,
            BillingField::Country => &self.country,
        }
    }

    /// Replace the value of `field`
    pub fn set(&mut self, field: BillingField, value: impl Into<String>) {
        let slot = match field {
            BillingField::Name => &mut self.name,
            BillingField::Email => &mut self.email,
            BillingField::Address => &mut self.address,
            BillingField::City => &mut self.city,
            BillingField::State => &mut self.state,
            BillingField::Zip => &mut self.zip,
            BillingField::Country => &mut self.country,
        };
        *slot = value.into();
    }

    /// Single-line postal address sent as `billing_address`
    ///
    /// `"12 Lake Road, Pune, MH 411001, India"`; blank parts are skipped.
    #[must_use]
    pub fn billing_address(&self) -> String {
        let region = [self.state.trim(), self.zip.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        [self.address.trim(), self.city.trim(), region.as_str(), self.country.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Payment provider choice, constrained to the supported set
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentSelection {
    supported: Vec<PaymentProvider>,
    selected: Option<PaymentProvider>,
}

impl Default for PaymentSelection {
    fn default() -> Self {
        Self {
            supported: PaymentProvider::ALL.to_vec(),
            selected: None,
        }
    }
}

impl PaymentSelection {
    /// Providers that can currently be chosen
    #[must_use]
    pub fn supported(&self) -> &[PaymentProvider] {
        &self.supported
    }

    /// The chosen provider, if any
    #[must_use]
    pub const fn selected(&self) -> Option<PaymentProvider> {
        self.selected
    }

    /// The chosen provider, only if it is still supported
    #[must_use]
    pub fn valid_selection(&self) -> Option<PaymentProvider> {
        self.selected.filter(|provider| self.supported.contains(provider))
    }

    /// Choose `provider`
    ///
    /// Returns `false` and leaves the selection unchanged when the provider is
    /// not in the supported set.
    pub fn select(&mut self, provider: PaymentProvider) -> bool {
        if self.supported.contains(&provider) {
            self.selected = Some(provider);
            true
        } else {
            false
        }
    }

    /// Narrow the supported set to what the backend reports as enabled
    ///
    /// Unknown provider codes are ignored. A selection that is no longer
    /// supported is cleared.
    pub fn narrow(&mut self, methods: &[PaymentMethod]) {
        let mut supported = Vec::new();
        for provider in methods
            .iter()
            .filter(|method| method.enabled)
            .filter_map(PaymentMethod::provider)
        {
            if !supported.contains(&provider) {
                supported.push(provider);
            }
        }

        self.supported = supported;
        if self.valid_selection().is_none() {
            self.selected = None;
        }
    }
}

/// Everything the customer has entered or been shown, held for one checkout
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    /// Cart snapshot, once loaded
    pub cart: Option<CartSummary>,
    /// Billing details
    pub billing: BillingInfo,
    /// Payment provider choice
    pub payment: PaymentSelection,
    /// Optional free-form notes sent with the order
    pub customer_notes: String,
}

impl CheckoutForm {
    /// Notes to send, `None` when blank
    #[must_use]
    pub fn notes(&self) -> Option<String> {
        let notes = self.customer_notes.trim();
        (!notes.is_empty()).then(|| notes.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can unwrap
mod tests {
    use super::*;

    fn method(code: &str, enabled: bool) -> PaymentMethod {
        PaymentMethod {
            code: code.to_string(),
            name: code.to_string(),
            enabled,
        }
    }

    #[test]
    fn set_and_get_every_field() {
        let mut billing = BillingInfo::default();
        for field in BillingField::ALL {
            billing.set(field, field.label());
        }
        for field in BillingField::ALL {
            assert_eq!(billing.get(field), field.label());
        }
    }

    #[test]
    fn billing_address_skips_blank_parts() {
        let billing = BillingInfo {
            address: " 12 Lake Road ".to_string(),
            city: "Pune".to_string(),
            zip: "411001".to_string(),
            country: "India".to_string(),
            ..BillingInfo::default()
        };
        assert_eq!(billing.billing_address(), "12 Lake Road, Pune, 411001, India");

        let billing = BillingInfo {
            state: "MH".to_string(),
            ..billing
        };
        assert_eq!(billing.billing_address(), "12 Lake Road, Pune, MH 411001, India");
    }

    #[test]
    fn billing_info_deserializes_partial_json() {
        let billing: BillingInfo =
            serde_json::from_str(r#"{"name": "Asha", "email": "asha@example.com"}"#).unwrap();
        assert_eq!(billing.name, "Asha");
        assert!(billing.city.is_empty());
    }

    #[test]
    fn selection_rejects_unsupported_provider() {
        let mut payment = PaymentSelection::default();
        payment.narrow(&[method("stripe", true)]);

        assert!(!payment.select(PaymentProvider::Razorpay));
        assert_eq!(payment.selected(), None);
        assert!(payment.select(PaymentProvider::Stripe));
    }

    #[test]
    fn narrowing_clears_stale_selection() {
        let mut payment = PaymentSelection::default();
        assert!(payment.select(PaymentProvider::Razorpay));

        payment.narrow(&[
            method("stripe", true),
            method("razorpay", false),
            method("paypal", true),
        ]);

        assert_eq!(payment.supported(), &[PaymentProvider::Stripe]);
        assert_eq!(payment.selected(), None);
    }

    #[test]
    fn blank_notes_are_omitted() {
        let mut form = CheckoutForm::default();
        form.customer_notes = "   ".to_string();
        assert_eq!(form.notes(), None);

        form.customer_notes = " Gift ".to_string();
        assert_eq!(form.notes(), Some("Gift".to_string()));
    }
}
