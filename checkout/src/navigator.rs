//! Checkout steps and the transitions between them
//!
//! ```text
//! LoadingCart ─► ReviewingCart ─► EnteringBilling ─► SelectingPayment ─► Submitting ─► Confirmed
//!                      ◄──────────────── retreat ◄─────────┘                  │
//!                                                          ▲                  │
//!                                                          └──── failure ─────┘
//! ```
//!
//! [`advance`] validates only the current step. [`retreat`] never validates.
//! Neither moves while a request is in flight or after confirmation.

use crate::form::CheckoutForm;
use crate::validator::{self, FieldErrors};
use campus_api::{CreatedOrder, OrderId};
use chrono::{DateTime, Utc};

/// Progress of an order submission
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitStage {
    /// `POST /orders` in flight
    CreatingOrder,
    /// `POST /orders/{id}/process` in flight for this order
    ProcessingOrder(CreatedOrder),
}

/// Details shown once checkout completes
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Confirmation {
    /// Backend order id
    pub order_id: OrderId,
    /// Order number exactly as returned by the backend
    pub order_number: String,
    /// When the order was confirmed
    pub confirmed_at: DateTime<Utc>,
}

/// Where the customer is in the checkout
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CheckoutStep {
    /// Waiting for the cart snapshot
    #[default]
    LoadingCart,
    /// Reviewing line items and totals
    ReviewingCart,
    /// Filling in billing details
    EnteringBilling,
    /// Choosing a payment method
    SelectingPayment,
    /// Order submission in flight
    Submitting(SubmitStage),
    /// Order created and processed (terminal)
    Confirmed(Confirmation),
}

impl CheckoutStep {
    /// Stable step index
    ///
    /// `ReviewingCart = 0` through `Confirmed = 4`. `LoadingCart` shares index 0
    /// with the cart review it turns into.
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::LoadingCart | Self::ReviewingCart => 0,
            Self::EnteringBilling => 1,
            Self::SelectingPayment => 2,
            Self::Submitting(_) => 3,
            Self::Confirmed(_) => 4,
        }
    }

    /// Whether a request for this step is in flight
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting(_))
    }

    /// Whether checkout has completed
    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed(_))
    }

    /// Short name for logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::LoadingCart => "loading_cart",
            Self::ReviewingCart => "reviewing_cart",
            Self::EnteringBilling => "entering_billing",
            Self::SelectingPayment => "selecting_payment",
            Self::Submitting(SubmitStage::CreatingOrder) => "creating_order",
            Self::Submitting(SubmitStage::ProcessingOrder(_)) => "processing_order",
            Self::Confirmed(_) => "confirmed",
        }
    }
}

/// Outcome of [`advance`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Move to this step
    Moved(CheckoutStep),
    /// The payment step is valid: submit the order
    Submit,
    /// Validation failed; stay put and show these errors
    Blocked(FieldErrors),
    /// Nothing to do from this step
    Ignored,
}

/// Try to move forward from `step`
///
/// Only the fields of the current step are validated.
#[must_use]
pub fn advance(step: &CheckoutStep, form: &CheckoutForm) -> Transition {
    let (errors, next) = match step {
        CheckoutStep::ReviewingCart => (
            validator::validate_cart(form.cart.as_ref()),
            CheckoutStep::EnteringBilling,
        ),
        CheckoutStep::EnteringBilling => (
            validator::validate_billing(&form.billing),
            CheckoutStep::SelectingPayment,
        ),
        CheckoutStep::SelectingPayment => {
            let errors = validator::validate_payment(&form.payment);
            return if errors.is_empty() {
                Transition::Submit
            } else {
                Transition::Blocked(errors)
            };
        },
        CheckoutStep::LoadingCart | CheckoutStep::Submitting(_) | CheckoutStep::Confirmed(_) => {
            return Transition::Ignored;
        },
    };

    if errors.is_empty() {
        Transition::Moved(next)
    } else {
        Transition::Blocked(errors)
    }
}

/// Step one back from `step`, if allowed
///
/// Returns `None` at the first step, while loading or submitting, and after
/// confirmation.
#[must_use]
pub const fn retreat(step: &CheckoutStep) -> Option<CheckoutStep> {
    match step {
        CheckoutStep::EnteringBilling => Some(CheckoutStep::ReviewingCart),
        CheckoutStep::SelectingPayment => Some(CheckoutStep::EnteringBilling),
        CheckoutStep::LoadingCart
        | CheckoutStep::ReviewingCart
        | CheckoutStep::Submitting(_)
        | CheckoutStep::Confirmed(_) => None,
    }
}
