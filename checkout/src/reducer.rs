//! Checkout reducer
//!
//! Drives one checkout session: cart load, billing entry, payment selection,
//! order submission and confirmation. All network work happens in effects
//! whose results come back as actions.
//!
//! # Partial failure
//!
//! When `POST /orders` succeeds but processing fails, the created order is kept
//! in [`CheckoutState::pending_order`]. The customer is returned to the payment
//! step with a banner naming the order, and the next submission only re-issues
//! the process call for that order. A second order is never created.

use crate::form::{BillingField, CheckoutForm};
use crate::loader;
use crate::navigator::{self, CheckoutStep, Confirmation, SubmitStage, Transition};
use crate::submitter;
use crate::validator::{CheckoutField, FieldErrors};
use campus_api::{
    ApiError, CartSummary, CheckoutApi, CreatedOrder, OrderId, PaymentMethod, PaymentProvider,
};
use campus_core::{smallvec, Clock, Effect, Reducer, SmallVec, SystemClock};
use campus_runtime::{RetryPolicy, Store};
use std::sync::Arc;

/// State of one checkout session
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckoutState {
    /// Current step
    pub step: CheckoutStep,
    /// Cart, billing, payment and notes
    pub form: CheckoutForm,
    /// Inline errors from the last blocked navigation or edit
    pub field_errors: FieldErrors,
    /// Dismissible error banner for remote failures
    pub banner: Option<String>,
    /// Order created by a submission whose processing has not succeeded yet
    pub pending_order: Option<CreatedOrder>,
}

impl CheckoutState {
    /// Cart snapshot, once loaded
    #[must_use]
    pub const fn cart(&self) -> Option<&CartSummary> {
        self.form.cart.as_ref()
    }

    /// Confirmation details, once checkout has completed
    #[must_use]
    pub const fn confirmation(&self) -> Option<&Confirmation> {
        match &self.step {
            CheckoutStep::Confirmed(confirmation) => Some(confirmation),
            _ => None,
        }
    }

    /// Whether the form can still be edited
    const fn is_editable(&self) -> bool {
        !matches!(
            self.step,
            CheckoutStep::Submitting(_) | CheckoutStep::Confirmed(_)
        )
    }

    /// Banner shown when the customer tries to change an order that already exists
    fn locked_order_banner(&self) -> Option<String> {
        self.pending_order.as_ref().map(|order| {
            format!(
                "Order {} has already been placed with these details. Retry the payment to finish it.",
                order.order_number
            )
        })
    }
}

/// Everything that can happen during checkout
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckoutAction {
    // Cart and payment methods
    /// Start (or retry) loading the cart and payment methods
    LoadCart,
    /// `GET /cart` succeeded
    CartLoaded(CartSummary),
    /// `GET /cart` failed after retries
    CartLoadFailed(ApiError),
    /// `GET /payment-methods` succeeded
    PaymentMethodsLoaded(Vec<PaymentMethod>),
    /// `GET /payment-methods` failed
    PaymentMethodsFailed(ApiError),

    // Form input
    /// A billing field changed
    EditBilling {
        /// Field being edited
        field: BillingField,
        /// New value
        value: String,
    },
    /// Customer notes changed
    EditNotes(String),
    /// A payment method was chosen
    SelectPayment(PaymentProvider),

    // Navigation
    /// Continue to the next step (submits from the payment step)
    Advance,
    /// Go back one step
    Retreat,
    /// Hide the error banner
    DismissError,

    // Submission
    /// `POST /orders` succeeded
    OrderCreated(CreatedOrder),
    /// `POST /orders` failed
    OrderCreateFailed(ApiError),
    /// `POST /orders/{id}/process` succeeded
    OrderProcessed {
        /// Order that was processed
        order_id: OrderId,
    },
    /// `POST /orders/{id}/process` failed
    OrderProcessFailed {
        /// Order that failed to process
        order_id: OrderId,
        /// Why
        error: ApiError,
    },
}

/// Injected dependencies
#[derive(Clone)]
pub struct CheckoutEnvironment {
    /// Commerce backend
    pub api: Arc<dyn CheckoutApi>,
    /// Clock for the confirmation timestamp
    pub clock: Arc<dyn Clock>,
    /// Retry policy for the cart load
    pub cart_retry: RetryPolicy,
}

impl CheckoutEnvironment {
    /// Environment with the system clock and default cart retries
    #[must_use]
    pub fn new(api: Arc<dyn CheckoutApi>) -> Self {
        Self {
            api,
            clock: Arc::new(SystemClock),
            cart_retry: RetryPolicy::default(),
        }
    }

    /// Use `clock` for timestamps
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Use `policy` for the cart load
    #[must_use]
    pub fn with_cart_retry(mut self, policy: RetryPolicy) -> Self {
        self.cart_retry = policy;
        self
    }
}

/// Store running one checkout session
pub type CheckoutStore = Store<CheckoutState, CheckoutAction, CheckoutEnvironment, CheckoutReducer>;

/// Checkout reducer
#[derive(Clone, Copy, Debug, Default)]
pub struct CheckoutReducer;

type Effects = SmallVec<[Effect<CheckoutAction>; 4]>;

impl Reducer for CheckoutReducer {
    type State = CheckoutState;
    type Action = CheckoutAction;
    type Environment = CheckoutEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per action keeps transitions in one place
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Effects {
        match action {
            CheckoutAction::LoadCart => {
                if state.step != CheckoutStep::LoadingCart {
                    tracing::debug!(step = state.step.name(), "Cart already loaded");
                    return smallvec![Effect::None];
                }
                state.banner = None;
                smallvec![
                    loader::load_cart(Arc::clone(&env.api), env.cart_retry.clone()),
                    loader::load_payment_methods(Arc::clone(&env.api)),
                ]
            },

            CheckoutAction::CartLoaded(cart) => {
                if state.step == CheckoutStep::LoadingCart {
                    tracing::info!(
                        cart_id = %cart.cart_id,
                        items = cart.items.len(),
                        total = %cart.total,
                        "Cart loaded"
                    );
                    state.form.cart = Some(cart);
                    state.step = CheckoutStep::ReviewingCart;
                    state.banner = None;
                }
                smallvec![Effect::None]
            },

            CheckoutAction::CartLoadFailed(error) => {
                if state.step == CheckoutStep::LoadingCart {
                    tracing::warn!(%error, "Cart load failed");
                    state.banner = Some(format!("We couldn't load your cart. {}", describe(&error)));
                }
                smallvec![Effect::None]
            },

            CheckoutAction::PaymentMethodsLoaded(methods) => {
                if state.is_editable() {
                    state.form.payment.narrow(&methods);
                    tracing::debug!(supported = ?state.form.payment.supported(), "Payment methods loaded");
                }
                smallvec![Effect::None]
            },

            CheckoutAction::PaymentMethodsFailed(error) => {
                tracing::warn!(%error, "Payment methods unavailable; offering all supported providers");
                smallvec![Effect::None]
            },

            CheckoutAction::EditBilling { field, value } => {
                if !state.is_editable() {
                    return smallvec![Effect::None];
                }
                if let Some(banner) = state.locked_order_banner() {
                    tracing::debug!(%field, "Billing locked by pending order");
                    state.banner = Some(banner);
                } else {
                    state.form.billing.set(field, value);
                    state.field_errors.remove(&CheckoutField::Billing(field));
                }
                smallvec![Effect::None]
            },

            CheckoutAction::EditNotes(notes) => {
                if !state.is_editable() {
                    return smallvec![Effect::None];
                }
                match state.locked_order_banner() {
                    Some(banner) => state.banner = Some(banner),
                    None => state.form.customer_notes = notes,
                }
                smallvec![Effect::None]
            },

            CheckoutAction::SelectPayment(provider) => {
                if state.is_editable() {
                    if state.form.payment.select(provider) {
                        state.field_errors.remove(&CheckoutField::PaymentMethod);
                    } else {
                        state.field_errors.insert(
                            CheckoutField::PaymentMethod,
                            format!("{provider} is not available"),
                        );
                    }
                }
                smallvec![Effect::None]
            },

            CheckoutAction::Advance => match navigator::advance(&state.step, &state.form) {
                Transition::Moved(next) => {
                    tracing::debug!(from = state.step.name(), to = next.name(), "Advance");
                    state.step = next;
                    state.field_errors.clear();
                    smallvec![Effect::None]
                },
                Transition::Submit => start_submission(state, env),
                Transition::Blocked(errors) => {
                    tracing::debug!(step = state.step.name(), errors = errors.len(), "Advance blocked");
                    state.field_errors = errors;
                    smallvec![Effect::None]
                },
                Transition::Ignored => {
                    tracing::debug!(step = state.step.name(), "Advance ignored");
                    smallvec![Effect::None]
                },
            },

            CheckoutAction::Retreat => {
                let Some(previous) = navigator::retreat(&state.step) else {
                    return smallvec![Effect::None];
                };
                // A pending order keeps the flow on the payment step
                if let Some(banner) = state.locked_order_banner() {
                    tracing::debug!(step = state.step.name(), "Retreat blocked by pending order");
                    state.banner = Some(banner);
                } else {
                    tracing::debug!(from = state.step.name(), to = previous.name(), "Retreat");
                    state.step = previous;
                    state.field_errors.clear();
                }
                smallvec![Effect::None]
            },

            CheckoutAction::DismissError => {
                state.banner = None;
                smallvec![Effect::None]
            },

            CheckoutAction::OrderCreated(order) => {
                if state.step != CheckoutStep::Submitting(SubmitStage::CreatingOrder) {
                    tracing::debug!(order_id = %order.id, "Ignoring stale order creation");
                    return smallvec![Effect::None];
                }
                let Some(provider) = state.form.payment.valid_selection() else {
                    // Selection is frozen while submitting, so this is unreachable in practice.
                    state.pending_order = Some(order);
                    state.step = CheckoutStep::SelectingPayment;
                    state.banner = Some("Choose a payment method to finish your order.".to_string());
                    return smallvec![Effect::None];
                };

                tracing::info!(order_id = %order.id, order_number = %order.order_number, "Order created");
                state.pending_order = Some(order.clone());
                state.step = CheckoutStep::Submitting(SubmitStage::ProcessingOrder(order.clone()));
                smallvec![submitter::process_order(Arc::clone(&env.api), order.id, provider)]
            },

            CheckoutAction::OrderCreateFailed(error) => {
                if state.step == CheckoutStep::Submitting(SubmitStage::CreatingOrder) {
                    tracing::warn!(%error, "Order creation failed");
                    state.step = CheckoutStep::SelectingPayment;
                    state.banner = Some(format!("We couldn't place your order. {}", describe(&error)));
                }
                smallvec![Effect::None]
            },

            CheckoutAction::OrderProcessed { order_id } => {
                let CheckoutStep::Submitting(SubmitStage::ProcessingOrder(order)) = &state.step else {
                    return smallvec![Effect::None];
                };
                if order.id != order_id {
                    return smallvec![Effect::None];
                }

                let confirmation = Confirmation {
                    order_id,
                    order_number: order.order_number.clone(),
                    confirmed_at: env.clock.now(),
                };
                tracing::info!(
                    order_id = %confirmation.order_id,
                    order_number = %confirmation.order_number,
                    "Checkout confirmed"
                );
                state.step = CheckoutStep::Confirmed(confirmation);
                state.pending_order = None;
                state.banner = None;
                smallvec![Effect::None]
            },

            CheckoutAction::OrderProcessFailed { order_id, error } => {
                let CheckoutStep::Submitting(SubmitStage::ProcessingOrder(order)) = &state.step else {
                    return smallvec![Effect::None];
                };
                if order.id != order_id {
                    return smallvec![Effect::None];
                }

                tracing::warn!(%order_id, order_number = %order.order_number, %error, "Order processing failed");
                state.banner = Some(format!(
                    "Payment failed for order {}. {} Your order has been saved, so you can try again.",
                    order.order_number,
                    describe(&error)
                ));
                state.step = CheckoutStep::SelectingPayment;
                smallvec![Effect::None]
            },
        }
    }
}

/// Enter `Submitting` and start the first request still needed
fn start_submission(state: &mut CheckoutState, env: &CheckoutEnvironment) -> Effects {
    let Some(provider) = state.form.payment.valid_selection() else {
        return smallvec![Effect::None];
    };
    let Some(cart_id) = state.cart().map(|cart| cart.cart_id.clone()) else {
        return smallvec![Effect::None];
    };

    state.field_errors.clear();
    state.banner = None;

    if let Some(order) = state.pending_order.clone() {
        tracing::info!(order_id = %order.id, %provider, "Retrying payment for existing order");
        let order_id = order.id.clone();
        state.step = CheckoutStep::Submitting(SubmitStage::ProcessingOrder(order));
        return smallvec![submitter::process_order(Arc::clone(&env.api), order_id, provider)];
    }

    let request = submitter::order_request(cart_id, &state.form, provider);
    tracing::info!(cart_id = %request.cart_id, %provider, "Submitting order");
    state.step = CheckoutStep::Submitting(SubmitStage::CreatingOrder);
    smallvec![submitter::create_order(Arc::clone(&env.api), request)]
}

/// Customer-facing text for a remote failure
fn describe(error: &ApiError) -> String {
    match error {
        ApiError::Unauthenticated | ApiError::Unauthorized => {
            "Your session has expired. Please sign in again.".to_string()
        },
        ApiError::Timeout => "The server took too long to respond.".to_string(),
        ApiError::RequestFailed(_) => "We couldn't reach the server.".to_string(),
        ApiError::ResponseParseFailed(_) => "The server sent an unexpected response.".to_string(),
        ApiError::Status { status, message } => {
            let message = message.trim();
            if message.is_empty() {
                format!("The server rejected the request (status {status}).")
            } else if message.ends_with(['.', '!', '?', '…']) {
                message.to_string()
            } else {
                format!("{message}.")
            }
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can unwrap
mod tests {
    use super::*;
    use crate::form::BillingInfo;
    use crate::submitter::SUBMIT_ORDER;
    use campus_testing::{assertions, fixtures, test_clock, MockCheckoutApi, ReducerTest};

    fn env() -> CheckoutEnvironment {
        CheckoutEnvironment::new(Arc::new(MockCheckoutApi::happy_path()))
            .with_clock(Arc::new(test_clock()))
    }

    fn billing() -> BillingInfo {
        BillingInfo {
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            address: "12 Lake Road".to_string(),
            city: "Pune".to_string(),
            zip: "411001".to_string(),
            ..BillingInfo::default()
        }
    }

    fn at_step(step: CheckoutStep) -> CheckoutState {
        let mut state = CheckoutState {
            step,
            ..CheckoutState::default()
        };
        state.form.cart = Some(fixtures::cart());
        state.form.billing = billing();
        state
    }

    fn ready_to_pay() -> CheckoutState {
        let mut state = at_step(CheckoutStep::SelectingPayment);
        assert!(state.form.payment.select(PaymentProvider::Stripe));
        state
    }

    fn processing() -> CheckoutState {
        let order = fixtures::created_order();
        let mut state = ready_to_pay();
        state.pending_order = Some(order.clone());
        state.step = CheckoutStep::Submitting(SubmitStage::ProcessingOrder(order));
        state
    }

    #[test]
    fn load_cart_starts_both_requests() {
        ReducerTest::new(CheckoutReducer)
            .with_env(env())
            .given_state(CheckoutState::default())
            .when_action(CheckoutAction::LoadCart)
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 2);
                assertions::assert_has_cancellable_effect(effects, loader::LOAD_CART);
                assertions::assert_has_cancellable_effect(effects, loader::LOAD_PAYMENT_METHODS);
            })
            .run();
    }

    #[test]
    fn cart_loaded_enters_review() {
        ReducerTest::new(CheckoutReducer)
            .with_env(env())
            .given_state(CheckoutState::default())
            .when_action(CheckoutAction::CartLoaded(fixtures::cart()))
            .then_state(|state| {
                assert_eq!(state.step, CheckoutStep::ReviewingCart);
                assert_eq!(state.step.index(), 0);
                assert!(state.cart().is_some());
            })
            .run();
    }

    #[test]
    fn cart_failure_sets_banner_and_stays_loading() {
        ReducerTest::new(CheckoutReducer)
            .with_env(env())
            .given_state(CheckoutState::default())
            .when_action(CheckoutAction::CartLoadFailed(ApiError::Timeout))
            .then_state(|state| {
                assert_eq!(state.step, CheckoutStep::LoadingCart);
                assert_eq!(
                    state.banner.as_deref(),
                    Some("We couldn't load your cart. The server took too long to respond.")
                );
            })
            .run();
    }

    #[test]
    fn blocked_billing_keeps_step_and_reports_fields() {
        let mut state = at_step(CheckoutStep::EnteringBilling);
        state.form.billing.email = "not-an-email".to_string();

        ReducerTest::new(CheckoutReducer)
            .with_env(env())
            .given_state(state)
            .when_action(CheckoutAction::Advance)
            .then_state(|state| {
                assert_eq!(state.step.index(), 1);
                assert!(state
                    .field_errors
                    .contains_key(&CheckoutField::Billing(BillingField::Email)));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn editing_a_field_clears_its_error() {
        ReducerTest::new(CheckoutReducer)
            .with_env(env())
            .given_state(at_step(CheckoutStep::EnteringBilling))
            .when_actions([
                CheckoutAction::EditBilling {
                    field: BillingField::Name,
                    value: String::new(),
                },
                CheckoutAction::Advance,
                CheckoutAction::EditBilling {
                    field: BillingField::Name,
                    value: "Asha".to_string(),
                },
            ])
            .then_state(|state| {
                assert!(state.field_errors.is_empty());
                assert_eq!(state.step, CheckoutStep::EnteringBilling);
            })
            .run();
    }

    #[test]
    fn retreat_skips_validation() {
        let mut state = at_step(CheckoutStep::SelectingPayment);
        state.form.billing = BillingInfo::default();

        ReducerTest::new(CheckoutReducer)
            .with_env(env())
            .given_state(state)
            .when_actions([CheckoutAction::Retreat, CheckoutAction::Retreat, CheckoutAction::Retreat])
            .then_state(|state| {
                assert_eq!(state.step, CheckoutStep::ReviewingCart);
                assert!(state.field_errors.is_empty());
            })
            .run();
    }

    #[test]
    fn unsupported_payment_is_rejected() {
        let mut state = at_step(CheckoutStep::SelectingPayment);
        state.form.payment.narrow(&[PaymentMethod {
            code: "stripe".to_string(),
            name: "Card".to_string(),
            enabled: true,
        }]);

        ReducerTest::new(CheckoutReducer)
            .with_env(env())
            .given_state(state)
            .when_action(CheckoutAction::SelectPayment(PaymentProvider::Razorpay))
            .then_state(|state| {
                assert_eq!(state.form.payment.selected(), None);
                assert_eq!(
                    state.field_errors[&CheckoutField::PaymentMethod],
                    "razorpay is not available"
                );
            })
            .run();
    }

    #[test]
    fn valid_payment_step_creates_order() {
        ReducerTest::new(CheckoutReducer)
            .with_env(env())
            .given_state(ready_to_pay())
            .when_action(CheckoutAction::Advance)
            .then_state(|state| {
                assert_eq!(state.step, CheckoutStep::Submitting(SubmitStage::CreatingOrder));
                assert_eq!(state.step.index(), 3);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_cancellable_effect(effects, SUBMIT_ORDER);
            })
            .run();
    }

    #[test]
    fn navigation_is_ignored_while_submitting() {
        ReducerTest::new(CheckoutReducer)
            .with_env(env())
            .given_state(processing())
            .when_actions([
                CheckoutAction::Retreat,
                CheckoutAction::SelectPayment(PaymentProvider::Razorpay),
                CheckoutAction::Advance,
            ])
            .then_state(|state| {
                assert!(state.step.is_submitting());
                assert_eq!(state.form.payment.selected(), Some(PaymentProvider::Stripe));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn order_created_starts_processing() {
        let order = fixtures::created_order();
        let mut state = ready_to_pay();
        state.step = CheckoutStep::Submitting(SubmitStage::CreatingOrder);

        ReducerTest::new(CheckoutReducer)
            .with_env(env())
            .given_state(state)
            .when_action(CheckoutAction::OrderCreated(order.clone()))
            .then_state(move |state| {
                assert_eq!(state.pending_order.as_ref(), Some(&order));
                assert_eq!(
                    state.step,
                    CheckoutStep::Submitting(SubmitStage::ProcessingOrder(order))
                );
            })
            .then_effects(|effects| {
                assertions::assert_has_cancellable_effect(effects, SUBMIT_ORDER);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn processed_order_confirms_with_clock_time() {
        ReducerTest::new(CheckoutReducer)
            .with_env(env())
            .given_state(processing())
            .when_action(CheckoutAction::OrderProcessed {
                order_id: fixtures::created_order().id,
            })
            .then_state(|state| {
                let confirmation = state.confirmation().unwrap();
                assert_eq!(confirmation.order_number, "ORD-2025-0991");
                assert_eq!(confirmation.confirmed_at, test_clock().now());
                assert_eq!(state.step.index(), 4);
                assert_eq!(state.pending_order, None);
            })
            .run();
    }

    #[test]
    fn process_failure_returns_to_payment_and_keeps_order() {
        ReducerTest::new(CheckoutReducer)
            .with_env(env())
            .given_state(processing())
            .when_action(CheckoutAction::OrderProcessFailed {
                order_id: fixtures::created_order().id,
                error: ApiError::Status {
                    status: 402,
                    message: "Card declined".to_string(),
                },
            })
            .then_state(|state| {
                assert_eq!(state.step, CheckoutStep::SelectingPayment);
                assert_eq!(state.step.index(), 2);
                assert_eq!(state.pending_order, Some(fixtures::created_order()));
                assert_eq!(
                    state.banner.as_deref(),
                    Some(
                        "Payment failed for order ORD-2025-0991. Card declined. \
                         Your order has been saved, so you can try again."
                    )
                );
            })
            .run();
    }

    #[test]
    fn resubmission_only_processes_pending_order() {
        let mut state = ready_to_pay();
        state.pending_order = Some(fixtures::created_order());
        state.banner = Some("Payment failed".to_string());

        ReducerTest::new(CheckoutReducer)
            .with_env(env())
            .given_state(state)
            .when_action(CheckoutAction::Advance)
            .then_state(|state| {
                assert_eq!(
                    state.step,
                    CheckoutStep::Submitting(SubmitStage::ProcessingOrder(
                        fixtures::created_order()
                    ))
                );
                assert_eq!(state.banner, None);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_cancellable_effect(effects, SUBMIT_ORDER);
            })
            .run();
    }

    #[test]
    fn status_messages_read_as_sentences() {
        let status = |message: &str| ApiError::Status {
            status: 402,
            message: message.to_string(),
        };

        assert_eq!(describe(&status("Card declined")), "Card declined.");
        assert_eq!(describe(&status("Card declined!")), "Card declined!");
        assert_eq!(
            describe(&status("  ")),
            "The server rejected the request (status 402)."
        );
    }

    #[test]
    fn pending_order_locks_billing_and_retreat() {
        let mut state = ready_to_pay();
        state.pending_order = Some(fixtures::created_order());

        ReducerTest::new(CheckoutReducer)
            .with_env(env())
            .given_state(state)
            .when_actions([
                CheckoutAction::Retreat,
                CheckoutAction::EditBilling {
                    field: BillingField::Email,
                    value: "fixed@example.com".to_string(),
                },
                CheckoutAction::EditNotes("Invoice please".to_string()),
            ])
            .then_state(|state| {
                assert_eq!(state.step, CheckoutStep::SelectingPayment);
                assert_eq!(state.form.billing.email, "asha@example.com");
                assert!(state.form.customer_notes.is_empty());
                assert_eq!(
                    state.banner.as_deref(),
                    Some(
                        "Order ORD-2025-0991 has already been placed with these details. \
                         Retry the payment to finish it."
                    )
                );
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn results_for_other_orders_are_ignored() {
        ReducerTest::new(CheckoutReducer)
            .with_env(env())
            .given_state(processing())
            .when_action(CheckoutAction::OrderProcessed {
                order_id: OrderId::new("someone-else"),
            })
            .then_state(|state| {
                assert!(state.step.is_submitting());
            })
            .run();
    }

    #[test]
    fn confirmed_is_terminal() {
        ReducerTest::new(CheckoutReducer)
            .with_env(env())
            .given_state(processing())
            .when_actions([
                CheckoutAction::OrderProcessed {
                    order_id: fixtures::created_order().id,
                },
                CheckoutAction::Retreat,
                CheckoutAction::Advance,
                CheckoutAction::EditBilling {
                    field: BillingField::Name,
                    value: String::new(),
                },
            ])
            .then_state(|state| {
                assert!(state.step.is_confirmed());
                assert_eq!(state.form.billing.name, "Asha Rao");
            })
            .run();
    }

    #[test]
    fn dismiss_clears_banner() {
        let mut state = ready_to_pay();
        state.banner = Some("oops".to_string());

        ReducerTest::new(CheckoutReducer)
            .with_env(env())
            .given_state(state)
            .when_action(CheckoutAction::DismissError)
            .then_state(|state| assert_eq!(state.banner, None))
            .run();
    }
}
