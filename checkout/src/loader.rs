//! Cart summary and payment method loading

use crate::reducer::CheckoutAction;
use campus_api::{ApiError, CheckoutApi};
use campus_core::{Effect, EffectId};
use campus_runtime::{retry::retry_with_predicate, RetryPolicy};
use std::sync::Arc;

/// Id of the in-flight cart request
pub const LOAD_CART: EffectId = EffectId::new("checkout.load_cart");

/// Id of the in-flight payment methods request
pub const LOAD_PAYMENT_METHODS: EffectId = EffectId::new("checkout.load_payment_methods");

/// Fetch the cart, retrying transient failures under `policy`
///
/// `GET /cart` is idempotent so retrying is safe.
pub fn load_cart(api: Arc<dyn CheckoutApi>, policy: RetryPolicy) -> Effect<CheckoutAction> {
    Effect::future(async move {
        let result = retry_with_predicate(&policy, || api.cart(), ApiError::is_retryable).await;

        Some(match result {
            Ok(cart) => CheckoutAction::CartLoaded(cart),
            Err(error) => CheckoutAction::CartLoadFailed(error),
        })
    })
    .cancellable(LOAD_CART)
}

/// Fetch the payment methods the backend currently offers
pub fn load_payment_methods(api: Arc<dyn CheckoutApi>) -> Effect<CheckoutAction> {
    Effect::future(async move {
        Some(match api.payment_methods().await {
            Ok(methods) => CheckoutAction::PaymentMethodsLoaded(methods),
            Err(error) => CheckoutAction::PaymentMethodsFailed(error),
        })
    })
    .cancellable(LOAD_PAYMENT_METHODS)
}
