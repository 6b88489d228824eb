//! Order submission
//!
//! Submitting is two requests: `POST /orders`, then
//! `POST /orders/{id}/process` for the order it returned. The second effect is
//! only built by the reducer once [`CheckoutAction::OrderCreated`] arrives, so
//! processing can never start before creation resolves.
//!
//! Both requests share [`SUBMIT_ORDER`], so disposing or cancelling the
//! submission drops whichever one is in flight.

use crate::form::CheckoutForm;
use crate::reducer::CheckoutAction;
use campus_api::{
    CartId, CheckoutApi, CreateOrderRequest, OrderId, PaymentProvider, ProcessOrderRequest,
};
use campus_core::{Effect, EffectId};
use std::sync::Arc;

/// Id of the in-flight submission request
pub const SUBMIT_ORDER: EffectId = EffectId::new("checkout.submit_order");

/// Build the `POST /orders` body from the form
#[must_use]
pub fn order_request(
    cart_id: CartId,
    form: &CheckoutForm,
    payment_method: PaymentProvider,
) -> CreateOrderRequest {
    CreateOrderRequest {
        cart_id,
        billing_name: form.billing.name.trim().to_string(),
        billing_email: form.billing.email.trim().to_string(),
        billing_address: form.billing.billing_address(),
        customer_notes: form.notes(),
        payment_method,
    }
}

/// Create the order
pub fn create_order(api: Arc<dyn CheckoutApi>, request: CreateOrderRequest) -> Effect<CheckoutAction> {
    Effect::future(async move {
        Some(match api.create_order(request).await {
            Ok(order) => CheckoutAction::OrderCreated(order),
            Err(error) => CheckoutAction::OrderCreateFailed(error),
        })
    })
    .cancellable(SUBMIT_ORDER)
}

/// Capture payment for an order that already exists
pub fn process_order(
    api: Arc<dyn CheckoutApi>,
    order_id: OrderId,
    payment_method: PaymentProvider,
) -> Effect<CheckoutAction> {
    Effect::future(async move {
        let request = ProcessOrderRequest { payment_method };
        Some(match api.process_order(order_id.clone(), request).await {
            Ok(()) => CheckoutAction::OrderProcessed { order_id },
            Err(error) => CheckoutAction::OrderProcessFailed { order_id, error },
        })
    })
    .cancellable(SUBMIT_ORDER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::BillingInfo;
    use campus_testing::fixtures;

    #[test]
    fn request_carries_trimmed_billing_and_notes() {
        let form = CheckoutForm {
            cart: Some(fixtures::cart()),
            billing: BillingInfo {
                name: " Asha Rao ".to_string(),
                email: "asha@example.com ".to_string(),
                address: "12 Lake Road".to_string(),
                city: "Pune".to_string(),
                zip: "411001".to_string(),
                ..BillingInfo::default()
            },
            customer_notes: "Invoice to company".to_string(),
            ..CheckoutForm::default()
        };

        let request = order_request(CartId::new("cart-42"), &form, PaymentProvider::Stripe);

        assert_eq!(request.billing_name, "Asha Rao");
        assert_eq!(request.billing_email, "asha@example.com");
        assert_eq!(request.billing_address, "12 Lake Road, Pune, 411001");
        assert_eq!(request.customer_notes.as_deref(), Some("Invoice to company"));
        assert_eq!(request.payment_method, PaymentProvider::Stripe);
    }
}
