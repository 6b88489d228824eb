//! Scripted in-memory [`CheckoutApi`]
//!
//! Each endpoint has a queue of responses. A call pops the next response;
//! when only one is left it is repeated, so a single scripted success serves
//! any number of calls. An endpoint with nothing scripted fails with
//! [`ApiError::RequestFailed`]. Every call is recorded in order.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Lock poisoning only happens after a test already panicked

use campus_api::{
    ApiError, ApiFuture, CartSummary, CheckoutApi, CreateOrderRequest, CreatedOrder, OrderId,
    PaymentMethod, ProcessOrderRequest,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One recorded call against [`MockCheckoutApi`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiCall {
    /// `GET /cart`
    Cart,
    /// `GET /payment-methods`
    PaymentMethods,
    /// `POST /orders`
    CreateOrder(CreateOrderRequest),
    /// `POST /orders/{id}/process`
    ProcessOrder(OrderId, ProcessOrderRequest),
}

#[derive(Debug, Default)]
struct Script {
    cart: VecDeque<Result<CartSummary, ApiError>>,
    payment_methods: VecDeque<Result<Vec<PaymentMethod>, ApiError>>,
    create_order: VecDeque<Result<CreatedOrder, ApiError>>,
    process_order: VecDeque<Result<(), ApiError>>,
    calls: Vec<ApiCall>,
}

fn next<T: Clone>(queue: &mut VecDeque<Result<T, ApiError>>, endpoint: &str) -> Result<T, ApiError> {
    if queue.len() > 1 {
        return queue.pop_front().unwrap_or_else(|| unscripted(endpoint));
    }
    queue.front().cloned().unwrap_or_else(|| unscripted(endpoint))
}

fn unscripted<T>(endpoint: &str) -> Result<T, ApiError> {
    Err(ApiError::RequestFailed(format!("no scripted response for {endpoint}")))
}

/// Scripted backend for checkout tests
///
/// Clones share the same script and call log.
///
/// # Example
///
/// ```
/// use campus_testing::{fixtures, ApiCall, MockCheckoutApi};
/// use campus_api::CheckoutApi;
///
/// # tokio_test::block_on(async {
/// let api = MockCheckoutApi::new().with_cart(Ok(fixtures::cart()));
/// let cart = api.cart().await.unwrap();
///
/// assert_eq!(cart.items.len(), 2);
/// assert_eq!(api.calls(), vec![ApiCall::Cart]);
/// # });
/// ```
#[derive(Clone, Debug, Default)]
pub struct MockCheckoutApi {
    script: Arc<Mutex<Script>>,
    latency: Option<Duration>,
}

impl MockCheckoutApi {
    /// Create a mock with nothing scripted
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock that answers every endpoint successfully with fixture data
    #[must_use]
    pub fn happy_path() -> Self {
        Self::new()
            .with_cart(Ok(crate::fixtures::cart()))
            .with_payment_methods(Ok(crate::fixtures::payment_methods()))
            .with_create_order(Ok(crate::fixtures::created_order()))
            .with_process_order(Ok(()))
    }

    /// Delay every response by `latency`
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Queue a `GET /cart` response
    #[must_use]
    pub fn with_cart(self, response: Result<CartSummary, ApiError>) -> Self {
        self.script.lock().unwrap().cart.push_back(response);
        self
    }

    /// Queue a `GET /payment-methods` response
    #[must_use]
    pub fn with_payment_methods(self, response: Result<Vec<PaymentMethod>, ApiError>) -> Self {
        self.script.lock().unwrap().payment_methods.push_back(response);
        self
    }

    /// Queue a `POST /orders` response
    #[must_use]
    pub fn with_create_order(self, response: Result<CreatedOrder, ApiError>) -> Self {
        self.script.lock().unwrap().create_order.push_back(response);
        self
    }

    /// Queue a `POST /orders/{id}/process` response
    #[must_use]
    pub fn with_process_order(self, response: Result<(), ApiError>) -> Self {
        self.script.lock().unwrap().process_order.push_back(response);
        self
    }

    /// Replace all queued process responses with `response`
    pub fn set_process_order(&self, response: Result<(), ApiError>) {
        let mut script = self.script.lock().unwrap();
        script.process_order.clear();
        script.process_order.push_back(response);
    }

    /// Every call made so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.script.lock().unwrap().calls.clone()
    }

    /// Number of `POST /orders` calls
    #[must_use]
    pub fn create_order_calls(&self) -> usize {
        self.count(|call| matches!(call, ApiCall::CreateOrder(_)))
    }

    /// Number of `POST /orders/{id}/process` calls
    #[must_use]
    pub fn process_order_calls(&self) -> usize {
        self.count(|call| matches!(call, ApiCall::ProcessOrder(..)))
    }

    /// Number of `GET /cart` calls
    #[must_use]
    pub fn cart_calls(&self) -> usize {
        self.count(|call| matches!(call, ApiCall::Cart))
    }

    fn count(&self, predicate: impl Fn(&ApiCall) -> bool) -> usize {
        self.script
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|call| predicate(call))
            .count()
    }

    fn respond<T, F>(&self, call: ApiCall, pick: F) -> ApiFuture<'_, T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Script) -> Result<T, ApiError>,
    {
        let response = {
            let mut script = self.script.lock().unwrap();
            script.calls.push(call);
            pick(&mut script)
        };
        let latency = self.latency;

        Box::pin(async move {
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }
            response
        })
    }
}

impl CheckoutApi for MockCheckoutApi {
    fn cart(&self) -> ApiFuture<'_, CartSummary> {
        self.respond(ApiCall::Cart, |script| next(&mut script.cart, "cart"))
    }

    fn payment_methods(&self) -> ApiFuture<'_, Vec<PaymentMethod>> {
        self.respond(ApiCall::PaymentMethods, |script| {
            next(&mut script.payment_methods, "payment-methods")
        })
    }

    fn create_order(&self, request: CreateOrderRequest) -> ApiFuture<'_, CreatedOrder> {
        self.respond(ApiCall::CreateOrder(request), |script| {
            next(&mut script.create_order, "orders")
        })
    }

    fn process_order(&self, order_id: OrderId, request: ProcessOrderRequest) -> ApiFuture<'_, ()> {
        self.respond(ApiCall::ProcessOrder(order_id, request), |script| {
            next(&mut script.process_order, "orders/process")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[tokio::test]
    async fn queued_responses_are_consumed_then_last_repeats() {
        let api = MockCheckoutApi::new()
            .with_cart(Err(ApiError::Timeout))
            .with_cart(Ok(fixtures::cart()));

        assert_eq!(api.cart().await, Err(ApiError::Timeout));
        assert!(api.cart().await.is_ok());
        assert!(api.cart().await.is_ok());
        assert_eq!(api.cart_calls(), 3);
    }

    #[tokio::test]
    async fn unscripted_endpoint_fails() {
        let api = MockCheckoutApi::new();
        assert!(matches!(
            api.payment_methods().await,
            Err(ApiError::RequestFailed(_))
        ));
        assert_eq!(api.calls(), vec![ApiCall::PaymentMethods]);
    }

    #[tokio::test]
    async fn clones_share_the_call_log() {
        let api = MockCheckoutApi::happy_path();
        let observer = api.clone();

        api.process_order(
            OrderId::new("1"),
            ProcessOrderRequest {
                payment_method: campus_api::PaymentProvider::Stripe,
            },
        )
        .await
        .unwrap();

        assert_eq!(observer.process_order_calls(), 1);
    }
}
