//! Commerce API client
//!
//! [`CheckoutApi`] is the seam the checkout flow depends on. [`HttpCheckoutApi`]
//! is the production implementation over `reqwest`; tests substitute a mock.

use crate::{
    error::ApiError,
    session::Session,
    types::{CartSummary, CreateOrderRequest, CreatedOrder, OrderId, PaymentMethod, ProcessOrderRequest},
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Boxed future returned by [`CheckoutApi`] methods
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// Backend operations used during checkout
///
/// Methods return boxed futures so the trait stays dyn-compatible and can be
/// held as `Arc<dyn CheckoutApi>` in an environment.
pub trait CheckoutApi: Send + Sync {
    /// `GET /cart`
    fn cart(&self) -> ApiFuture<'_, CartSummary>;

    /// `GET /payment-methods`
    fn payment_methods(&self) -> ApiFuture<'_, Vec<PaymentMethod>>;

    /// `POST /orders`
    fn create_order(&self, request: CreateOrderRequest) -> ApiFuture<'_, CreatedOrder>;

    /// `POST /orders/{order_id}/process`
    ///
    /// The response body is ignored; any 2xx counts as success.
    fn process_order(&self, order_id: OrderId, request: ProcessOrderRequest) -> ApiFuture<'_, ()>;
}

/// HTTP implementation of [`CheckoutApi`]
#[derive(Clone, Debug)]
pub struct HttpCheckoutApi {
    client: Client,
    base_url: String,
    session: Session,
}

impl HttpCheckoutApi {
    /// Default per-request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a client for `base_url` (for example `http://localhost:8000/api/v1`)
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RequestFailed`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, session: Session) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, session, Self::DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit per-request timeout
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RequestFailed`] if the HTTP client cannot be built.
    pub fn with_timeout(
        base_url: impl Into<String>,
        session: Session,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        })
    }

    /// Base URL requests are resolved against
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Session whose token authenticates requests
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Attach the bearer token and send
    ///
    /// Fails fast with [`ApiError::Unauthenticated`] without touching the
    /// network when there is no session.
    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let bearer = self.session.bearer()?;

        request
            .header(reqwest::header::AUTHORIZATION, bearer)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport_error)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        tracing::debug!(path, "GET");
        let response = self.send(self.client.get(self.url(path))).await?;
        parse_json(check_status(response).await?).await
    }
}

impl CheckoutApi for HttpCheckoutApi {
    fn cart(&self) -> ApiFuture<'_, CartSummary> {
        Box::pin(async move {
            let cart: CartSummary = self.get_json("/cart").await?;
            if !cart.totals_consistent() {
                tracing::warn!(
                    cart_id = %cart.cart_id,
                    subtotal = %cart.subtotal,
                    total = %cart.total,
                    "Cart totals do not add up; displaying server values"
                );
            }
            Ok(cart)
        })
    }

    fn payment_methods(&self) -> ApiFuture<'_, Vec<PaymentMethod>> {
        Box::pin(self.get_json("/payment-methods"))
    }

    fn create_order(&self, request: CreateOrderRequest) -> ApiFuture<'_, CreatedOrder> {
        Box::pin(async move {
            tracing::debug!(cart_id = %request.cart_id, provider = %request.payment_method, "POST /orders");
            let response = self
                .send(self.client.post(self.url("/orders")).json(&request))
                .await?;
            parse_json(check_status(response).await?).await
        })
    }

    fn process_order(&self, order_id: OrderId, request: ProcessOrderRequest) -> ApiFuture<'_, ()> {
        Box::pin(async move {
            let path = format!("/orders/{order_id}/process");
            tracing::debug!(%order_id, provider = %request.payment_method, "POST {path}");
            let response = self
                .send(self.client.post(self.url(&path)).json(&request))
                .await?;
            check_status(response).await?;
            Ok(())
        })
    }
}

fn transport_error(error: reqwest::Error) -> ApiError {
    if error.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::RequestFailed(error.to_string())
    }
}

/// Map non-2xx responses to [`ApiError`]
async fn check_status(response: Response) -> Result<Response, ApiError> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
        status => {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());
            tracing::warn!(status = status.as_u16(), %message, "Request rejected");
            Err(ApiError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::ResponseParseFailed(e.to_string()))
}

/// Longest server message passed on to callers
const MAX_MESSAGE_CHARS: usize = 200;

/// Extract a human-readable message from an error body
///
/// Backends answer with `{"detail": ...}`, `{"message": ...}` or
/// `{"error": ...}`. Other bodies are used only when they are a single line
/// of plain text; markup from proxies and blank messages yield `None`.
fn error_message(body: &str) -> Option<String> {
    let body = body.trim();

    let message = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => ["detail", "message", "error"]
            .iter()
            .find_map(|key| match map.get(*key) {
                Some(serde_json::Value::String(message)) if !message.trim().is_empty() => {
                    Some(message.trim().to_string())
                },
                _ => None,
            })?,
        Ok(_) => return None,
        Err(_) if body.is_empty() || body.contains(['<', '>', '\n']) => return None,
        Err(_) => body.to_string(),
    };

    Some(truncate(&message))
}

fn truncate(message: &str) -> String {
    if message.chars().count() <= MAX_MESSAGE_CHARS {
        return message.to_string();
    }
    let mut short: String = message.chars().take(MAX_MESSAGE_CHARS - 1).collect();
    short.push('…');
    short
}
