//! Checkout driver binary
//!
//! Runs one checkout against the configured backend without a browser:
//! loads the cart, fills billing from a JSON file, selects the payment method
//! and submits the order.
//!
//! ```text
//! CAMPUS_ACCESS_TOKEN=... campus-checkout billing.json stripe --notes "Invoice please"
//! ```

use anyhow::{bail, Context, Result};
use campus_api::{HttpCheckoutApi, PaymentProvider, Session};
use campus_checkout::{
    BillingField, BillingInfo, CheckoutAction, CheckoutConfig, CheckoutEnvironment,
    CheckoutReducer, CheckoutState, CheckoutStore, SummaryView,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "campus-checkout", about = "Run a Campus checkout from the command line")]
struct Args {
    /// JSON file with billing details (name, email, address, city, state, zip, country)
    billing: PathBuf,

    /// Payment provider (stripe or razorpay)
    payment_method: PaymentProvider,

    /// Notes attached to the order
    #[arg(long)]
    notes: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campus_checkout=info,campus_runtime=warn,campus_api=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = CheckoutConfig::from_env()?;
    tracing::debug!(?config, "Loaded configuration");

    let billing: BillingInfo = serde_json::from_str(
        &std::fs::read_to_string(&args.billing)
            .with_context(|| format!("reading {}", args.billing.display()))?,
    )
    .with_context(|| format!("parsing {}", args.billing.display()))?;

    let token = config
        .access_token
        .clone()
        .context("CAMPUS_ACCESS_TOKEN (or CAMPUS_TOKEN) must be set")?;
    let session = Session::new();
    session.init(token);

    let api = HttpCheckoutApi::with_timeout(&config.api_url, session.clone(), config.http_timeout)?;
    let env = CheckoutEnvironment::new(Arc::new(api)).with_cart_retry(config.cart_retry_policy());
    let store = CheckoutStore::new(CheckoutState::default(), CheckoutReducer, env);

    let outcome = run(&store, &config, billing, args.payment_method, args.notes).await;

    store.dispose();
    session.teardown();
    outcome
}

async fn run(
    store: &CheckoutStore,
    config: &CheckoutConfig,
    billing: BillingInfo,
    payment_method: PaymentProvider,
    notes: Option<String>,
) -> Result<()> {
    store
        .send(CheckoutAction::LoadCart)
        .await?
        .wait_with_timeout(config.submit_timeout)
        .await?;

    let state = store.state(Clone::clone).await;
    let Some(cart) = state.cart() else {
        bail!(state.banner.unwrap_or_else(|| "Cart did not load".to_string()));
    };
    println!("{}\n", SummaryView::new(cart));

    // Review → billing
    step(store, CheckoutAction::Advance).await?;

    for field in BillingField::ALL {
        store
            .send(CheckoutAction::EditBilling {
                field,
                value: billing.get(field).to_string(),
            })
            .await?;
    }
    if let Some(notes) = notes {
        store.send(CheckoutAction::EditNotes(notes)).await?;
    }

    // Billing → payment
    step(store, CheckoutAction::Advance).await?;
    step(store, CheckoutAction::SelectPayment(payment_method)).await?;

    store
        .send_and_wait_for(
            CheckoutAction::Advance,
            |action| {
                matches!(
                    action,
                    CheckoutAction::OrderProcessed { .. }
                        | CheckoutAction::OrderProcessFailed { .. }
                        | CheckoutAction::OrderCreateFailed(_)
                )
            },
            config.submit_timeout,
        )
        .await?;

    let state = store.state(Clone::clone).await;
    match state.confirmation() {
        Some(confirmation) => {
            println!("{confirmation}");
            Ok(())
        },
        None => bail!(state
            .banner
            .unwrap_or_else(|| "Checkout did not complete".to_string())),
    }
}

/// Send a navigation or input action and fail on any inline error it produces
async fn step(store: &CheckoutStore, action: CheckoutAction) -> Result<()> {
    store.send(action).await?;

    let errors = store.state(|state| state.field_errors.clone()).await;
    if errors.is_empty() {
        return Ok(());
    }

    let details = errors
        .iter()
        .map(|(field, message)| format!("  {field}: {message}"))
        .collect::<Vec<_>>()
        .join("\n");
    bail!("Checkout blocked:\n{details}")
}
