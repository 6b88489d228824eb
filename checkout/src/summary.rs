//! Display formatting for the cart summary and confirmation

use crate::navigator::Confirmation;
use campus_api::CartSummary;
use rust_decimal::Decimal;
use rusty_money::{iso, Money};
use std::fmt;

/// Format `amount` in `currency` with its symbol and two decimals
///
/// Unknown currency codes fall back to `"12.50 XYZ"`.
#[must_use]
pub fn format_money(amount: Decimal, currency: &str) -> String {
    match iso::find(&currency.to_ascii_uppercase()) {
        Some(currency) => Money::from_decimal(amount, currency).to_string(),
        None => format!("{:.2} {currency}", amount.round_dp(2)),
    }
}

/// One line of the rendered summary
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummaryLine {
    /// Item name
    pub name: String,
    /// Quantity
    pub quantity: u32,
    /// Formatted line total
    pub amount: String,
}

/// Cart summary with every amount formatted for display
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummaryView {
    /// Line items
    pub lines: Vec<SummaryLine>,
    /// Formatted subtotal
    pub subtotal: String,
    /// Formatted discount, only when non-zero
    pub discount: Option<String>,
    /// Formatted tax
    pub tax: String,
    /// Formatted grand total
    pub total: String,
}

impl SummaryView {
    /// Render `cart`
    ///
    /// Amounts are shown exactly as the server computed them.
    #[must_use]
    pub fn new(cart: &CartSummary) -> Self {
        let money = |amount: Decimal| format_money(amount, &cart.currency);

        Self {
            lines: cart
                .items
                .iter()
                .map(|item| SummaryLine {
                    name: item.name.clone(),
                    quantity: item.quantity,
                    amount: money(item.line_total),
                })
                .collect(),
            subtotal: money(cart.subtotal),
            discount: (!cart.discount.is_zero()).then(|| format!("-{}", money(cart.discount))),
            tax: money(cart.tax),
            total: money(cart.total),
        }
    }
}

impl fmt::Display for SummaryView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{:>3} x {:<32} {:>12}", line.quantity, line.name, line.amount)?;
        }
        writeln!(f, "{:<38} {:>12}", "Subtotal", self.subtotal)?;
        if let Some(discount) = &self.discount {
            writeln!(f, "{:<38} {:>12}", "Discount", discount)?;
        }
        writeln!(f, "{:<38} {:>12}", "Tax", self.tax)?;
        write!(f, "{:<38} {:>12}", "Total", self.total)
    }
}

impl fmt::Display for Confirmation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Order {} confirmed at {}",
            self.order_number,
            self.confirmed_at.format("%Y-%m-%d %H:%M:%S UTC")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_api::{CartId, CartLineItem};
    use campus_core::Clock;
    use campus_testing::{fixtures, test_clock};

    fn cart(subtotal: i64, discount: i64, tax: i64, total: i64, currency: &str) -> CartSummary {
        CartSummary {
            cart_id: CartId::new("c"),
            items: vec![CartLineItem {
                id: "1".to_string(),
                name: "Course".to_string(),
                quantity: 1,
                line_total: Decimal::new(subtotal, 2),
            }],
            subtotal: Decimal::new(subtotal, 2),
            discount: Decimal::new(discount, 2),
            tax: Decimal::new(tax, 2),
            total: Decimal::new(total, 2),
            currency: currency.to_string(),
        }
    }

    #[test]
    fn total_renders_with_symbol_and_two_decimals() {
        let view = SummaryView::new(&cart(24998, 0, 2062, 27060, "USD"));

        assert_eq!(view.total, "$270.60");
        assert_eq!(view.subtotal, "$249.98");
        assert_eq!(view.tax, "$20.62");
        assert_eq!(view.discount, None);
    }

    #[test]
    fn discount_is_shown_when_present() {
        let view = SummaryView::new(&cart(10000, 1500, 0, 8500, "usd"));
        assert_eq!(view.discount.as_deref(), Some("-$15.00"));
        assert_eq!(view.total, "$85.00");
    }

    #[test]
    fn unknown_currency_falls_back_to_code() {
        assert_eq!(format_money(Decimal::new(1250, 2), "XYZ"), "12.50 XYZ");
    }

    #[test]
    fn rendered_summary_lists_items_and_total() {
        let text = SummaryView::new(&fixtures::cart()).to_string();

        assert!(text.contains("Mindful Mornings"));
        assert!(text.lines().last().is_some_and(|line| line.ends_with("$270.60")));
    }

    #[test]
    fn confirmation_shows_order_number_verbatim() {
        let confirmation = Confirmation {
            order_id: fixtures::created_order().id,
            order_number: "ORD-2025-0991".to_string(),
            confirmed_at: test_clock().now(),
        };

        assert_eq!(
            confirmation.to_string(),
            "Order ORD-2025-0991 confirmed at 2025-01-01 00:00:00 UTC"
        );
    }
}
