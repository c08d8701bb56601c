//! Currency helpers. Amounts are `Decimal` so totals stay exact.

use rust_decimal::{Decimal, RoundingStrategy};

/// Flat delivery fee charged on every order unless configured otherwise.
pub const DEFAULT_DELIVERY_FEE: Decimal = Decimal::from_parts(299, 0, 0, false, 2);

/// Rounds an amount to whole cents, midpoint away from zero.
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `unit_price × quantity`.
pub fn line_total(unit_price: Decimal, quantity: u32) -> Decimal {
    unit_price * Decimal::from(quantity)
}
