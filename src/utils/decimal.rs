//! Decimal arithmetic utilities for financial calculations.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Round to the nearest multiple of a tick size (e.g. 0.0001 for prices).
pub fn round_to_tick(value: Decimal, tick_size: Decimal) -> Decimal {
    if tick_size == Decimal::ZERO {
        return value;
    }
    (value / tick_size).round() * tick_size
}

/// Round to the nearest multiple of a step size (quantity increment).
pub fn round_to_step(value: Decimal, step_size: Decimal) -> Decimal {
    round_to_tick(value, step_size)
}

/// Convert basis points to a decimal rate (1 bp = 0.01%).
pub fn from_basis_points(bps: Decimal) -> Decimal {
    bps / dec!(10000)
}
