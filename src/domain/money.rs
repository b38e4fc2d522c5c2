//! Monetary types for price, size and percentage representation.

use rust_decimal::Decimal;

/// Price represented as a Decimal for precision.
pub type Price = Decimal;

/// Trade size (base asset units) represented as a Decimal.
pub type Volume = Decimal;

/// A percentage, where `1.5` means 1.5%.
pub type Percent = Decimal;

/// Express `part` as a percentage of `whole`.
///
/// Returns `None` when `whole` is zero.
#[must_use]
pub fn percent_of(part: Decimal, whole: Decimal) -> Option<Percent> {
    if whole.is_zero() {
        return None;
    }
    part.checked_div(whole)?.checked_mul(Decimal::ONE_HUNDRED)
}
