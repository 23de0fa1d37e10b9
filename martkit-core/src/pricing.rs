//! Cart pricing arithmetic.
//!
//! Pure functions of a cart snapshot, recomputed on demand and never
//! cached.  These figures are display-only: the backend recomputes the
//! settlement amount itself and is the sole authority for it.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::cart::CartLineItem;

/// Flat delivery fee added to every order.
pub const DELIVERY_FEE: Decimal = Decimal::ZERO;

/// The price actually charged per unit: the discount price when one applies
/// (present, nonzero, and strictly below the base price), else the base
/// price.
pub fn effective_price(item: &CartLineItem) -> Decimal {
    match item.discount_price {
        Some(d) if !d.is_zero() && d < item.price => d,
        _ => item.price,
    }
}

fn has_discount(item: &CartLineItem) -> bool {
    matches!(item.discount_price, Some(d) if !d.is_zero() && d < item.price)
}

/// Σ base price × quantity over all lines.
pub fn subtotal(items: &[CartLineItem]) -> Decimal {
    items
        .iter()
        .map(|i| i.price * Decimal::from(i.quantity))
        .sum()
}

/// Σ (base − discount) × quantity over discounted lines only.
pub fn discount(items: &[CartLineItem]) -> Decimal {
    items
        .iter()
        .filter(|i| has_discount(i))
        .map(|i| (i.price - effective_price(i)) * Decimal::from(i.quantity))
        .sum()
}

/// Price breakdown for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
}

/// Compute the full breakdown: `total = subtotal − discount + delivery fee`.
pub fn totals(items: &[CartLineItem]) -> CartTotals {
    let subtotal = subtotal(items);
    let discount = discount(items);
    CartTotals {
        subtotal,
        discount,
        delivery_fee: DELIVERY_FEE,
        total: subtotal - discount + DELIVERY_FEE,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use compact_str::CompactString;

    fn line(id: &str, price: u32, discount_price: Option<u32>, quantity: u32) -> CartLineItem {
        CartLineItem {
            product_id: CompactString::from(id),
            name: CompactString::from(id),
            price: Decimal::from(price),
            discount_price: discount_price.map(Decimal::from),
            image: None,
            quantity,
            variant: None,
        }
    }

    #[test]
    fn test_effective_price_prefers_applicable_discount() {
        assert_eq!(effective_price(&line("a", 100, Some(80), 1)), Decimal::from(80));
        // No discount, zero discount, or discount >= base: base price wins.
        assert_eq!(effective_price(&line("b", 100, None, 1)), Decimal::from(100));
        assert_eq!(effective_price(&line("c", 100, Some(0), 1)), Decimal::from(100));
        assert_eq!(effective_price(&line("d", 100, Some(100), 1)), Decimal::from(100));
        assert_eq!(effective_price(&line("e", 100, Some(120), 1)), Decimal::from(100));
    }

    #[test]
    fn test_totals_breakdown_matches_effective_sum() {
        let items = vec![
            line("a", 100, Some(80), 2),
            line("b", 50, None, 1),
            line("c", 30, Some(25), 3),
        ];
        let t = totals(&items);
        let effective_sum: Decimal = items
            .iter()
            .map(|i| effective_price(i) * Decimal::from(i.quantity))
            .sum();
        assert_eq!(t.total, t.subtotal - t.discount + DELIVERY_FEE);
        assert_eq!(t.total, effective_sum);
    }

    #[test]
    fn test_reference_cart_breakdown() {
        // price 100 discounted to 80 ×2, plus an undiscounted 50 ×1.
        let items = vec![line("a", 100, Some(80), 2), line("b", 50, None, 1)];
        let t = totals(&items);
        assert_eq!(t.subtotal, Decimal::from(250));
        assert_eq!(t.discount, Decimal::from(40));
        assert_eq!(t.total, Decimal::from(210));
    }

    #[test]
    fn test_empty_cart_totals_are_zero() {
        let t = totals(&[]);
        assert_eq!(t.subtotal, Decimal::ZERO);
        assert_eq!(t.discount, Decimal::ZERO);
        assert_eq!(t.total, Decimal::ZERO);
    }
}
