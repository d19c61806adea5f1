//! Money calculation utilities using rust_decimal for precision
//!
//! All arithmetic is done in `Decimal` internally, then converted back to
//! `f64` for storage/serialization. Online sessions get totals from the
//! backend's `update_order_total` procedure; the in-memory source uses the
//! same formula locally.

use rust_decimal::prelude::*;

use shared::models::Order;

/// Rounding for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Order subtotal: Σ unit_price × quantity over all items, in item order
pub fn order_subtotal(order: &Order) -> Decimal {
    order
        .items
        .iter()
        .map(|item| to_decimal(item.unit_price) * Decimal::from(item.quantity))
        .sum()
}

/// Recalculate an order's money fields from its items
///
/// subtotal = Σ unit_price × quantity
/// total    = subtotal + tax + tip
pub fn recalculate_order(order: &mut Order) {
    let subtotal = order_subtotal(order);
    let total = subtotal + to_decimal(order.tax) + to_decimal(order.tip);
    order.subtotal = to_f64(subtotal);
    order.total = to_f64(total);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::models::{OrderItem, OrderItemStatus, OrderStatus, OrderType};

    fn order_with_items(items: Vec<(f64, i32)>) -> Order {
        Order {
            id: "order-1".to_string(),
            location_id: "loc-1".to_string(),
            table_id: None,
            staff_id: None,
            order_type: OrderType::DineIn,
            status: OrderStatus::Pending,
            subtotal: 0.0,
            tax: 0.0,
            tip: 0.0,
            total: 0.0,
            split_from: None,
            items: items
                .into_iter()
                .enumerate()
                .map(|(i, (price, qty))| OrderItem {
                    id: format!("item-{i}"),
                    order_id: "order-1".to_string(),
                    menu_item_id: format!("menu-{i}"),
                    quantity: qty,
                    unit_price: price,
                    modifiers: Vec::new(),
                    status: OrderItemStatus::Pending,
                })
                .collect(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn decimal_avoids_float_accumulation_drift() {
        // Classic floating point problem: 0.1 + 0.2 != 0.3
        let sum = to_decimal(0.1) + to_decimal(0.2);
        assert_eq!(to_f64(sum), 0.3);

        // Sum 0.01 one thousand times
        let mut total = Decimal::ZERO;
        for _ in 0..1000 {
            total += to_decimal(0.01);
        }
        assert_eq!(to_f64(total), 10.0);
    }

    #[test]
    fn subtotal_is_sum_of_line_totals() {
        let mut order = order_with_items(vec![(14.99, 2), (2.99, 1)]);
        recalculate_order(&mut order);
        assert_eq!(order.subtotal, 32.97);
        assert_eq!(order.total, 32.97);
    }

    #[test]
    fn total_includes_tax_and_tip() {
        let mut order = order_with_items(vec![(10.0, 1)]);
        order.tax = 1.5;
        order.tip = 2.0;
        recalculate_order(&mut order);
        assert_eq!(order.subtotal, 10.0);
        assert_eq!(order.total, 13.5);
    }

    #[test]
    fn empty_order_is_zero() {
        let mut order = order_with_items(Vec::new());
        recalculate_order(&mut order);
        assert_eq!(order.subtotal, 0.0);
        assert_eq!(order.total, 0.0);
    }

    #[test]
    fn many_penny_items_sum_exactly() {
        let mut order = order_with_items(vec![(0.01, 1); 100]);
        recalculate_order(&mut order);
        assert_eq!(order.subtotal, 1.0);
    }
}
