//! Orders and their immutable line snapshots.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use grocery_mart_core::{
    DeliveryAddress, OrderId, OrderStatus, PaymentMethod, Price, ProductId, UserId,
};

use super::product::Product;

/// Product name, price and quantity as they were at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
}

impl OrderLine {
    /// Snapshot a product at the given quantity.
    #[must_use]
    pub fn snapshot(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            quantity,
        }
    }

    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.line_total(self.quantity)
    }
}

/// An order that has not been persisted yet.
///
/// The total is derived from the lines on construction, so it always equals
/// the sum of the snapshot line totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    user_id: UserId,
    lines: Vec<OrderLine>,
    total_amount: Decimal,
    delivery_address: DeliveryAddress,
    payment_method: PaymentMethod,
}

impl NewOrder {
    #[must_use]
    pub fn new(
        user_id: UserId,
        lines: Vec<OrderLine>,
        delivery_address: DeliveryAddress,
        payment_method: PaymentMethod,
    ) -> Self {
        let total_amount = lines.iter().map(OrderLine::line_total).sum();
        Self {
            user_id,
            lines,
            total_amount,
            delivery_address,
            payment_method,
        }
    }

    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    #[must_use]
    pub const fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    #[must_use]
    pub const fn delivery_address(&self) -> &DeliveryAddress {
        &self.delivery_address
    }

    #[must_use]
    pub const fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Materialise the stored order once the store has assigned an ID.
    #[must_use]
    pub fn into_order(self, id: OrderId, order_date: DateTime<Utc>) -> Order {
        Order {
            id,
            user_id: self.user_id,
            lines: self.lines,
            total_amount: self.total_amount,
            delivery_address: self.delivery_address,
            payment_method: self.payment_method,
            status: OrderStatus::Pending,
            order_date,
            delivery_date: None,
            updated_at: order_date,
        }
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub lines: Vec<OrderLine>,
    pub total_amount: Decimal,
    pub delivery_address: DeliveryAddress,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub order_date: DateTime<Utc>,
    pub delivery_date: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Sum of the snapshot line totals.
    #[must_use]
    pub fn lines_total(&self) -> Decimal {
        self.lines.iter().map(OrderLine::line_total).sum()
    }
}

// =============================================================================
// Views
// =============================================================================

/// An order line plus the live product, if it still exists.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemView {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
    pub line_total: Decimal,
    pub product: Option<Product>,
}

/// Order as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItemView>,
    pub total_amount: Decimal,
    pub delivery_address: DeliveryAddress,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub order_date: DateTime<Utc>,
    pub delivery_date: Option<DateTime<Utc>>,
}

impl OrderView {
    /// Attach live product records. Snapshot fields are never overwritten.
    #[must_use]
    pub fn resolve(order: Order, products: &HashMap<ProductId, Product>) -> Self {
        let items = order
            .lines
            .into_iter()
            .map(|line| OrderItemView {
                line_total: line.line_total(),
                product: products.get(&line.product_id).cloned(),
                product_id: line.product_id,
                name: line.name,
                price: line.price,
                quantity: line.quantity,
            })
            .collect();

        Self {
            id: order.id,
            user_id: order.user_id,
            items,
            total_amount: order.total_amount,
            delivery_address: order.delivery_address,
            payment_method: order.payment_method,
            status: order.status,
            order_date: order.order_date,
            delivery_date: order.delivery_date,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::product::tests::product;

    fn address() -> DeliveryAddress {
        DeliveryAddress {
            street: "12 MG Road".to_string(),
            city: "Pune".to_string(),
            state: "MH".to_string(),
            zip_code: "411001".to_string(),
        }
    }

    #[test]
    fn test_total_is_sum_of_snapshot_lines() {
        let apples = product(1, "Apples", 120, 10);
        let milk = product(2, "Milk", 30, 10);
        let order = NewOrder::new(
            UserId::new(1),
            vec![OrderLine::snapshot(&apples, 3), OrderLine::snapshot(&milk, 2)],
            address(),
            PaymentMethod::CashOnDelivery,
        );
        assert_eq!(order.total_amount(), Decimal::from(420));

        let stored = order.into_order(OrderId::new(9), Utc::now());
        assert_eq!(stored.status, OrderStatus::Pending);
        assert_eq!(stored.total_amount, stored.lines_total());
        assert!(stored.delivery_date.is_none());
    }

    #[test]
    fn test_view_keeps_snapshot_when_product_changed_or_gone() {
        let mut apples = product(1, "Apples", 120, 10);
        let order = NewOrder::new(
            UserId::new(1),
            vec![OrderLine::snapshot(&apples, 1)],
            address(),
            PaymentMethod::Upi,
        )
        .into_order(OrderId::new(1), Utc::now());

        apples.name = "Shimla Apples".to_string();
        let mut live = HashMap::new();
        live.insert(apples.id, apples);

        let view = OrderView::resolve(order.clone(), &live);
        let item = view.items.first().unwrap();
        assert_eq!(item.name, "Apples");
        assert_eq!(item.product.as_ref().unwrap().name, "Shimla Apples");

        let orphaned = OrderView::resolve(order, &HashMap::new());
        assert!(orphaned.items.first().unwrap().product.is_none());
    }
}
