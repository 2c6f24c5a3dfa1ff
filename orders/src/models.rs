// ============================================================================
// MERIDIAN - ORDER MODELS
// ============================================================================
// Module: orders/src/models.rs
// Description: The order aggregate and its lifecycle state machine
// ============================================================================

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use meridian_shared::types::Address;
use meridian_shared::{Error, Result};

/// Order status enum
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Created,
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
    Failed,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, next) {
            (Created, Pending) | (Created, Paid) | (Created, Cancelled) | (Created, Failed) => true,
            (Pending, Paid) | (Pending, Cancelled) | (Pending, Failed) => true,
            (Paid, Shipped) | (Paid, Cancelled) => true,
            (Shipped, Delivered) | (Shipped, Failed) => true,
            // A failed order can be retried into the payment flow.
            (Failed, Pending) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Failed => "failed",
        }
    }
}

/// Where an order entered the system.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "order_source", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderSource {
    Online,
    Pos,
    Mobile,
    Api,
}

impl OrderSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSource::Online => "online",
            OrderSource::Pos => "pos",
            OrderSource::Mobile => "mobile",
            OrderSource::Api => "api",
        }
    }
}

/// One order line. `subtotal` is always `price x quantity` rounded to the
/// currency's minor unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub sku: String,
    pub name: String,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub subtotal: Decimal,
}

impl OrderItem {
    pub fn new(product_id: Uuid, sku: String, name: String, quantity: i32, price: Decimal) -> Self {
        let subtotal = (price * Decimal::from(quantity)).round_dp(2);
        Self {
            product_id,
            sku,
            name,
            quantity,
            price,
            subtotal,
        }
    }
}

/// Opaque payment record attached when the order is paid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub method: String,
    pub transaction_id: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub paid_at: DateTime<Utc>,
}

/// A customer or point-of-sale transaction. `version` increases on every
/// mutation and backs the optimistic-lock protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<OrderItem>,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_amount: Decimal,
    pub currency: String,
    pub status: OrderStatus,
    pub source: OrderSource,
    pub shipping_address: Option<Address>,
    pub billing_address: Option<Address>,
    pub payment: Option<Payment>,
    pub tracking_code: Option<String>,
    pub notes: Vec<String>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub location_id: Option<Uuid>,
    pub staff_id: Option<Uuid>,
}

impl Order {
    /// Check one lifecycle move against the allowed-transitions table.
    pub fn validate_transition(&self, next: OrderStatus) -> Result<()> {
        if self.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(Error::InvalidTransition {
                from: self.status.as_str().to_string(),
                to: next.as_str().to_string(),
            })
        }
    }
}

/// Inbound order creation payload, validated by the order engine.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: Uuid,
    pub items: Vec<NewOrderItem>,
    pub shipping_address: Option<Address>,
    pub billing_address: Option<Address>,
    pub source: OrderSource,
    pub location_id: Option<Uuid>,
    pub staff_id: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewOrderItem {
    pub product_id: Uuid,
    pub sku: String,
    pub name: String,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
}

impl CreateOrderRequest {
    pub fn validate(&self) -> Result<()> {
        if self.user_id.is_nil() {
            return Err(Error::InvalidArgument("user_id is required".to_string()));
        }
        if self.items.is_empty() {
            return Err(Error::InvalidArgument(
                "an order needs at least one item".to_string(),
            ));
        }
        for item in &self.items {
            if item.product_id.is_nil() || item.sku.is_empty() {
                return Err(Error::InvalidArgument(
                    "every item needs a product and sku".to_string(),
                ));
            }
            if item.quantity <= 0 {
                return Err(Error::InvalidArgument(
                    "item quantity must be positive".to_string(),
                ));
            }
            if item.price < Decimal::ZERO {
                return Err(Error::InvalidArgument(
                    "item price must not be negative".to_string(),
                ));
            }
        }
        if self.source == OrderSource::Pos && (self.location_id.is_none() || self.staff_id.is_none())
        {
            return Err(Error::InvalidArgument(
                "pos orders require location_id and staff_id".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[rstest::rstest]
    #[case(OrderStatus::Created, OrderStatus::Pending, true)]
    #[case(OrderStatus::Created, OrderStatus::Paid, true)]
    #[case(OrderStatus::Created, OrderStatus::Cancelled, true)]
    #[case(OrderStatus::Created, OrderStatus::Failed, true)]
    #[case(OrderStatus::Created, OrderStatus::Shipped, false)]
    #[case(OrderStatus::Pending, OrderStatus::Paid, true)]
    #[case(OrderStatus::Pending, OrderStatus::Shipped, false)]
    #[case(OrderStatus::Paid, OrderStatus::Shipped, true)]
    #[case(OrderStatus::Paid, OrderStatus::Cancelled, true)]
    #[case(OrderStatus::Paid, OrderStatus::Delivered, false)]
    #[case(OrderStatus::Shipped, OrderStatus::Delivered, true)]
    #[case(OrderStatus::Shipped, OrderStatus::Failed, true)]
    #[case(OrderStatus::Shipped, OrderStatus::Cancelled, false)]
    #[case(OrderStatus::Failed, OrderStatus::Pending, true)]
    #[case(OrderStatus::Failed, OrderStatus::Paid, false)]
    #[case(OrderStatus::Delivered, OrderStatus::Pending, false)]
    #[case(OrderStatus::Cancelled, OrderStatus::Pending, false)]
    fn test_status_transitions(
        #[case] from: OrderStatus,
        #[case] to: OrderStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[test]
    fn test_terminal_states() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Failed.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
    }

    #[test]
    fn test_subtotal_rounds_to_minor_unit() {
        let item = OrderItem::new(
            Uuid::new_v4(),
            "SKU-1".to_string(),
            "Widget".to_string(),
            3,
            dec!(3.333),
        );
        assert_eq!(item.subtotal, dec!(10.00));
    }

    #[test]
    fn test_pos_requires_location_and_staff() {
        let request = CreateOrderRequest {
            user_id: Uuid::new_v4(),
            items: vec![NewOrderItem {
                product_id: Uuid::new_v4(),
                sku: "SKU-1".to_string(),
                name: "Widget".to_string(),
                quantity: 1,
                price: dec!(5.00),
            }],
            shipping_address: None,
            billing_address: None,
            source: OrderSource::Pos,
            location_id: None,
            staff_id: None,
            notes: None,
        };
        assert!(matches!(
            request.validate(),
            Err(Error::InvalidArgument(_))
        ));
    }
}
