//! Order service client

use serde::{Deserialize, Serialize};

use super::ClientConfig;
use crate::error::Result;
use crate::proto::common::Page;
use crate::proto::orders as pb;
use crate::rpc::RpcClient;
use crate::types::{Address, PageRequest, SortOrder};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub sku: String,
    pub name: String,
    pub quantity: i32,
    pub price: String,
    pub subtotal: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub method: String,
    pub transaction_id: String,
    pub amount: String,
    pub paid_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub total_amount: String,
    pub currency: String,
    pub status: String,
    pub source: String,
    pub shipping_address: Option<Address>,
    pub billing_address: Option<Address>,
    pub payment: Option<Payment>,
    pub tracking_code: Option<String>,
    pub notes: Vec<String>,
    pub version: i32,
    pub created_at: String,
    pub updated_at: String,
    pub completed_at: Option<String>,
    pub location_id: Option<String>,
    pub staff_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_id: String,
    pub sku: String,
    pub name: String,
    pub quantity: i32,
    pub price: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub user_id: String,
    pub items: Vec<NewOrderItem>,
    pub shipping_address: Option<Address>,
    pub billing_address: Option<Address>,
    pub source: String,
    pub location_id: Option<String>,
    pub staff_id: Option<String>,
    pub notes: Option<String>,
}

pub struct OrderClient {
    rpc: RpcClient,
}

impl OrderClient {
    pub fn new(config: ClientConfig) -> Self {
        let rpc = RpcClient::new(config.address, config.connect_timeout)
            .with_call_timeout(config.call_timeout);
        Self { rpc }
    }

    pub async fn close(&self) {
        self.rpc.close().await;
    }

    pub async fn health_check(&self) -> Result<bool> {
        Ok(self.rpc.health_check().await?)
    }

    pub async fn create_order(&self, new_order: NewOrder) -> Result<Order> {
        let request = pb::CreateOrderRequest {
            user_id: new_order.user_id,
            items: new_order
                .items
                .into_iter()
                .map(|item| pb::CreateOrderItem {
                    product_id: item.product_id,
                    sku: item.sku,
                    name: item.name,
                    quantity: item.quantity,
                    price: item.price,
                })
                .collect(),
            shipping_address: new_order.shipping_address.as_ref().map(address_to_proto),
            billing_address: new_order.billing_address.as_ref().map(address_to_proto),
            source: source_to_proto(&new_order.source),
            location_id: new_order.location_id,
            staff_id: new_order.staff_id,
            notes: new_order.notes,
        };
        let order: pb::Order = self.rpc.call(pb::methods::CREATE_ORDER, &request).await?;
        Ok(order_from_proto(order))
    }

    pub async fn get_order(&self, id: &str) -> Result<Order> {
        let request = pb::GetOrderRequest { id: id.to_string() };
        let order: pb::Order = self.rpc.call(pb::methods::GET_ORDER, &request).await?;
        Ok(order_from_proto(order))
    }

    pub async fn list_user_orders(
        &self,
        user_id: &str,
        page: &PageRequest,
    ) -> Result<(Vec<Order>, i64)> {
        let request = pb::ListUserOrdersRequest {
            user_id: user_id.to_string(),
            page: Some(page_to_proto(page)),
        };
        let response: pb::ListOrdersResponse =
            self.rpc.call(pb::methods::LIST_USER_ORDERS, &request).await?;
        Ok((
            response.orders.into_iter().map(order_from_proto).collect(),
            response.total,
        ))
    }

    pub async fn list_orders(
        &self,
        status: Option<&str>,
        page: &PageRequest,
    ) -> Result<(Vec<Order>, i64)> {
        let request = pb::ListOrdersRequest {
            status: status.map(status_to_proto),
            page: Some(page_to_proto(page)),
        };
        let response: pb::ListOrdersResponse =
            self.rpc.call(pb::methods::LIST_ORDERS, &request).await?;
        Ok((
            response.orders.into_iter().map(order_from_proto).collect(),
            response.total,
        ))
    }

    pub async fn count_by_status(&self, status: &str) -> Result<i64> {
        let request = pb::CountByStatusRequest {
            status: status_to_proto(status),
        };
        let response: pb::CountByStatusResponse =
            self.rpc.call(pb::methods::COUNT_BY_STATUS, &request).await?;
        Ok(response.count)
    }

    pub async fn update_status(&self, order_id: &str, status: &str, actor_id: &str) -> Result<Order> {
        let request = pb::UpdateStatusRequest {
            order_id: order_id.to_string(),
            status: status_to_proto(status),
            actor_id: actor_id.to_string(),
        };
        let order: pb::Order = self.rpc.call(pb::methods::UPDATE_STATUS, &request).await?;
        Ok(order_from_proto(order))
    }

    pub async fn add_payment(
        &self,
        order_id: &str,
        method: &str,
        transaction_id: &str,
        amount: &str,
        actor_id: &str,
    ) -> Result<Order> {
        let request = pb::AddPaymentRequest {
            order_id: order_id.to_string(),
            method: method.to_string(),
            transaction_id: transaction_id.to_string(),
            amount: amount.to_string(),
            actor_id: actor_id.to_string(),
        };
        let order: pb::Order = self.rpc.call(pb::methods::ADD_PAYMENT, &request).await?;
        Ok(order_from_proto(order))
    }

    pub async fn add_tracking(&self, order_id: &str, tracking_code: &str, actor_id: &str) -> Result<Order> {
        let request = pb::AddTrackingRequest {
            order_id: order_id.to_string(),
            tracking_code: tracking_code.to_string(),
            actor_id: actor_id.to_string(),
        };
        let order: pb::Order = self.rpc.call(pb::methods::ADD_TRACKING, &request).await?;
        Ok(order_from_proto(order))
    }

    pub async fn add_note(&self, order_id: &str, note: &str, actor_id: &str) -> Result<Order> {
        let request = pb::AddNoteRequest {
            order_id: order_id.to_string(),
            note: note.to_string(),
            actor_id: actor_id.to_string(),
        };
        let order: pb::Order = self.rpc.call(pb::methods::ADD_NOTE, &request).await?;
        Ok(order_from_proto(order))
    }

    pub async fn cancel_order(&self, order_id: &str, reason: &str, actor_id: &str) -> Result<Order> {
        let request = pb::CancelOrderRequest {
            order_id: order_id.to_string(),
            reason: reason.to_string(),
            actor_id: actor_id.to_string(),
        };
        let order: pb::Order = self.rpc.call(pb::methods::CANCEL_ORDER, &request).await?;
        Ok(order_from_proto(order))
    }

    pub async fn fulfil_order(&self, order_id: &str, actor_id: &str) -> Result<Order> {
        let request = pb::FulfilOrderRequest {
            order_id: order_id.to_string(),
            actor_id: actor_id.to_string(),
        };
        let order: pb::Order = self.rpc.call(pb::methods::FULFIL_ORDER, &request).await?;
        Ok(order_from_proto(order))
    }
}

fn page_to_proto(page: &PageRequest) -> Page {
    Page {
        page: page.page,
        page_size: page.page_size,
        sort_by: page.sort_by.clone(),
        sort_asc: matches!(page.sort_order, Some(SortOrder::Asc)),
    }
}

fn address_to_proto(address: &Address) -> crate::proto::common::Address {
    crate::proto::common::Address {
        street: address.street.clone(),
        city: address.city.clone(),
        state: address.state.clone(),
        postal_code: address.postal_code.clone(),
        country: address.country.clone(),
    }
}

fn address_from_proto(address: crate::proto::common::Address) -> Address {
    Address {
        street: address.street,
        city: address.city,
        state: address.state,
        postal_code: address.postal_code,
        country: address.country,
    }
}

pub(crate) fn status_to_proto(status: &str) -> i32 {
    match status {
        "created" => pb::OrderStatus::Created as i32,
        "pending" => pb::OrderStatus::Pending as i32,
        "paid" => pb::OrderStatus::Paid as i32,
        "shipped" => pb::OrderStatus::Shipped as i32,
        "delivered" => pb::OrderStatus::Delivered as i32,
        "cancelled" => pb::OrderStatus::Cancelled as i32,
        "failed" => pb::OrderStatus::Failed as i32,
        _ => pb::OrderStatus::Unspecified as i32,
    }
}

fn status_from_proto(status: i32) -> &'static str {
    match pb::OrderStatus::try_from(status) {
        Ok(pb::OrderStatus::Created) => "created",
        Ok(pb::OrderStatus::Pending) => "pending",
        Ok(pb::OrderStatus::Paid) => "paid",
        Ok(pb::OrderStatus::Shipped) => "shipped",
        Ok(pb::OrderStatus::Delivered) => "delivered",
        Ok(pb::OrderStatus::Cancelled) => "cancelled",
        Ok(pb::OrderStatus::Failed) => "failed",
        _ => "unspecified",
    }
}

fn source_to_proto(source: &str) -> i32 {
    match source {
        "online" => pb::OrderSource::Online as i32,
        "pos" => pb::OrderSource::Pos as i32,
        "mobile" => pb::OrderSource::Mobile as i32,
        "api" => pb::OrderSource::Api as i32,
        _ => pb::OrderSource::Unspecified as i32,
    }
}

fn source_from_proto(source: i32) -> &'static str {
    match pb::OrderSource::try_from(source) {
        Ok(pb::OrderSource::Online) => "online",
        Ok(pb::OrderSource::Pos) => "pos",
        Ok(pb::OrderSource::Mobile) => "mobile",
        Ok(pb::OrderSource::Api) => "api",
        _ => "unspecified",
    }
}

fn order_from_proto(order: pb::Order) -> Order {
    Order {
        id: order.id,
        user_id: order.user_id,
        items: order
            .items
            .into_iter()
            .map(|item| OrderItem {
                product_id: item.product_id,
                sku: item.sku,
                name: item.name,
                quantity: item.quantity,
                price: item.price,
                subtotal: item.subtotal,
            })
            .collect(),
        total_amount: order.total_amount,
        currency: order.currency,
        status: status_from_proto(order.status).to_string(),
        source: source_from_proto(order.source).to_string(),
        shipping_address: order.shipping_address.map(address_from_proto),
        billing_address: order.billing_address.map(address_from_proto),
        payment: order.payment.map(|payment| Payment {
            method: payment.method,
            transaction_id: payment.transaction_id,
            amount: payment.amount,
            paid_at: payment.paid_at,
        }),
        tracking_code: order.tracking_code,
        notes: order.notes,
        version: order.version,
        created_at: order.created_at,
        updated_at: order.updated_at,
        completed_at: order.completed_at,
        location_id: order.location_id,
        staff_id: order.staff_id,
    }
}
