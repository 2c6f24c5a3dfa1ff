//! Order service contract: order aggregate, lifecycle transitions and the
//! coordinated create/fulfil workflows.

use super::common::{Address, Page};

pub const SERVICE: &str = "meridian.orders.v1";

pub mod methods {
    pub const CREATE_ORDER: &str = "meridian.orders.v1/CreateOrder";
    pub const GET_ORDER: &str = "meridian.orders.v1/GetOrder";
    pub const LIST_USER_ORDERS: &str = "meridian.orders.v1/ListUserOrders";
    pub const LIST_ORDERS: &str = "meridian.orders.v1/ListOrders";
    pub const COUNT_BY_STATUS: &str = "meridian.orders.v1/CountByStatus";
    pub const UPDATE_STATUS: &str = "meridian.orders.v1/UpdateStatus";
    pub const ADD_PAYMENT: &str = "meridian.orders.v1/AddPayment";
    pub const ADD_TRACKING: &str = "meridian.orders.v1/AddTracking";
    pub const ADD_NOTE: &str = "meridian.orders.v1/AddNote";
    pub const CANCEL_ORDER: &str = "meridian.orders.v1/CancelOrder";
    pub const FULFIL_ORDER: &str = "meridian.orders.v1/FulfilOrder";
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum OrderStatus {
    Unspecified = 0,
    Created = 1,
    Pending = 2,
    Paid = 3,
    Shipped = 4,
    Delivered = 5,
    Cancelled = 6,
    Failed = 7,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum OrderSource {
    Unspecified = 0,
    Online = 1,
    Pos = 2,
    Mobile = 3,
    Api = 4,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct OrderItem {
    #[prost(string, tag = "1")]
    pub product_id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub sku: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub name: ::prost::alloc::string::String,
    #[prost(int32, tag = "4")]
    pub quantity: i32,
    /// Decimal string, e.g. "10.00".
    #[prost(string, tag = "5")]
    pub price: ::prost::alloc::string::String,
    /// Decimal string; always price x quantity rounded to 2 places.
    #[prost(string, tag = "6")]
    pub subtotal: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Payment {
    #[prost(string, tag = "1")]
    pub method: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub transaction_id: ::prost::alloc::string::String,
    /// Decimal string.
    #[prost(string, tag = "3")]
    pub amount: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub paid_at: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Order {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub user_id: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "3")]
    pub items: ::prost::alloc::vec::Vec<OrderItem>,
    /// Decimal string; sum of item subtotals.
    #[prost(string, tag = "4")]
    pub total_amount: ::prost::alloc::string::String,
    #[prost(string, tag = "5")]
    pub currency: ::prost::alloc::string::String,
    #[prost(enumeration = "OrderStatus", tag = "6")]
    pub status: i32,
    #[prost(enumeration = "OrderSource", tag = "7")]
    pub source: i32,
    #[prost(message, optional, tag = "8")]
    pub shipping_address: ::core::option::Option<Address>,
    #[prost(message, optional, tag = "9")]
    pub billing_address: ::core::option::Option<Address>,
    #[prost(message, optional, tag = "10")]
    pub payment: ::core::option::Option<Payment>,
    #[prost(string, optional, tag = "11")]
    pub tracking_code: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, repeated, tag = "12")]
    pub notes: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    #[prost(int32, tag = "13")]
    pub version: i32,
    #[prost(string, tag = "14")]
    pub created_at: ::prost::alloc::string::String,
    #[prost(string, tag = "15")]
    pub updated_at: ::prost::alloc::string::String,
    #[prost(string, optional, tag = "16")]
    pub completed_at: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "17")]
    pub location_id: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "18")]
    pub staff_id: ::core::option::Option<::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateOrderItem {
    #[prost(string, tag = "1")]
    pub product_id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub sku: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub name: ::prost::alloc::string::String,
    #[prost(int32, tag = "4")]
    pub quantity: i32,
    #[prost(string, tag = "5")]
    pub price: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateOrderRequest {
    #[prost(string, tag = "1")]
    pub user_id: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "2")]
    pub items: ::prost::alloc::vec::Vec<CreateOrderItem>,
    #[prost(message, optional, tag = "3")]
    pub shipping_address: ::core::option::Option<Address>,
    #[prost(message, optional, tag = "4")]
    pub billing_address: ::core::option::Option<Address>,
    #[prost(enumeration = "OrderSource", tag = "5")]
    pub source: i32,
    #[prost(string, optional, tag = "6")]
    pub location_id: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "7")]
    pub staff_id: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(string, optional, tag = "8")]
    pub notes: ::core::option::Option<::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetOrderRequest {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListUserOrdersRequest {
    #[prost(string, tag = "1")]
    pub user_id: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub page: ::core::option::Option<Page>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListOrdersRequest {
    #[prost(enumeration = "OrderStatus", optional, tag = "1")]
    pub status: ::core::option::Option<i32>,
    #[prost(message, optional, tag = "2")]
    pub page: ::core::option::Option<Page>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListOrdersResponse {
    #[prost(message, repeated, tag = "1")]
    pub orders: ::prost::alloc::vec::Vec<Order>,
    #[prost(int64, tag = "2")]
    pub total: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CountByStatusRequest {
    #[prost(enumeration = "OrderStatus", tag = "1")]
    pub status: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CountByStatusResponse {
    #[prost(int64, tag = "1")]
    pub count: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateStatusRequest {
    #[prost(string, tag = "1")]
    pub order_id: ::prost::alloc::string::String,
    #[prost(enumeration = "OrderStatus", tag = "2")]
    pub status: i32,
    #[prost(string, tag = "3")]
    pub actor_id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AddPaymentRequest {
    #[prost(string, tag = "1")]
    pub order_id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub method: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub transaction_id: ::prost::alloc::string::String,
    /// Decimal string; must equal the order total.
    #[prost(string, tag = "4")]
    pub amount: ::prost::alloc::string::String,
    #[prost(string, tag = "5")]
    pub actor_id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AddTrackingRequest {
    #[prost(string, tag = "1")]
    pub order_id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub tracking_code: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub actor_id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AddNoteRequest {
    #[prost(string, tag = "1")]
    pub order_id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub note: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub actor_id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CancelOrderRequest {
    #[prost(string, tag = "1")]
    pub order_id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub reason: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub actor_id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FulfilOrderRequest {
    #[prost(string, tag = "1")]
    pub order_id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub actor_id: ::prost::alloc::string::String,
}
