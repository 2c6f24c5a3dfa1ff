// ============================================================================
// MERIDIAN - ORDER RPC SERVER
// ============================================================================
// Module: orders/src/server.rs
// Description: Registers the order engine and coordinator methods on the
//              fabric and converts between wire messages and domain models
// ============================================================================

use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use meridian_shared::proto::common::{Address as AddressMsg, Page};
use meridian_shared::proto::orders as pb;
use meridian_shared::rpc::{FabricService, RpcServer, Status};
use meridian_shared::types::{Address, PageRequest, SortOrder};

use crate::coordinator::OrderInventoryCoordinator;
use crate::models::{CreateOrderRequest, NewOrderItem, Order, OrderSource, OrderStatus};
use crate::service::OrderService;

/// Fabric identity of the order service.
pub struct OrderFabric;

impl FabricService for OrderFabric {
    const NAME: &'static str = pb::SERVICE;
}

/// Builds the fabric server for the order service with every method
/// registered.
pub fn build_rpc_server(
    service: Arc<OrderService>,
    coordinator: Arc<OrderInventoryCoordinator>,
) -> RpcServer<OrderFabric> {
    let mut server = RpcServer::new();

    let coord = Arc::clone(&coordinator);
    server.register(pb::methods::CREATE_ORDER, move |req: pb::CreateOrderRequest| {
        let coord = Arc::clone(&coord);
        async move {
            let request = create_request_from_proto(req)?;
            let order = coord.create_order_checked(request, None).await?;
            Ok(order_to_proto(&order))
        }
    });

    let svc = Arc::clone(&service);
    server.register(pb::methods::GET_ORDER, move |req: pb::GetOrderRequest| {
        let svc = Arc::clone(&svc);
        async move {
            let order = svc.get(parse_uuid(&req.id, "id")?).await?;
            Ok(order_to_proto(&order))
        }
    });

    let svc = Arc::clone(&service);
    server.register(
        pb::methods::LIST_USER_ORDERS,
        move |req: pb::ListUserOrdersRequest| {
            let svc = Arc::clone(&svc);
            async move {
                let page = page_from_proto(req.page);
                let (orders, total) = svc
                    .list_user_orders(parse_uuid(&req.user_id, "user_id")?, &page)
                    .await?;
                Ok(pb::ListOrdersResponse {
                    orders: orders.iter().map(order_to_proto).collect(),
                    total,
                })
            }
        },
    );

    let svc = Arc::clone(&service);
    server.register(pb::methods::LIST_ORDERS, move |req: pb::ListOrdersRequest| {
        let svc = Arc::clone(&svc);
        async move {
            let status = req.status.map(status_from_proto).transpose()?;
            let page = page_from_proto(req.page);
            let (orders, total) = svc.list_orders(status, &page).await?;
            Ok(pb::ListOrdersResponse {
                orders: orders.iter().map(order_to_proto).collect(),
                total,
            })
        }
    });

    let svc = Arc::clone(&service);
    server.register(
        pb::methods::COUNT_BY_STATUS,
        move |req: pb::CountByStatusRequest| {
            let svc = Arc::clone(&svc);
            async move {
                let status = status_from_proto(req.status)?;
                let count = svc.count_by_status(status).await?;
                Ok(pb::CountByStatusResponse { count })
            }
        },
    );

    let svc = Arc::clone(&service);
    server.register(
        pb::methods::UPDATE_STATUS,
        move |req: pb::UpdateStatusRequest| {
            let svc = Arc::clone(&svc);
            async move {
                let order = svc
                    .update_status(
                        parse_uuid(&req.order_id, "order_id")?,
                        status_from_proto(req.status)?,
                        parse_opt_actor(&req.actor_id)?,
                    )
                    .await?;
                Ok(order_to_proto(&order))
            }
        },
    );

    let svc = Arc::clone(&service);
    server.register(pb::methods::ADD_PAYMENT, move |req: pb::AddPaymentRequest| {
        let svc = Arc::clone(&svc);
        async move {
            let amount = Decimal::from_str(&req.amount)
                .map_err(|_| Status::invalid_argument("amount must be a decimal string"))?;
            let order = svc
                .add_payment(
                    parse_uuid(&req.order_id, "order_id")?,
                    &req.method,
                    &req.transaction_id,
                    amount,
                    parse_opt_actor(&req.actor_id)?,
                )
                .await?;
            Ok(order_to_proto(&order))
        }
    });

    let svc = Arc::clone(&service);
    server.register(
        pb::methods::ADD_TRACKING,
        move |req: pb::AddTrackingRequest| {
            let svc = Arc::clone(&svc);
            async move {
                let order = svc
                    .add_tracking(
                        parse_uuid(&req.order_id, "order_id")?,
                        &req.tracking_code,
                        parse_opt_actor(&req.actor_id)?,
                    )
                    .await?;
                Ok(order_to_proto(&order))
            }
        },
    );

    let svc = Arc::clone(&service);
    server.register(pb::methods::ADD_NOTE, move |req: pb::AddNoteRequest| {
        let svc = Arc::clone(&svc);
        async move {
            let order = svc
                .add_note(
                    parse_uuid(&req.order_id, "order_id")?,
                    &req.note,
                    parse_opt_actor(&req.actor_id)?,
                )
                .await?;
            Ok(order_to_proto(&order))
        }
    });

    let coord = Arc::clone(&coordinator);
    server.register(
        pb::methods::CANCEL_ORDER,
        move |req: pb::CancelOrderRequest| {
            let coord = Arc::clone(&coord);
            async move {
                let order = coord
                    .cancel_order(
                        parse_uuid(&req.order_id, "order_id")?,
                        &req.reason,
                        parse_opt_actor(&req.actor_id)?,
                    )
                    .await?;
                Ok(order_to_proto(&order))
            }
        },
    );

    let coord = Arc::clone(&coordinator);
    server.register(
        pb::methods::FULFIL_ORDER,
        move |req: pb::FulfilOrderRequest| {
            let coord = Arc::clone(&coord);
            async move {
                let order = coord
                    .fulfil_order(
                        parse_uuid(&req.order_id, "order_id")?,
                        parse_opt_actor(&req.actor_id)?,
                    )
                    .await?;
                Ok(order_to_proto(&order))
            }
        },
    );

    server
}

// ============================================================================
// WIRE CONVERSIONS
// ============================================================================

fn parse_uuid(raw: &str, field: &str) -> Result<Uuid, Status> {
    Uuid::parse_str(raw).map_err(|_| Status::invalid_argument(format!("{field} must be a uuid")))
}

fn parse_opt_actor(raw: &str) -> Result<Option<Uuid>, Status> {
    if raw.is_empty() {
        Ok(None)
    } else {
        parse_uuid(raw, "actor_id").map(Some)
    }
}

fn page_from_proto(page: Option<Page>) -> PageRequest {
    match page {
        Some(page) => {
            let mut request = PageRequest::new(page.page, page.page_size);
            request.sort_by = page.sort_by;
            request.sort_order = Some(if page.sort_asc {
                SortOrder::Asc
            } else {
                SortOrder::Desc
            });
            request
        }
        None => PageRequest::default(),
    }
}

fn status_from_proto(status: i32) -> Result<OrderStatus, Status> {
    match pb::OrderStatus::try_from(status) {
        Ok(pb::OrderStatus::Created) => Ok(OrderStatus::Created),
        Ok(pb::OrderStatus::Pending) => Ok(OrderStatus::Pending),
        Ok(pb::OrderStatus::Paid) => Ok(OrderStatus::Paid),
        Ok(pb::OrderStatus::Shipped) => Ok(OrderStatus::Shipped),
        Ok(pb::OrderStatus::Delivered) => Ok(OrderStatus::Delivered),
        Ok(pb::OrderStatus::Cancelled) => Ok(OrderStatus::Cancelled),
        Ok(pb::OrderStatus::Failed) => Ok(OrderStatus::Failed),
        _ => Err(Status::invalid_argument("unknown order status")),
    }
}

fn status_to_proto(status: OrderStatus) -> pb::OrderStatus {
    match status {
        OrderStatus::Created => pb::OrderStatus::Created,
        OrderStatus::Pending => pb::OrderStatus::Pending,
        OrderStatus::Paid => pb::OrderStatus::Paid,
        OrderStatus::Shipped => pb::OrderStatus::Shipped,
        OrderStatus::Delivered => pb::OrderStatus::Delivered,
        OrderStatus::Cancelled => pb::OrderStatus::Cancelled,
        OrderStatus::Failed => pb::OrderStatus::Failed,
    }
}

fn source_from_proto(source: i32) -> Result<OrderSource, Status> {
    match pb::OrderSource::try_from(source) {
        Ok(pb::OrderSource::Online) => Ok(OrderSource::Online),
        Ok(pb::OrderSource::Pos) => Ok(OrderSource::Pos),
        Ok(pb::OrderSource::Mobile) => Ok(OrderSource::Mobile),
        Ok(pb::OrderSource::Api) => Ok(OrderSource::Api),
        _ => Err(Status::invalid_argument("unknown order source")),
    }
}

fn source_to_proto(source: OrderSource) -> pb::OrderSource {
    match source {
        OrderSource::Online => pb::OrderSource::Online,
        OrderSource::Pos => pb::OrderSource::Pos,
        OrderSource::Mobile => pb::OrderSource::Mobile,
        OrderSource::Api => pb::OrderSource::Api,
    }
}

fn address_from_proto(address: AddressMsg) -> Address {
    Address {
        street: address.street,
        city: address.city,
        state: address.state,
        postal_code: address.postal_code,
        country: address.country,
    }
}

fn address_to_proto(address: &Address) -> AddressMsg {
    AddressMsg {
        street: address.street.clone(),
        city: address.city.clone(),
        state: address.state.clone(),
        postal_code: address.postal_code.clone(),
        country: address.country.clone(),
    }
}

fn create_request_from_proto(req: pb::CreateOrderRequest) -> Result<CreateOrderRequest, Status> {
    let mut items = Vec::with_capacity(req.items.len());
    for item in req.items {
        items.push(NewOrderItem {
            product_id: parse_uuid(&item.product_id, "product_id")?,
            sku: item.sku,
            name: item.name,
            quantity: item.quantity,
            price: Decimal::from_str(&item.price)
                .map_err(|_| Status::invalid_argument("price must be a decimal string"))?,
        });
    }

    Ok(CreateOrderRequest {
        user_id: parse_uuid(&req.user_id, "user_id")?,
        items,
        shipping_address: req.shipping_address.map(address_from_proto),
        billing_address: req.billing_address.map(address_from_proto),
        source: source_from_proto(req.source)?,
        location_id: req
            .location_id
            .as_deref()
            .map(|raw| parse_uuid(raw, "location_id"))
            .transpose()?,
        staff_id: req
            .staff_id
            .as_deref()
            .map(|raw| parse_uuid(raw, "staff_id"))
            .transpose()?,
        notes: req.notes,
    })
}

fn order_to_proto(order: &Order) -> pb::Order {
    pb::Order {
        id: order.id.to_string(),
        user_id: order.user_id.to_string(),
        items: order
            .items
            .iter()
            .map(|item| pb::OrderItem {
                product_id: item.product_id.to_string(),
                sku: item.sku.clone(),
                name: item.name.clone(),
                quantity: item.quantity,
                price: item.price.to_string(),
                subtotal: item.subtotal.to_string(),
            })
            .collect(),
        total_amount: order.total_amount.to_string(),
        currency: order.currency.clone(),
        status: status_to_proto(order.status) as i32,
        source: source_to_proto(order.source) as i32,
        shipping_address: order.shipping_address.as_ref().map(address_to_proto),
        billing_address: order.billing_address.as_ref().map(address_to_proto),
        payment: order.payment.as_ref().map(|payment| pb::Payment {
            method: payment.method.clone(),
            transaction_id: payment.transaction_id.clone(),
            amount: payment.amount.to_string(),
            paid_at: payment.paid_at.to_rfc3339(),
        }),
        tracking_code: order.tracking_code.clone(),
        notes: order.notes.clone(),
        version: order.version,
        created_at: order.created_at.to_rfc3339(),
        updated_at: order.updated_at.to_rfc3339(),
        completed_at: order.completed_at.map(|ts| ts.to_rfc3339()),
        location_id: order.location_id.map(|id| id.to_string()),
        staff_id: order.staff_id.map(|id| id.to_string()),
    }
}
