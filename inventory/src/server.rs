// ============================================================================
// MERIDIAN - INVENTORY RPC SERVER
// ============================================================================
// Module: inventory/src/server.rs
// Description: Registers the inventory engine's methods on the fabric and
//              converts between wire messages and domain models
// ============================================================================

use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use meridian_shared::proto::common::{Address as AddressMsg, Empty, Page};
use meridian_shared::proto::inventory as pb;
use meridian_shared::rpc::{FabricService, RpcServer, Status};
use meridian_shared::types::{Address, PageRequest, SortOrder};

use crate::models::{
    AvailabilityQuery, CreateItemRequest, CreateLocationRequest, InventoryItem, ItemAvailability,
    PosAdjustmentItem, PosTransactionType, Reservation, ReservationStatus, StockStatus,
    StoreLocation, Transfer, TransferStatus, UpdateLocationRequest,
};
use crate::service::InventoryService;

/// Fabric identity of the inventory service.
pub struct InventoryFabric;

impl FabricService for InventoryFabric {
    const NAME: &'static str = pb::SERVICE;
}

/// Builds the fabric server for the inventory service with every method
/// registered.
pub fn build_rpc_server(service: Arc<InventoryService>) -> RpcServer<InventoryFabric> {
    let mut server = RpcServer::new();

    // ------------------------------------------------------------------ items

    let svc = Arc::clone(&service);
    server.register(pb::methods::CREATE_ITEM, move |req: pb::CreateItemRequest| {
        let svc = Arc::clone(&svc);
        async move {
            let request = CreateItemRequest {
                product_id: parse_uuid(&req.product_id, "product_id")?,
                sku: req.sku,
                location_id: parse_uuid(&req.location_id, "location_id")?,
                quantity: req.quantity,
                reorder_threshold: req.reorder_threshold,
                reorder_amount: req.reorder_amount,
            };
            let item = svc.create_item(request).await?;
            Ok(item_to_proto(&item))
        }
    });

    let svc = Arc::clone(&service);
    server.register(pb::methods::GET_ITEM, move |req: pb::GetItemRequest| {
        let svc = Arc::clone(&svc);
        async move {
            let item = svc.get_item(parse_uuid(&req.id, "id")?).await?;
            Ok(item_to_proto(&item))
        }
    });

    let svc = Arc::clone(&service);
    server.register(
        pb::methods::GET_ITEM_BY_PRODUCT,
        move |req: pb::GetItemByProductRequest| {
            let svc = Arc::clone(&svc);
            async move {
                let product_id = parse_uuid(&req.product_id, "product_id")?;
                let location_id = parse_opt_uuid(req.location_id.as_deref(), "location_id")?;
                let item = svc.get_item_by_product(product_id, location_id).await?;
                Ok(item_to_proto(&item))
            }
        },
    );

    let svc = Arc::clone(&service);
    server.register(pb::methods::LIST_ITEMS, move |req: pb::ListItemsRequest| {
        let svc = Arc::clone(&svc);
        async move {
            let location_id = parse_opt_uuid(req.location_id.as_deref(), "location_id")?;
            let page = page_from_proto(req.page);
            let (items, total) = svc.list_items(location_id, &page).await?;
            Ok(pb::ListItemsResponse {
                items: items.iter().map(item_to_proto).collect(),
                total,
            })
        }
    });

    let svc = Arc::clone(&service);
    server.register(pb::methods::ADD_STOCK, move |req: pb::StockChangeRequest| {
        let svc = Arc::clone(&svc);
        async move {
            let item = svc
                .add_stock(
                    parse_uuid(&req.item_id, "item_id")?,
                    req.quantity,
                    &req.reason,
                    parse_opt_uuid(none_if_empty(&req.actor_id), "actor_id")?,
                )
                .await?;
            Ok(item_to_proto(&item))
        }
    });

    let svc = Arc::clone(&service);
    server.register(
        pb::methods::REMOVE_STOCK,
        move |req: pb::StockChangeRequest| {
            let svc = Arc::clone(&svc);
            async move {
                let item = svc
                    .remove_stock(
                        parse_uuid(&req.item_id, "item_id")?,
                        req.quantity,
                        &req.reason,
                        parse_opt_uuid(none_if_empty(&req.actor_id), "actor_id")?,
                    )
                    .await?;
                Ok(item_to_proto(&item))
            }
        },
    );

    let svc = Arc::clone(&service);
    server.register(
        pb::methods::ADJUST_STOCK,
        move |req: pb::AdjustStockRequest| {
            let svc = Arc::clone(&svc);
            async move {
                let item = svc
                    .adjust(
                        parse_uuid(&req.item_id, "item_id")?,
                        req.new_quantity,
                        &req.reason,
                        parse_opt_uuid(none_if_empty(&req.actor_id), "actor_id")?,
                    )
                    .await?;
                Ok(item_to_proto(&item))
            }
        },
    );

    // ----------------------------------------------------------- reservations

    let svc = Arc::clone(&service);
    server.register(pb::methods::RESERVE, move |req: pb::ReserveRequest| {
        let svc = Arc::clone(&svc);
        async move {
            let ttl = if req.ttl_seconds > 0 {
                Some(chrono::Duration::seconds(req.ttl_seconds))
            } else {
                None
            };
            let reservation = svc
                .reserve(
                    parse_uuid(&req.item_id, "item_id")?,
                    parse_uuid(&req.order_id, "order_id")?,
                    req.quantity,
                    ttl,
                )
                .await?;
            Ok(reservation_to_proto(&reservation))
        }
    });

    let svc = Arc::clone(&service);
    server.register(pb::methods::RELEASE, move |req: pb::ReleaseRequest| {
        let svc = Arc::clone(&svc);
        async move {
            let reservation = svc
                .release(parse_uuid(&req.reservation_id, "reservation_id")?, &req.reason)
                .await?;
            Ok(reservation_to_proto(&reservation))
        }
    });

    let svc = Arc::clone(&service);
    server.register(pb::methods::FULFIL, move |req: pb::FulfilRequest| {
        let svc = Arc::clone(&svc);
        async move {
            let reservation = svc
                .fulfil(parse_uuid(&req.reservation_id, "reservation_id")?)
                .await?;
            Ok(reservation_to_proto(&reservation))
        }
    });

    let svc = Arc::clone(&service);
    server.register(
        pb::methods::LIST_ORDER_RESERVATIONS,
        move |req: pb::ListOrderReservationsRequest| {
            let svc = Arc::clone(&svc);
            async move {
                let reservations = svc
                    .reservations_for_order(parse_uuid(&req.order_id, "order_id")?)
                    .await?;
                Ok(pb::ListOrderReservationsResponse {
                    reservations: reservations.iter().map(reservation_to_proto).collect(),
                })
            }
        },
    );

    // ------------------------------------------------------------ availability

    let svc = Arc::clone(&service);
    server.register(
        pb::methods::CHECK_AVAILABILITY,
        move |req: pb::CheckAvailabilityRequest| {
            let svc = Arc::clone(&svc);
            async move {
                let queries = queries_from_proto(&req.items)?;
                let results = svc
                    .check_availability(parse_uuid(&req.location_id, "location_id")?, &queries)
                    .await?;
                Ok(pb::CheckAvailabilityResponse {
                    results: results.iter().map(availability_to_proto).collect(),
                })
            }
        },
    );

    let svc = Arc::clone(&service);
    server.register(
        pb::methods::GET_NEARBY_INVENTORY,
        move |req: pb::GetNearbyInventoryRequest| {
            let svc = Arc::clone(&svc);
            async move {
                let queries = queries_from_proto(&req.items)?;
                let max_locations = if req.max_locations > 0 {
                    Some(req.max_locations as usize)
                } else {
                    None
                };
                let nearby = svc
                    .get_nearby_inventory(
                        parse_uuid(&req.origin_location_id, "origin_location_id")?,
                        &queries,
                        req.radius_km,
                        max_locations,
                    )
                    .await?;
                Ok(pb::GetNearbyInventoryResponse {
                    locations: nearby
                        .iter()
                        .map(|n| pb::NearbyLocation {
                            location: Some(location_to_proto(&n.location)),
                            distance_km: n.distance_km,
                            availability: n.availability.iter().map(availability_to_proto).collect(),
                        })
                        .collect(),
                })
            }
        },
    );

    // ---------------------------------------------------------------- transfers

    let svc = Arc::clone(&service);
    server.register(
        pb::methods::CREATE_TRANSFER,
        move |req: pb::CreateTransferRequest| {
            let svc = Arc::clone(&svc);
            async move {
                let transfer = svc
                    .create_transfer(
                        parse_uuid(&req.product_id, "product_id")?,
                        &req.sku,
                        parse_uuid(&req.source_location_id, "source_location_id")?,
                        parse_uuid(&req.dest_location_id, "dest_location_id")?,
                        req.quantity,
                        parse_uuid(&req.requested_by, "requested_by")?,
                    )
                    .await?;
                Ok(transfer_to_proto(&transfer))
            }
        },
    );

    let svc = Arc::clone(&service);
    server.register(
        pb::methods::START_TRANSFER,
        move |req: pb::TransferActionRequest| {
            let svc = Arc::clone(&svc);
            async move {
                let estimated_arrival =
                    parse_opt_timestamp(req.estimated_arrival.as_deref(), "estimated_arrival")?;
                let transfer = svc
                    .start_transfer(
                        parse_uuid(&req.transfer_id, "transfer_id")?,
                        parse_uuid(&req.actor_id, "actor_id")?,
                        estimated_arrival,
                    )
                    .await?;
                Ok(transfer_to_proto(&transfer))
            }
        },
    );

    let svc = Arc::clone(&service);
    server.register(
        pb::methods::COMPLETE_TRANSFER,
        move |req: pb::TransferActionRequest| {
            let svc = Arc::clone(&svc);
            async move {
                let transfer = svc
                    .complete_transfer(
                        parse_uuid(&req.transfer_id, "transfer_id")?,
                        parse_uuid(&req.actor_id, "actor_id")?,
                    )
                    .await?;
                Ok(transfer_to_proto(&transfer))
            }
        },
    );

    let svc = Arc::clone(&service);
    server.register(
        pb::methods::CANCEL_TRANSFER,
        move |req: pb::TransferActionRequest| {
            let svc = Arc::clone(&svc);
            async move {
                let transfer = svc
                    .cancel_transfer(
                        parse_uuid(&req.transfer_id, "transfer_id")?,
                        parse_uuid(&req.actor_id, "actor_id")?,
                    )
                    .await?;
                Ok(transfer_to_proto(&transfer))
            }
        },
    );

    let svc = Arc::clone(&service);
    server.register(pb::methods::GET_TRANSFER, move |req: pb::GetTransferRequest| {
        let svc = Arc::clone(&svc);
        async move {
            let transfer = svc.get_transfer(parse_uuid(&req.id, "id")?).await?;
            Ok(transfer_to_proto(&transfer))
        }
    });

    let svc = Arc::clone(&service);
    server.register(
        pb::methods::LIST_TRANSFERS,
        move |req: pb::ListTransfersRequest| {
            let svc = Arc::clone(&svc);
            async move {
                let status = req
                    .status
                    .map(transfer_status_from_proto)
                    .transpose()?;
                let page = page_from_proto(req.page);
                let (transfers, total) = svc.list_transfers(status, &page).await?;
                Ok(pb::ListTransfersResponse {
                    transfers: transfers.iter().map(transfer_to_proto).collect(),
                    total,
                })
            }
        },
    );

    // -------------------------------------------------------------------- pos

    let svc = Arc::clone(&service);
    server.register(
        pb::methods::POS_ADJUSTMENT,
        move |req: pb::PosAdjustmentRequest| {
            let svc = Arc::clone(&svc);
            async move {
                let transaction_type = match pb::PosTransactionType::try_from(req.transaction_type)
                {
                    Ok(pb::PosTransactionType::Sale) => PosTransactionType::Sale,
                    Ok(pb::PosTransactionType::Return) => PosTransactionType::Return,
                    Ok(pb::PosTransactionType::Exchange) => PosTransactionType::Exchange,
                    _ => {
                        return Err(Status::invalid_argument(
                            "transaction_type must be sale, return or exchange",
                        ))
                    }
                };

                let mut items = Vec::with_capacity(req.items.len());
                for item in &req.items {
                    items.push(PosAdjustmentItem {
                        product_id: parse_uuid(&item.product_id, "product_id")?,
                        quantity: item.quantity,
                        incoming: item.incoming,
                    });
                }

                let result = svc
                    .pos_adjustment(
                        parse_uuid(&req.location_id, "location_id")?,
                        transaction_type,
                        parse_uuid(&req.staff_id, "staff_id")?,
                        &items,
                    )
                    .await?;

                Ok(pb::PosAdjustmentResponse {
                    success: result.success,
                    results: result
                        .results
                        .into_iter()
                        .map(|r| pb::PosItemResult {
                            product_id: r.product_id.to_string(),
                            success: r.success,
                            error: r.error,
                        })
                        .collect(),
                })
            }
        },
    );

    // -------------------------------------------------------------- locations

    let svc = Arc::clone(&service);
    server.register(
        pb::methods::CREATE_LOCATION,
        move |req: pb::CreateLocationRequest| {
            let svc = Arc::clone(&svc);
            async move {
                let request = CreateLocationRequest {
                    name: req.name,
                    location_type: req.location_type,
                    address: req.address.map(address_from_proto),
                    latitude: req.latitude,
                    longitude: req.longitude,
                };
                let location = svc.create_location(request).await?;
                Ok(location_to_proto(&location))
            }
        },
    );

    let svc = Arc::clone(&service);
    server.register(pb::methods::GET_LOCATION, move |req: pb::GetLocationRequest| {
        let svc = Arc::clone(&svc);
        async move {
            let location = svc.get_location(parse_uuid(&req.id, "id")?).await?;
            Ok(location_to_proto(&location))
        }
    });

    let svc = Arc::clone(&service);
    server.register(
        pb::methods::UPDATE_LOCATION,
        move |req: pb::UpdateLocationRequest| {
            let svc = Arc::clone(&svc);
            async move {
                let update = UpdateLocationRequest {
                    name: req.name,
                    location_type: req.location_type,
                    address: req.address.map(address_from_proto),
                    latitude: req.latitude,
                    longitude: req.longitude,
                    is_active: req.is_active,
                };
                let location = svc
                    .update_location(parse_uuid(&req.id, "id")?, update)
                    .await?;
                Ok(location_to_proto(&location))
            }
        },
    );

    let svc = Arc::clone(&service);
    server.register(
        pb::methods::DELETE_LOCATION,
        move |req: pb::DeleteLocationRequest| {
            let svc = Arc::clone(&svc);
            async move {
                svc.deactivate_location(parse_uuid(&req.id, "id")?).await?;
                Ok(Empty {})
            }
        },
    );

    let svc = Arc::clone(&service);
    server.register(
        pb::methods::LIST_LOCATIONS,
        move |req: pb::ListLocationsRequest| {
            let svc = Arc::clone(&svc);
            async move {
                let page = page_from_proto(req.page);
                let (locations, total) = svc.list_locations(req.include_inactive, &page).await?;
                Ok(pb::ListLocationsResponse {
                    locations: locations.iter().map(location_to_proto).collect(),
                    total,
                })
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

fn parse_opt_uuid(raw: Option<&str>, field: &str) -> Result<Option<Uuid>, Status> {
    raw.map(|raw| parse_uuid(raw, field)).transpose()
}

fn none_if_empty(raw: &str) -> Option<&str> {
    if raw.is_empty() {
        None
    } else {
        Some(raw)
    }
}

fn parse_opt_timestamp(
    raw: Option<&str>,
    field: &str,
) -> Result<Option<DateTime<Utc>>, Status> {
    raw.map(|raw| {
        DateTime::parse_from_rfc3339(raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|_| Status::invalid_argument(format!("{field} must be an RFC-3339 timestamp")))
    })
    .transpose()
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

fn queries_from_proto(items: &[pb::AvailabilityQuery]) -> Result<Vec<AvailabilityQuery>, Status> {
    items
        .iter()
        .map(|item| {
            Ok(AvailabilityQuery {
                product_id: parse_uuid(&item.product_id, "product_id")?,
                quantity: item.quantity,
            })
        })
        .collect()
}

fn item_to_proto(item: &InventoryItem) -> pb::InventoryItem {
    pb::InventoryItem {
        id: item.id.to_string(),
        product_id: item.product_id.to_string(),
        sku: item.sku.clone(),
        location_id: item.location_id.to_string(),
        quantity: item.quantity,
        reserved: item.reserved,
        available: item.available(),
        reorder_threshold: item.reorder_threshold,
        reorder_amount: item.reorder_amount,
        created_at: item.created_at.to_rfc3339(),
        last_updated: item.last_updated.to_rfc3339(),
    }
}

fn reservation_to_proto(reservation: &Reservation) -> pb::Reservation {
    let status = match reservation.status {
        ReservationStatus::Active => pb::ReservationStatus::Active,
        ReservationStatus::Fulfilled => pb::ReservationStatus::Fulfilled,
        ReservationStatus::Released => pb::ReservationStatus::Released,
        ReservationStatus::Expired => pb::ReservationStatus::Expired,
    };
    pb::Reservation {
        id: reservation.id.to_string(),
        inventory_item_id: reservation.inventory_item_id.to_string(),
        order_id: reservation.order_id.to_string(),
        quantity: reservation.quantity,
        status: status as i32,
        reserved_at: reservation.reserved_at.to_rfc3339(),
        expires_at: reservation.expires_at.to_rfc3339(),
    }
}

fn availability_to_proto(result: &ItemAvailability) -> pb::AvailabilityResult {
    let status = match result.status {
        StockStatus::InStock => pb::StockStatus::InStock,
        StockStatus::LowStock => pb::StockStatus::LowStock,
        StockStatus::OutOfStock => pb::StockStatus::OutOfStock,
        StockStatus::NotFound => pb::StockStatus::NotFound,
    };
    pb::AvailabilityResult {
        product_id: result.product_id.to_string(),
        in_stock: result.in_stock,
        available_quantity: result.available_quantity,
        status: status as i32,
    }
}

fn transfer_status_from_proto(status: i32) -> Result<TransferStatus, Status> {
    match pb::TransferStatus::try_from(status) {
        Ok(pb::TransferStatus::Requested) => Ok(TransferStatus::Requested),
        Ok(pb::TransferStatus::InTransit) => Ok(TransferStatus::InTransit),
        Ok(pb::TransferStatus::Completed) => Ok(TransferStatus::Completed),
        Ok(pb::TransferStatus::Cancelled) => Ok(TransferStatus::Cancelled),
        _ => Err(Status::invalid_argument("unknown transfer status")),
    }
}

fn transfer_to_proto(transfer: &Transfer) -> pb::Transfer {
    let status = match transfer.status {
        TransferStatus::Requested => pb::TransferStatus::Requested,
        TransferStatus::InTransit => pb::TransferStatus::InTransit,
        TransferStatus::Completed => pb::TransferStatus::Completed,
        TransferStatus::Cancelled => pb::TransferStatus::Cancelled,
    };
    pb::Transfer {
        id: transfer.id.to_string(),
        product_id: transfer.product_id.to_string(),
        sku: transfer.sku.clone(),
        source_location_id: transfer.source_location_id.to_string(),
        dest_location_id: transfer.dest_location_id.to_string(),
        quantity: transfer.quantity,
        status: status as i32,
        requested_by: transfer.requested_by.to_string(),
        approved_by: transfer.approved_by.map(|id| id.to_string()),
        estimated_arrival: transfer.estimated_arrival.map(|ts| ts.to_rfc3339()),
        requested_at: transfer.requested_at.to_rfc3339(),
        updated_at: transfer.updated_at.to_rfc3339(),
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

fn location_to_proto(location: &StoreLocation) -> pb::StoreLocation {
    pb::StoreLocation {
        id: location.id.to_string(),
        name: location.name.clone(),
        location_type: location.location_type.clone(),
        address: location.address.as_ref().map(|address| AddressMsg {
            street: address.street.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            postal_code: address.postal_code.clone(),
            country: address.country.clone(),
        }),
        latitude: location.latitude,
        longitude: location.longitude,
        is_active: location.is_active,
        created_at: location.created_at.to_rfc3339(),
        updated_at: location.updated_at.to_rfc3339(),
    }
}
