// ============================================================================
// MERIDIAN - ORDER SERVICE CRATE
// ============================================================================
// Module: orders/src/lib.rs
// Description: Order lifecycle engine and the order/inventory coordinator
// ============================================================================

pub mod coordinator;
pub mod event_handlers;
pub mod models;
pub mod repository;
pub mod server;
pub mod service;

pub use coordinator::{InventoryPort, OrderInventoryCoordinator};
pub use server::build_rpc_server;
pub use service::OrderService;
