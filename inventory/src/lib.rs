// ============================================================================
// MERIDIAN - INVENTORY SERVICE CRATE
// ============================================================================
// Module: inventory/src/lib.rs
// Description: Multi-location stock engine: items, reservations, transfers,
//              availability and nearby lookups, POS adjustments
// ============================================================================

pub mod models;
pub mod repository;
pub mod server;
pub mod service;

pub use server::build_rpc_server;
pub use service::sweeper::ReservationSweeper;
pub use service::InventoryService;
