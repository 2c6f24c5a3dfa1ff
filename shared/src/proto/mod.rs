// ============================================================================
// MERIDIAN - WIRE SCHEMAS
// ============================================================================
// Module: shared/src/proto/mod.rs
// Description: Schema-first request/response messages for the RPC fabric.
//              These structs are the contract between services; identifiers
//              travel as strings, money as decimal strings, timestamps as
//              RFC-3339 strings. Enums carry an Unspecified zero value that
//              exists at the wire layer only.
// ============================================================================

pub mod common;
pub mod inventory;
pub mod orders;
pub mod products;
pub mod suppliers;
pub mod users;
