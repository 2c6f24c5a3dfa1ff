// ============================================================================
// MERIDIAN - RPC FABRIC
// ============================================================================
// Module: shared/src/rpc/mod.rs
// Description: Schema-first gRPC between services, built on tonic. Message
//              schemas are hand-declared prost structs (shared/src/proto),
//              carried over a raw-bytes codec so no protoc codegen is
//              involved anywhere.
// ============================================================================

pub mod client;
pub mod codec;
pub mod server;
pub mod status;

pub use client::RpcClient;
pub use codec::RawCodec;
pub use server::{FabricService, RpcServer};
pub use status::{Code, Status};
