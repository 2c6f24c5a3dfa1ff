pub mod clients;
pub mod config;
pub mod database;
pub mod error;
pub mod events;
pub mod proto;
pub mod rpc;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
