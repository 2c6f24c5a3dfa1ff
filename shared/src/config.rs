use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{Error, Result};

/// Default fabric ports, one per service.
pub const PRODUCT_SERVICE_PORT: u16 = 50053;
pub const INVENTORY_SERVICE_PORT: u16 = 50054;
pub const ORDER_SERVICE_PORT: u16 = 50055;
pub const USER_SERVICE_PORT: u16 = 50056;
pub const SUPPLIER_SERVICE_PORT: u16 = 50057;
pub const STORE_SERVICE_PORT: u16 = 50058;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub environment: String,
    pub log_level: String,
    pub gateway_port: u16,
    /// Fabric port for the current process; unset means the service's
    /// well-known default.
    pub rpc_port: Option<u16>,
    pub database_url: String,
    pub redis_url: String,
    pub jwt_secret: String,
    pub services: ServiceAddrs,
}

/// Addresses of the fabric services the current process may dial.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceAddrs {
    pub product: String,
    pub inventory: String,
    pub order: String,
    pub user: String,
    pub supplier: String,
    pub store: String,
}

impl Config {
    /// Load configuration from the environment (and `.env` when present).
    ///
    /// Values without a safe default fail fast with a diagnostic naming the
    /// missing variable, so a misconfigured deployment dies at startup
    /// rather than at first request.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            gateway_port: parse_port("GATEWAY_PORT", 8000)?,
            rpc_port: parse_opt_port("RPC_PORT")?,
            database_url: required("DATABASE_URL")?,
            redis_url: required("REDIS_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            services: ServiceAddrs {
                product: addr_or_default("PRODUCT_SERVICE_ADDR", PRODUCT_SERVICE_PORT),
                inventory: addr_or_default("INVENTORY_SERVICE_ADDR", INVENTORY_SERVICE_PORT),
                order: addr_or_default("ORDER_SERVICE_ADDR", ORDER_SERVICE_PORT),
                user: addr_or_default("USER_SERVICE_ADDR", USER_SERVICE_PORT),
                supplier: addr_or_default("SUPPLIER_SERVICE_ADDR", SUPPLIER_SERVICE_PORT),
                store: addr_or_default("STORE_SERVICE_ADDR", STORE_SERVICE_PORT),
            },
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn required(name: &str) -> Result<String> {
    env::var(name).map_err(|_| {
        Error::Configuration(format!("required environment variable {name} is not set"))
    })
}

fn parse_port(name: &str, default: u16) -> Result<u16> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| Error::Configuration(format!("{name} is not a valid port: {raw}"))),
        Err(_) => Ok(default),
    }
}

fn parse_opt_port(name: &str) -> Result<Option<u16>> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| Error::Configuration(format!("{name} is not a valid port: {raw}"))),
        Err(_) => Ok(None),
    }
}

fn addr_or_default(name: &str, port: u16) -> String {
    env::var(name).unwrap_or_else(|_| format!("127.0.0.1:{port}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_required_is_diagnostic() {
        let err = required("MERIDIAN_TEST_UNSET_VAR").unwrap_err();
        assert!(err.to_string().contains("MERIDIAN_TEST_UNSET_VAR"));
    }

    #[test]
    fn test_port_default() {
        assert_eq!(parse_port("MERIDIAN_TEST_UNSET_PORT", 50054).unwrap(), 50054);
    }
}
