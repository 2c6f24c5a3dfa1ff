//! Shared gateway state: config, token verifier and the typed clients for
//! every backend service. Built once at startup and handed to every
//! handler; no global singletons.

use std::sync::Arc;
use std::time::Duration;

use meridian_shared::clients::{
    ClientConfig, InventoryClient, OrderClient, ProductClient, SupplierClient, UserClient,
};
use meridian_shared::Config;

use crate::auth::JwtVerifier;

pub struct AppState {
    pub config: Config,
    pub jwt: JwtVerifier,
    pub inventory: InventoryClient,
    pub orders: OrderClient,
    pub products: ProductClient,
    pub suppliers: SupplierClient,
    pub users: UserClient,
}

impl AppState {
    pub fn new(config: Config) -> Arc<Self> {
        let jwt = JwtVerifier::new(&config.jwt_secret);
        let call_timeout = Duration::from_secs(30);

        let client = |address: &str| {
            ClientConfig::new(address.to_string()).with_call_timeout(call_timeout)
        };

        Arc::new(Self {
            jwt,
            inventory: InventoryClient::new(client(&config.services.inventory)),
            orders: OrderClient::new(client(&config.services.order)),
            products: ProductClient::new(client(&config.services.product)),
            suppliers: SupplierClient::new(client(&config.services.supplier)),
            users: UserClient::new(client(&config.services.user)),
            config,
        })
    }
}
