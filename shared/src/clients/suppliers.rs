//! Supplier service client (external collaborator)

use serde::{Deserialize, Serialize};

use super::ClientConfig;
use crate::error::Result;
use crate::proto::common::Page;
use crate::proto::suppliers as pb;
use crate::rpc::RpcClient;
use crate::types::{Address, PageRequest};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<Address>,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<Address>,
}

pub struct SupplierClient {
    rpc: RpcClient,
}

impl SupplierClient {
    pub fn new(config: ClientConfig) -> Self {
        let rpc = RpcClient::new(config.address, config.connect_timeout)
            .with_call_timeout(config.call_timeout);
        Self { rpc }
    }

    pub async fn close(&self) {
        self.rpc.close().await;
    }

    pub async fn health_check(&self) -> Result<bool> {
        Ok(self.rpc.health_check().await?)
    }

    pub async fn get_supplier(&self, id: &str) -> Result<Supplier> {
        let request = pb::GetSupplierRequest { id: id.to_string() };
        let supplier: pb::Supplier = self.rpc.call(pb::methods::GET_SUPPLIER, &request).await?;
        Ok(supplier_from_proto(supplier))
    }

    pub async fn list_suppliers(&self, page: &PageRequest) -> Result<(Vec<Supplier>, i64)> {
        let request = pb::ListSuppliersRequest {
            page: Some(Page {
                page: page.page,
                page_size: page.page_size,
                sort_by: page.sort_by.clone(),
                sort_asc: false,
            }),
        };
        let response: pb::ListSuppliersResponse =
            self.rpc.call(pb::methods::LIST_SUPPLIERS, &request).await?;
        Ok((
            response
                .suppliers
                .into_iter()
                .map(supplier_from_proto)
                .collect(),
            response.total,
        ))
    }

    pub async fn create_supplier(&self, draft: SupplierDraft) -> Result<Supplier> {
        let request = upsert_request(String::new(), draft);
        let supplier: pb::Supplier = self.rpc.call(pb::methods::CREATE_SUPPLIER, &request).await?;
        Ok(supplier_from_proto(supplier))
    }

    pub async fn update_supplier(&self, id: &str, draft: SupplierDraft) -> Result<Supplier> {
        let request = upsert_request(id.to_string(), draft);
        let supplier: pb::Supplier = self.rpc.call(pb::methods::UPDATE_SUPPLIER, &request).await?;
        Ok(supplier_from_proto(supplier))
    }

    pub async fn delete_supplier(&self, id: &str) -> Result<()> {
        let request = pb::DeleteSupplierRequest { id: id.to_string() };
        let _: crate::proto::common::Empty =
            self.rpc.call(pb::methods::DELETE_SUPPLIER, &request).await?;
        Ok(())
    }
}

fn upsert_request(id: String, draft: SupplierDraft) -> pb::UpsertSupplierRequest {
    pb::UpsertSupplierRequest {
        id,
        name: draft.name,
        email: draft.email,
        phone: draft.phone,
        address: draft.address.map(|address| crate::proto::common::Address {
            street: address.street,
            city: address.city,
            state: address.state,
            postal_code: address.postal_code,
            country: address.country,
        }),
    }
}

fn supplier_from_proto(supplier: pb::Supplier) -> Supplier {
    Supplier {
        id: supplier.id,
        name: supplier.name,
        email: supplier.email,
        phone: supplier.phone,
        address: supplier.address.map(|address| Address {
            street: address.street,
            city: address.city,
            state: address.state,
            postal_code: address.postal_code,
            country: address.country,
        }),
        is_active: supplier.is_active,
        created_at: supplier.created_at,
    }
}
