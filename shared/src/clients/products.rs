//! Product service client (external collaborator)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::ClientConfig;
use crate::error::Result;
use crate::proto::common::Page;
use crate::proto::products as pb;
use crate::rpc::RpcClient;
use crate::types::PageRequest;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub sku: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub currency: String,
    pub category_id: Option<String>,
    pub is_active: bool,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDraft {
    pub sku: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub category_id: Option<String>,
}

pub struct ProductClient {
    rpc: RpcClient,
}

impl ProductClient {
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

    pub async fn get_product(&self, id: &str) -> Result<Product> {
        let request = pb::GetProductRequest { id: id.to_string() };
        let product: pb::Product = self.rpc.call(pb::methods::GET_PRODUCT, &request).await?;
        Ok(product_from_proto(product))
    }

    pub async fn list_products(
        &self,
        query: &str,
        page: &PageRequest,
    ) -> Result<(Vec<Product>, i64)> {
        let request = pb::ListProductsRequest {
            query: query.to_string(),
            page: Some(Page {
                page: page.page,
                page_size: page.page_size,
                sort_by: page.sort_by.clone(),
                sort_asc: false,
            }),
        };
        let response: pb::ListProductsResponse =
            self.rpc.call(pb::methods::LIST_PRODUCTS, &request).await?;
        Ok((
            response
                .products
                .into_iter()
                .map(product_from_proto)
                .collect(),
            response.total,
        ))
    }

    pub async fn create_product(&self, draft: ProductDraft) -> Result<Product> {
        let request = upsert_request(String::new(), draft);
        let product: pb::Product = self.rpc.call(pb::methods::CREATE_PRODUCT, &request).await?;
        Ok(product_from_proto(product))
    }

    pub async fn update_product(&self, id: &str, draft: ProductDraft) -> Result<Product> {
        let request = upsert_request(id.to_string(), draft);
        let product: pb::Product = self.rpc.call(pb::methods::UPDATE_PRODUCT, &request).await?;
        Ok(product_from_proto(product))
    }

    pub async fn delete_product(&self, id: &str) -> Result<()> {
        let request = pb::DeleteProductRequest { id: id.to_string() };
        let _: crate::proto::common::Empty =
            self.rpc.call(pb::methods::DELETE_PRODUCT, &request).await?;
        Ok(())
    }

    pub async fn list_categories(&self, hierarchy: bool) -> Result<Vec<Category>> {
        let request = pb::ListCategoriesRequest { hierarchy };
        let response: pb::ListCategoriesResponse =
            self.rpc.call(pb::methods::LIST_CATEGORIES, &request).await?;
        Ok(response
            .categories
            .into_iter()
            .map(|category| Category {
                id: category.id,
                name: category.name,
                parent_id: category.parent_id,
            })
            .collect())
    }
}

fn upsert_request(id: String, draft: ProductDraft) -> pb::UpsertProductRequest {
    pb::UpsertProductRequest {
        id,
        sku: draft.sku,
        name: draft.name,
        description: draft.description,
        price: draft.price,
        category_id: draft.category_id,
    }
}

fn product_from_proto(product: pb::Product) -> Product {
    Product {
        id: product.id,
        sku: product.sku,
        name: product.name,
        description: product.description,
        price: product.price,
        currency: product.currency,
        category_id: product.category_id,
        is_active: product.is_active,
        metadata: product.metadata,
    }
}
