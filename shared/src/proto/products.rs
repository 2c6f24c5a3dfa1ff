//! Product service contract (external collaborator). Catalog CRUD and
//! category trees live outside this repository; the gateway only routes.

pub const SERVICE: &str = "meridian.products.v1";

pub mod methods {
    pub const GET_PRODUCT: &str = "meridian.products.v1/GetProduct";
    pub const LIST_PRODUCTS: &str = "meridian.products.v1/ListProducts";
    pub const CREATE_PRODUCT: &str = "meridian.products.v1/CreateProduct";
    pub const UPDATE_PRODUCT: &str = "meridian.products.v1/UpdateProduct";
    pub const DELETE_PRODUCT: &str = "meridian.products.v1/DeleteProduct";
    pub const LIST_CATEGORIES: &str = "meridian.products.v1/ListCategories";
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Product {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub sku: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub description: ::prost::alloc::string::String,
    /// Decimal string.
    #[prost(string, tag = "5")]
    pub price: ::prost::alloc::string::String,
    #[prost(string, tag = "6")]
    pub currency: ::prost::alloc::string::String,
    #[prost(string, optional, tag = "7")]
    pub category_id: ::core::option::Option<::prost::alloc::string::String>,
    #[prost(bool, tag = "8")]
    pub is_active: bool,
    #[prost(map = "string, string", tag = "9")]
    pub metadata: ::std::collections::HashMap<
        ::prost::alloc::string::String,
        ::prost::alloc::string::String,
    >,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetProductRequest {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListProductsRequest {
    /// Substring filter on name/sku; empty matches everything.
    #[prost(string, tag = "1")]
    pub query: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub page: ::core::option::Option<super::common::Page>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListProductsResponse {
    #[prost(message, repeated, tag = "1")]
    pub products: ::prost::alloc::vec::Vec<Product>,
    #[prost(int64, tag = "2")]
    pub total: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpsertProductRequest {
    /// Empty id means create.
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub sku: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub description: ::prost::alloc::string::String,
    #[prost(string, tag = "5")]
    pub price: ::prost::alloc::string::String,
    #[prost(string, optional, tag = "6")]
    pub category_id: ::core::option::Option<::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteProductRequest {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Category {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, optional, tag = "3")]
    pub parent_id: ::core::option::Option<::prost::alloc::string::String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListCategoriesRequest {
    /// When true the response is ordered as a depth-first hierarchy walk.
    #[prost(bool, tag = "1")]
    pub hierarchy: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListCategoriesResponse {
    #[prost(message, repeated, tag = "1")]
    pub categories: ::prost::alloc::vec::Vec<Category>,
}
