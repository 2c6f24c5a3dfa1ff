//! Supplier service contract (external collaborator). CRUD surface only;
//! integration adapters live outside this repository.

pub const SERVICE: &str = "meridian.suppliers.v1";

pub mod methods {
    pub const GET_SUPPLIER: &str = "meridian.suppliers.v1/GetSupplier";
    pub const LIST_SUPPLIERS: &str = "meridian.suppliers.v1/ListSuppliers";
    pub const CREATE_SUPPLIER: &str = "meridian.suppliers.v1/CreateSupplier";
    pub const UPDATE_SUPPLIER: &str = "meridian.suppliers.v1/UpdateSupplier";
    pub const DELETE_SUPPLIER: &str = "meridian.suppliers.v1/DeleteSupplier";
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Supplier {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub name: ::prost::alloc::string::String,
    /// Unique per supplier; enforced by the supplier service's storage.
    #[prost(string, tag = "3")]
    pub email: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub phone: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "5")]
    pub address: ::core::option::Option<super::common::Address>,
    #[prost(bool, tag = "6")]
    pub is_active: bool,
    #[prost(string, tag = "7")]
    pub created_at: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetSupplierRequest {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListSuppliersRequest {
    #[prost(message, optional, tag = "1")]
    pub page: ::core::option::Option<super::common::Page>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListSuppliersResponse {
    #[prost(message, repeated, tag = "1")]
    pub suppliers: ::prost::alloc::vec::Vec<Supplier>,
    #[prost(int64, tag = "2")]
    pub total: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpsertSupplierRequest {
    /// Empty id means create.
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub email: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub phone: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "5")]
    pub address: ::core::option::Option<super::common::Address>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteSupplierRequest {
    #[prost(string, tag = "1")]
    pub id: ::prost::alloc::string::String,
}
