//! Messages shared by every service: reflection, pagination, addresses.
//! Health lives on the standard `grpc.health.v1` service.

/// Reflection request for the built-in method listing.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListMethodsRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListMethodsResponse {
    #[prost(string, tag = "1")]
    pub service: ::prost::alloc::string::String,
    #[prost(string, repeated, tag = "2")]
    pub methods: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
}

/// Page/page_size pagination. Out-of-range values are normalized, not
/// rejected: page 0 becomes 1, size 0 the default, oversized sizes clamp.
/// The sort field is whitelisted per listing; unknown fields fall back to
/// the default sort (created_at descending).
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Page {
    #[prost(int32, tag = "1")]
    pub page: i32,
    #[prost(int32, tag = "2")]
    pub page_size: i32,
    #[prost(string, optional, tag = "3")]
    pub sort_by: ::core::option::Option<::prost::alloc::string::String>,
    /// True for ascending order; descending is the default.
    #[prost(bool, tag = "4")]
    pub sort_asc: bool,
}

/// Postal address.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Address {
    #[prost(string, tag = "1")]
    pub street: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub city: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub state: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub postal_code: ::prost::alloc::string::String,
    #[prost(string, tag = "5")]
    pub country: ::prost::alloc::string::String,
}

/// Empty response for operations with nothing to return.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Empty {}
