//! Authenticated access to the remote GraphQL API
//!
//! Three pieces cooperate here:
//! - [`TokenProvider`] owns the credential cache: lazy acquisition (key
//!   exchange or pre-issued token) and invalidation on rejection
//! - [`GraphQlTransport`] POSTs GraphQL documents with a bearer token and
//!   maps transport/GraphQL failures into [`crate::Error`], retrying exactly
//!   once after a credential refresh when the API rejects the token
//! - [`queries`] holds the GraphQL documents; field sets are part of the
//!   wire contract and must not drift

pub mod auth;
pub mod queries;
pub mod transport;

pub use auth::TokenProvider;
pub use transport::GraphQlTransport;
