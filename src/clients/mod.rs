//! Clients - HTTP Clients for External APIs
//!
//! This module contains the backend contract and its reqwest implementation.

pub mod roadside_api;
pub mod roadside_api_client;

pub use roadside_api::RoadsideApi;
pub use roadside_api_client::{RetryPolicy, RoadsideApiClient};
