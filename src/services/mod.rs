// src/services/mod.rs
//
// Transport services shared by the auth and todo modules

pub mod api_client;

pub use api_client::ApiClient;
