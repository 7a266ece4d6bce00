//! Feature Store HTTP Server Library
//!
//! Provides the REST API components (router, handlers, types) as a library
//! so integration tests can build a router directly, without going through
//! `main`.

pub mod api;
pub mod config;
pub mod error;
pub mod features;
pub mod raw_data;

/// The concrete `FeatureStore` type this server wires up: the built-in
/// feature catalog over a CSV-backed raw data provider. Shared between
/// `main.rs` and the REST layer so `AppState` does not need to be generic
/// over the raw data provider.
pub type AppFeatureStore = feature_store_sdk::FeatureStore<raw_data::CsvRawDataProvider>;
