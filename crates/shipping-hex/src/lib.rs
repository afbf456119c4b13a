//! shipping-hex: carrier gateway core (dispatcher, shipment orchestrator, webhook ingestor)
//! plus its inbound HTTP adapter.

pub mod config;
pub mod errors;

pub mod application;

pub use shipping_types::{domain, ports};

pub mod inbound; // HTTP adapter (server + handlers)
