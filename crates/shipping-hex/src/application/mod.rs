pub mod authorization;
pub mod config_resolver;
pub mod context;
pub mod gateway_service;
pub mod shipment_service;
pub mod signature;
pub mod webhook_service;
