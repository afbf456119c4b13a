//! shipping-types: domain model and ports shared by the carrier gateway crates.

pub mod domain;
pub mod ports;
