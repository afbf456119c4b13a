pub mod address;
pub mod carrier;
pub mod de;
pub mod event;
pub mod integration;
pub mod money;
pub mod platform;
pub mod transaction;
pub mod user;
