pub mod availability;
pub mod booking;
pub mod codec;
pub mod http;
pub mod model;
pub mod observability;
pub mod store;
pub mod views;
