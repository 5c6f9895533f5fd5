pub mod bootstrap;
pub mod catalog_service;
pub mod order_receiver;

pub use catalog_service::{CatalogError, CatalogService};
pub use order_receiver::receive_order;
