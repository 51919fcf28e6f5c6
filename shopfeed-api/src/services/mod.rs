//! Service layer over the cached catalog.

pub mod catalog_service;

pub use catalog_service::CatalogService;
