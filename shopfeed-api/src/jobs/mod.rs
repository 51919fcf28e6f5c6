//! Background jobs.

pub mod ingestion;

pub use ingestion::{ingestion_task, run_ingestion, IngestionConfig, IngestionReport};
