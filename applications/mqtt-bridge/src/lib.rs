pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod mqtt;
pub mod sensor;
