//! Per-user picture albums on object storage and the NASA picture of the day

pub mod apod;
pub mod models;
pub mod service;
pub mod storage;

pub use apod::{ApodClient, ApodConfig, NasaApodClient};
pub use models::Media;
pub use service::{MediaError, MediaService};
pub use storage::{MemoryStore, ObjectStore, S3Store, StorageConfig};
