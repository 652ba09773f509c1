mod gcs_store;
mod local_store;
mod object_store_ops;
mod store_factory;

pub use gcs_store::GcsBlobStore;
pub use local_store::LocalBlobStore;
pub use store_factory::BlobStoreFactory;
