pub mod blobs;

pub use blobs::BlobRepository;
