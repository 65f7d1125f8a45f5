pub mod admission;
pub mod blob_store;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod ordering;
pub mod segmenter;
pub mod state;
pub mod storage;
pub mod supervisor;
