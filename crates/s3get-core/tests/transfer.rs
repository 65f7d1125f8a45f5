//! End-to-end tests driving `supervisor::run` against an in-process fake
//! `BlobStore` — no network, no AWS credentials.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use s3get_core::blob_store::{BlobStore, ObjectLocation};
use s3get_core::config::TransferConfig;
use s3get_core::error::{FetchCause, ProbeError, TransferError};
use s3get_core::storage::{staging_path, Destination};
use s3get_core::supervisor;

struct FakeBlobStore {
    data: Bytes,
    segment_size: u64,
    fail_index: Option<usize>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FakeBlobStore {
    fn new(data: impl Into<Bytes>, segment_size: u64) -> Self {
        Self {
            data: data.into(),
            segment_size,
            fail_index: None,
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    fn failing_at(mut self, index: usize) -> Self {
        self.fail_index = Some(index);
        self
    }
}

#[async_trait]
impl BlobStore for FakeBlobStore {
    async fn object_size(&self, _location: &ObjectLocation) -> Result<u64, ProbeError> {
        Ok(self.data.len() as u64)
    }

    async fn fetch_range(
        &self,
        _location: &ObjectLocation,
        first_byte: u64,
        last_byte: u64,
    ) -> Result<Bytes, FetchCause> {
        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(in_flight, Ordering::SeqCst);
        tokio::task::yield_now().await;

        let index = (first_byte / self.segment_size) as usize;
        let result = if self.fail_index == Some(index) {
            Err(FetchCause::Http(500))
        } else {
            Ok(self.data.slice(first_byte as usize..=last_byte as usize))
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

fn location() -> ObjectLocation {
    ObjectLocation {
        bucket: "bucket".to_string(),
        key: "object".to_string(),
    }
}

fn config(segment_size: u64) -> TransferConfig {
    let mut cfg = TransferConfig::default();
    cfg.max_segment_size = segment_size;
    cfg.max_concurrent_requests = 3;
    cfg.max_pending_appends = 3;
    cfg.poll_interval_ms = 5;
    cfg.timeout_secs = 5;
    cfg
}

#[tokio::test]
async fn tiny_object_round_trips_through_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let final_path = dir.path().join("tiny.bin");
    let store: Arc<dyn BlobStore> = Arc::new(FakeBlobStore::new(&b"hi"[..], 4096));

    supervisor::run(store, "s3://bucket/object", Destination::File(final_path.clone()), &config(4096))
        .await
        .unwrap();

    assert_eq!(std::fs::read(&final_path).unwrap(), b"hi");
}

#[tokio::test]
async fn object_that_is_an_exact_multiple_of_segment_size_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let final_path = dir.path().join("exact.bin");
    let data = (0u8..=255).collect::<Vec<_>>().repeat(4); // 1024 bytes, 4 x 256-byte segments
    let store: Arc<dyn BlobStore> = Arc::new(FakeBlobStore::new(data.clone(), 256));

    supervisor::run(store, "s3://bucket/object", Destination::File(final_path.clone()), &config(256))
        .await
        .unwrap();

    assert_eq!(std::fs::read(&final_path).unwrap(), data);
}

#[tokio::test]
async fn object_one_byte_past_a_segment_boundary_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let final_path = dir.path().join("offbyone.bin");
    let data = vec![7u8; 257]; // one more byte than a single 256-byte segment
    let store: Arc<dyn BlobStore> = Arc::new(FakeBlobStore::new(data.clone(), 256));

    supervisor::run(store, "s3://bucket/object", Destination::File(final_path.clone()), &config(256))
        .await
        .unwrap();

    assert_eq!(std::fs::read(&final_path).unwrap(), data);
}

#[tokio::test]
async fn stdout_destination_completes_without_a_final_file() {
    let store: Arc<dyn BlobStore> = Arc::new(FakeBlobStore::new(vec![1u8; 4096], 1024));
    supervisor::run(store, "s3://bucket/object", Destination::Stdout, &config(1024))
        .await
        .unwrap();
}

#[tokio::test]
async fn a_single_segment_failure_aborts_the_whole_transfer_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let final_path = dir.path().join("failed.bin");
    let data = vec![9u8; 1024]; // 4 segments of 256 bytes
    let store: Arc<dyn BlobStore> = Arc::new(FakeBlobStore::new(data, 256).failing_at(1));

    let err = supervisor::run(store, "s3://bucket/object", Destination::File(final_path.clone()), &config(256))
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::SegmentFailed(1)));
    assert!(!final_path.exists());
    assert!(!staging_path(&final_path).exists());
}

#[tokio::test]
async fn once_one_segment_fails_later_segments_never_get_spawned() {
    // Segment 0 fails; the admission loop should observe the abort and stop
    // launching new segments well before segment 9.
    let dir = tempfile::tempdir().unwrap();
    let final_path = dir.path().join("cascade.bin");
    let data = vec![3u8; 2560]; // 10 segments of 256 bytes
    let store: Arc<dyn BlobStore> = Arc::new(FakeBlobStore::new(data, 256).failing_at(0));

    let mut cfg = config(256);
    cfg.max_concurrent_requests = 1;
    cfg.max_pending_appends = 1;

    let err = supervisor::run(store, "s3://bucket/object", Destination::File(final_path.clone()), &cfg)
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::SegmentFailed(0)));
    assert!(!final_path.exists());
}

#[tokio::test]
async fn never_more_in_flight_fetches_than_the_concurrency_ceiling() {
    let data = vec![0u8; 256 * 20];
    let store = Arc::new(FakeBlobStore::new(data, 256));
    let store_dyn: Arc<dyn BlobStore> = store.clone();

    let mut cfg = config(256);
    cfg.max_concurrent_requests = 3;

    supervisor::run(store_dyn, "s3://bucket/object", Destination::Stdout, &cfg)
        .await
        .unwrap();

    assert!(store.peak_in_flight.load(Ordering::SeqCst) <= 3);
}
