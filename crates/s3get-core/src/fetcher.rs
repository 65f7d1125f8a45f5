//! Range Fetcher: issues one ranged GET per segment and validates the
//! returned length (spec.md §4.3). No retry — a failed or short fetch
//! terminates the transfer.

use bytes::Bytes;

use crate::blob_store::{BlobStore, ObjectLocation};
use crate::error::{FetchCause, FetchError};
use crate::segmenter::Segment;

pub async fn fetch_segment(
    blob_store: &dyn BlobStore,
    location: &ObjectLocation,
    segment: &Segment,
) -> Result<Bytes, FetchError> {
    let body = blob_store
        .fetch_range(location, segment.first_byte, segment.last_byte)
        .await
        .map_err(|cause| FetchError {
            index: segment.index,
            cause,
        })?;

    let expected = segment.len();
    if body.len() as u64 != expected {
        return Err(FetchError {
            index: segment.index,
            cause: FetchCause::ShortBody {
                expected,
                received: body.len() as u64,
            },
        });
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::error::ProbeError;

    struct FixedBodyStore {
        body: Bytes,
    }

    #[async_trait]
    impl BlobStore for FixedBodyStore {
        async fn object_size(&self, _location: &ObjectLocation) -> Result<u64, ProbeError> {
            Ok(self.body.len() as u64)
        }

        async fn fetch_range(
            &self,
            _location: &ObjectLocation,
            _first_byte: u64,
            _last_byte: u64,
        ) -> Result<Bytes, FetchCause> {
            Ok(self.body.clone())
        }
    }

    fn location() -> ObjectLocation {
        ObjectLocation {
            bucket: "bucket".to_string(),
            key: "key".to_string(),
        }
    }

    #[tokio::test]
    async fn accepts_a_body_matching_the_segment_length() {
        let store = FixedBodyStore {
            body: Bytes::from_static(b"hello"),
        };
        let segment = Segment {
            index: 0,
            first_byte: 0,
            last_byte: 4,
        };
        let result = fetch_segment(&store, &location(), &segment).await.unwrap();
        assert_eq!(result, Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn rejects_a_short_body() {
        let store = FixedBodyStore {
            body: Bytes::from_static(b"hi"),
        };
        let segment = Segment {
            index: 3,
            first_byte: 0,
            last_byte: 4,
        };
        let err = fetch_segment(&store, &location(), &segment).await.unwrap_err();
        assert_eq!(err.index, 3);
        assert!(matches!(err.cause, FetchCause::ShortBody { .. }));
    }
}
