//! OrderedWriter: appends segment bytes to the destination strictly in
//! ascending index order, as driven by the OrderingToken chain (spec.md
//! §4.5).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tokio::sync::Mutex;

use super::Destination;
use crate::error::WriteError;

enum Sink {
    File {
        writer: BufWriter<File>,
        staging_path: PathBuf,
        final_path: PathBuf,
    },
    Stdout,
}

/// Owns the destination handle for the whole transfer. Wrapped in a
/// `tokio::sync::Mutex` so the type is `Send`/`Sync` across spawned tasks —
/// never contended in practice, since the OrderingToken chain already
/// guarantees at most one task calls `append` at a time (spec.md §5).
pub struct OrderedWriter {
    sink: Mutex<Sink>,
}

impl OrderedWriter {
    /// Creates the staging file (file destination) or prepares to write
    /// straight to stdout. `file_buffer_size` sizes the `BufWriter`
    /// (spec.md §4.5's `FileBufferSize`).
    pub fn create(destination: &Destination, file_buffer_size: usize) -> Result<Self, WriteError> {
        let sink = match destination {
            Destination::File(final_path) => {
                let staging_path = super::staging_path(final_path);
                let file = File::create(&staging_path).map_err(WriteError::Io)?;
                Sink::File {
                    writer: BufWriter::with_capacity(file_buffer_size, file),
                    staging_path,
                    final_path: final_path.clone(),
                }
            }
            Destination::Stdout => Sink::Stdout,
        };
        Ok(Self {
            sink: Mutex::new(sink),
        })
    }

    /// Appends `bytes` to the destination. Callers must only call this
    /// after awaiting the segment's predecessor OrderingToken.
    pub async fn append(&self, bytes: &[u8]) -> Result<(), WriteError> {
        let mut sink = self.sink.lock().await;
        match &mut *sink {
            Sink::File { writer, .. } => writer.write_all(bytes).map_err(WriteError::Io),
            Sink::Stdout => std::io::stdout().lock().write_all(bytes).map_err(WriteError::Io),
        }
    }

    /// Flushes, syncs, and atomically renames the staging file to its final
    /// path. No-op for stdout. Consumes the writer.
    pub async fn finalize(self) -> Result<(), WriteError> {
        match self.sink.into_inner() {
            Sink::File {
                mut writer,
                staging_path,
                final_path,
            } => {
                writer.flush().map_err(WriteError::Io)?;
                writer.get_ref().sync_all().map_err(WriteError::Io)?;
                drop(writer);
                std::fs::rename(&staging_path, &final_path).map_err(WriteError::Finalize)
            }
            Sink::Stdout => Ok(()),
        }
    }

    /// Removes the staging file after a failed transfer. No-op for stdout.
    pub async fn cleanup(self) {
        if let Sink::File {
            writer,
            staging_path,
            ..
        } = self.sink.into_inner()
        {
            drop(writer);
            let _ = std::fs::remove_file(&staging_path);
        }
    }
}
