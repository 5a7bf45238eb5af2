//! Chunked copy of a solution executable from the shared location into the
//! local install directory, reporting whole-number progress.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

pub const CHUNK_SIZE: usize = 1024;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("source file not found: {0}")]
    SourceMissing(PathBuf),
    #[error("transfer failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Lazy, finite, non-restartable stream of copy progress. Each `next()` call
/// copies one chunk and yields `floor(copied / total * 100)`. An I/O error
/// ends the stream and leaves a partial destination file behind; callers are
/// expected to surface that rather than retry silently.
#[derive(Debug)]
pub struct ChunkedCopy {
    source: File,
    destination: File,
    total: u64,
    copied: u64,
    done: bool,
}

impl ChunkedCopy {
    pub fn start(source: &Path, destination: &Path) -> Result<Self, TransferError> {
        if !source.exists() {
            return Err(TransferError::SourceMissing(source.to_path_buf()));
        }
        let total = source.metadata()?.len();
        Ok(Self {
            source: File::open(source)?,
            destination: File::create(destination)?,
            total,
            copied: 0,
            done: false,
        })
    }

    fn copy_chunk(&mut self) -> Result<Option<u8>, TransferError> {
        let mut chunk = [0u8; CHUNK_SIZE];
        let read = self.source.read(&mut chunk)?;
        if read == 0 {
            // An empty source still completes; everything else already
            // reported 100 on its final chunk.
            if self.total == 0 && self.copied == 0 {
                self.done = true;
                return Ok(Some(100));
            }
            return Ok(None);
        }
        self.destination.write_all(&chunk[..read])?;
        self.copied += read as u64;
        let percent = (self.copied.saturating_mul(100) / self.total).min(100);
        Ok(Some(percent as u8))
    }
}

impl Iterator for ChunkedCopy {
    type Item = Result<u8, TransferError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.copy_chunk() {
            Ok(Some(percent)) => Some(Ok(percent)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
