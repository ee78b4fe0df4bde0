//! ZIP packaging of generated variants.
//!
//! Entries are stored uncompressed: JPEG payloads do not shrink under deflate.

use std::io::{Seek, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::BatchError;
use crate::types::Variant;

/// Writes variants into a single ZIP archive.
pub struct ArchiveWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
    entries: usize,
}

impl<W: Write + Seek> ArchiveWriter<W> {
    /// Start an archive on the given sink.
    pub fn new(writer: W) -> Self {
        Self {
            zip: ZipWriter::new(writer),
            entries: 0,
        }
    }

    /// Append one variant under its generated name.
    pub fn add(&mut self, variant: &Variant) -> Result<(), BatchError> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        self.zip.start_file(variant.name.as_str(), options)?;
        self.zip
            .write_all(&variant.bytes)
            .map_err(zip::result::ZipError::Io)?;
        self.entries += 1;
        Ok(())
    }

    /// Number of entries written so far.
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Write the central directory and return the sink.
    pub fn finish(self) -> Result<W, BatchError> {
        Ok(self.zip.finish()?)
    }
}

/// Package all variants into one archive written to `writer`.
pub fn write_archive<W: Write + Seek>(writer: W, variants: &[Variant]) -> Result<W, BatchError> {
    let mut archive = ArchiveWriter::new(writer);
    for variant in variants {
        archive.add(variant)?;
    }
    tracing::debug!("Archived {} variant(s)", archive.entries());
    archive.finish()
}
