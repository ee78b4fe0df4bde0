//! Pre-read source checks: existence, size limit and content signature.
//!
//! Only JPEG, PNG and WebP sources are accepted. The signature is sniffed from
//! the first bytes so a mislabelled file is turned away before it is read
//! into memory.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Bytes needed to tell every accepted format apart.
const SIGNATURE_LEN: usize = 12;

const JPEG_SOI: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Source container recognised from its leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceSignature {
    Jpeg,
    Png,
    WebP,
}

impl SourceSignature {
    /// Match the start of a file against the accepted signatures.
    pub fn sniff(header: &[u8]) -> Option<Self> {
        if header.starts_with(JPEG_SOI) {
            Some(Self::Jpeg)
        } else if header.starts_with(PNG_SIGNATURE) {
            Some(Self::Png)
        } else if header.len() >= SIGNATURE_LEN
            && &header[..4] == b"RIFF"
            && &header[8..SIGNATURE_LEN] == b"WEBP"
        {
            Some(Self::WebP)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::WebP => "webp",
        }
    }
}

/// Turns away sources that cannot become variants, before they are read.
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Check a source path and report the format its content claims.
    pub fn validate(&self, path: &Path) -> Result<SourceSignature, PipelineError> {
        if !path.exists() {
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }

        let size = std::fs::metadata(path)
            .map_err(|e| unreadable(path, "Cannot read metadata", e))?
            .len();
        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if size > max_bytes {
            return Err(PipelineError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: size / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        let header = read_header(path)?;
        SourceSignature::sniff(&header).ok_or_else(|| PipelineError::UnsupportedFormat {
            source_name: display_name(path),
            format: "unrecognized content (expected JPEG, PNG or WebP)".to_string(),
        })
    }
}

fn read_header(path: &Path) -> Result<Vec<u8>, PipelineError> {
    let file = File::open(path).map_err(|e| unreadable(path, "Cannot open file", e))?;
    let mut header = Vec::with_capacity(SIGNATURE_LEN);
    file.take(SIGNATURE_LEN as u64)
        .read_to_end(&mut header)
        .map_err(|e| unreadable(path, "Cannot read header", e))?;
    Ok(header)
}

fn unreadable(path: &Path, what: &str, error: std::io::Error) -> PipelineError {
    PipelineError::Decode {
        source_name: display_name(path),
        message: format!("{what}: {error}"),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string()
}
