//! Manifest output in JSON or JSONL format.
//!
//! A manifest lists one [`VariantRecord`](crate::types::VariantRecord) per
//! generated variant. It is written next to the archive, never into it.

use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Manifest format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Single JSON array
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }

    /// Canonical name, as accepted by [`OutputFormat::parse`].
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::JsonLines => "jsonl",
        }
    }
}

/// A writer that serializes records to JSON or JSONL format.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    items_written: usize,
}

impl<W: Write> OutputWriter<W> {
    /// Create a new output writer.
    ///
    /// `pretty` only affects the JSON format; JSONL is always one object per line.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            items_written: 0,
        }
    }

    /// Write a single record.
    pub fn write<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        if self.pretty && self.format == OutputFormat::Json {
            serde_json::to_writer_pretty(&mut self.writer, item).map_err(io::Error::other)?;
        } else {
            serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
        }
        writeln!(self.writer)?;
        self.items_written += 1;
        Ok(())
    }

    /// Write all records: a JSON array, or one line per record for JSONL.
    pub fn write_all<T: Serialize>(&mut self, items: &[T]) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => {
                if self.pretty {
                    serde_json::to_writer_pretty(&mut self.writer, items)
                        .map_err(io::Error::other)?;
                } else {
                    serde_json::to_writer(&mut self.writer, items).map_err(io::Error::other)?;
                }
                writeln!(self.writer)?;
                self.items_written += items.len();
            }
            OutputFormat::JsonLines => {
                for item in items {
                    self.write(item)?;
                }
            }
        }
        Ok(())
    }

    /// Get the number of records written.
    pub fn items_written(&self) -> usize {
        self.items_written
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Consume the writer and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Write a complete manifest file, replacing any existing one.
pub fn write_manifest<T: Serialize>(
    path: &Path,
    format: OutputFormat,
    records: &[T],
) -> io::Result<usize> {
    let file = File::create(path)?;
    let mut writer = OutputWriter::new(BufWriter::new(file), format, true);
    writer.write_all(records)?;
    writer.flush()?;
    tracing::info!("Manifest written to {:?}", path);
    Ok(writer.items_written())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::metadata::{IdentityTag, MetadataContainer};
    use crate::types::{Variant, VariantRecord};

    fn records() -> Vec<VariantRecord> {
        (0..2)
            .map(|index| {
                let mut metadata = MetadataContainer::default();
                metadata.set(IdentityTag::Artist, format!("artist{index:06}"));
                let variant = Variant {
                    name: format!("name{index:08}.jpg"),
                    source_name: "src.png".into(),
                    index,
                    width: 10,
                    height: 10,
                    bytes: vec![index as u8; 4],
                    metadata,
                    fingerprint: None,
                };
                VariantRecord::new(&variant, None)
            })
            .collect()
    }

    #[test]
    fn test_write_single_record() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::Json, false);
        writer.write(&records()[0]).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("\"name\":\"name00000000.jpg\""));
        assert!(output.contains("\"Artist\":\"artist000000\""));
    }

    #[test]
    fn test_write_all_jsonl() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::JsonLines, true);
        writer.write_all(&records()).unwrap();
        assert_eq!(writer.items_written(), 2);

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.trim().split('\n').collect();
        assert_eq!(lines.len(), 2);
        let parsed: VariantRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed.index, 1);
    }

    #[test]
    fn test_write_all_json_array() {
        let mut buffer = Vec::new();
        let mut writer = OutputWriter::new(&mut buffer, OutputFormat::Json, false);
        writer.write_all(&records()).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.starts_with('['));
        assert!(output.trim().ends_with(']'));
    }

    #[test]
    fn test_write_manifest_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        let written = write_manifest(&path, OutputFormat::Json, &records()).unwrap();
        assert_eq!(written, 2);

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<VariantRecord> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].source, "src.png");
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("JSONL"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("ndjson"), Some(OutputFormat::JsonLines));
        assert_eq!(OutputFormat::parse("xml"), None);
        assert_eq!(OutputFormat::JsonLines.as_str(), "jsonl");
    }
}
