//! Source discovery: expands files and directories into a sorted list of images.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::BatchConfig;

/// Discovers image files in directories.
pub struct FileDiscovery {
    supported_formats: Vec<String>,
}

/// Information about a discovered file.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Full path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl FileDiscovery {
    /// Create a new file discovery instance.
    pub fn new(config: &BatchConfig) -> Self {
        Self {
            supported_formats: config
                .supported_formats
                .iter()
                .map(|f| f.to_lowercase())
                .collect(),
        }
    }

    /// Discover all supported image files at a path.
    ///
    /// If path is a file, returns it if supported.
    /// If path is a directory, recursively finds all supported files.
    pub fn discover(&self, path: &Path) -> Vec<DiscoveredFile> {
        if path.is_file() {
            if self.is_supported(path) {
                if let Ok(meta) = std::fs::metadata(path) {
                    return vec![DiscoveredFile {
                        path: path.to_path_buf(),
                        size: meta.len(),
                    }];
                }
            }
            return vec![];
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let entry_path = entry.path();
            if entry_path.is_file() && self.is_supported(entry_path) {
                if let Ok(meta) = entry.metadata() {
                    files.push(DiscoveredFile {
                        path: entry_path.to_path_buf(),
                        size: meta.len(),
                    });
                }
            }
        }

        // Sort by path for deterministic ordering
        files.sort_by(|a, b| a.path.cmp(&b.path));
        files
    }

    /// Discover images under every input, dropping duplicates.
    ///
    /// Inputs keep their order; files found inside a directory are sorted.
    pub fn discover_all(&self, inputs: &[PathBuf]) -> Vec<DiscoveredFile> {
        let mut seen = std::collections::HashSet::new();
        let mut files = Vec::new();
        for input in inputs {
            for file in self.discover(input) {
                if seen.insert(file.path.clone()) {
                    files.push(file);
                }
            }
        }
        files
    }

    /// Check if a file has a supported extension.
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext_lower = ext.to_lowercase();
                self.supported_formats.iter().any(|fmt| *fmt == ext_lower)
            })
            .unwrap_or(false)
    }

    /// Get total size of all discovered files.
    pub fn total_size(files: &[DiscoveredFile]) -> u64 {
        files.iter().map(|f| f.size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_supported() {
        let discovery = FileDiscovery::new(&BatchConfig::default());

        assert!(discovery.is_supported(Path::new("test.jpg")));
        assert!(discovery.is_supported(Path::new("test.JPG")));
        assert!(discovery.is_supported(Path::new("test.jpeg")));
        assert!(discovery.is_supported(Path::new("test.png")));
        assert!(discovery.is_supported(Path::new("test.webp")));
        assert!(!discovery.is_supported(Path::new("test.txt")));
        assert!(!discovery.is_supported(Path::new("test.pdf")));
        assert!(!discovery.is_supported(Path::new("raw.cr2")));
    }

    #[test]
    fn test_discover_directory_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("b.png"), b"x").unwrap();
        std::fs::write(dir.path().join("a.JPG"), b"x").unwrap();
        std::fs::write(dir.path().join("nested/c.webp"), b"x").unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"x").unwrap();

        let discovery = FileDiscovery::new(&BatchConfig::default());
        let names: Vec<String> = discovery
            .discover(dir.path())
            .into_iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.JPG", "b.png", "c.webp"]);
    }

    #[test]
    fn test_discover_all_deduplicates() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("only.png");
        std::fs::write(&file, b"x").unwrap();

        let discovery = FileDiscovery::new(&BatchConfig::default());
        let files = discovery.discover_all(&[file.clone(), dir.path().to_path_buf()]);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, file);
    }

    #[test]
    fn test_total_size() {
        let files = vec![
            DiscoveredFile {
                path: PathBuf::from("a.jpg"),
                size: 100,
            },
            DiscoveredFile {
                path: PathBuf::from("b.jpg"),
                size: 200,
            },
        ];

        assert_eq!(FileDiscovery::total_size(&files), 300);
    }
}
