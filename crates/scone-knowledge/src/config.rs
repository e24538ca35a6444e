/// Controls knowledge file discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// File extension of knowledge files, without the dot.
    pub extension: String,
    /// Directory name holding snapshots. Skipped during the main walk and
    /// loaded after everything else, from the root only.
    pub snapshot_dir: String,
    /// Maximum number of files a single load may send.
    pub max_files: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            extension: "lisp".to_string(),
            snapshot_dir: "snapshots".to_string(),
            max_files: 4096,
        }
    }
}
