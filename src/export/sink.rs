use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

/// Receives finished documents and persists them under a suggested name.
pub trait DownloadSink {
    fn write(&mut self, bytes: &[u8], suggested_filename: &str) -> anyhow::Result<()>;
}

/// Saves every document as a file in one directory.
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn write(&mut self, bytes: &[u8], suggested_filename: &str) -> anyhow::Result<()> {
        let path = self.dir.join(sanitize_filename(suggested_filename));
        fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Saved {}", path.display());

        Ok(())
    }
}

/// Mesh names come from the page, so anything that could leave the output
/// directory or is invalid on common filesystems becomes `_`.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>();

    match cleaned.trim_start_matches('.') {
        "" => "_".to_string(),
        rest if rest.len() != cleaned.len() => format!("_{rest}"),
        _ => cleaned,
    }
}
