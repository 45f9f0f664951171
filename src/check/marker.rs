// src/check/marker.rs
//! Proof-of-execution marker.
//!
//! Build setups want a way to assert the chain check actually ran during
//! compilation. The session persists a well-known resource through this
//! collaborator; an out-of-core test can then check for its existence.

use std::path::PathBuf;

/// Resource persisted at session start
pub const CHECKED_MARKER_NAME: &str = "required-method.checked";
pub const CHECKED_MARKER_CONTENT: &str = "Checked\n";

/// Persists a uniquely named resource with optional content
pub trait CheckMarker {
    fn persist(&self, unique_name: &str, content: &str) -> std::io::Result<()>;
}

/// Writes markers into a directory
#[derive(Debug, Clone)]
pub struct FsMarker {
    dir: PathBuf,
}

impl FsMarker {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl CheckMarker for FsMarker {
    fn persist(&self, unique_name: &str, content: &str) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.dir.join(unique_name), content)
    }
}

/// Discards markers (tests, hosts without an output location)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMarker;

impl CheckMarker for NoopMarker {
    fn persist(&self, _unique_name: &str, _content: &str) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_marker_writes_the_resource() {
        let dir = std::env::temp_dir().join(format!("endcheck-marker-{}", std::process::id()));
        let marker = FsMarker::new(&dir);
        marker
            .persist(CHECKED_MARKER_NAME, CHECKED_MARKER_CONTENT)
            .unwrap();

        let written = std::fs::read_to_string(dir.join(CHECKED_MARKER_NAME)).unwrap();
        assert_eq!(written, "Checked\n");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn noop_marker_always_succeeds() {
        assert!(NoopMarker.persist("anything", "").is_ok());
    }
}
