//! Asset access.
//!
//! Drawables name their resources ("checker.bmp"); where those bytes come
//! from is the host's business. The render loop only ever reads.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

/// Named read-only byte sources for drawable resources.
pub trait AssetSource {
    /// Resolves a flat asset name to its bytes.
    fn load(&self, name: &str) -> io::Result<Vec<u8>>;
}

/// Assets read from files under a root directory.
#[derive(Debug, Clone)]
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetSource for DirAssets {
    fn load(&self, name: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.root.join(name))
    }
}

/// In-memory assets, for generated content and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.entries.insert(name.into(), bytes);
    }
}

impl AssetSource for MemoryAssets {
    fn load(&self, name: &str) -> io::Result<Vec<u8>> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no such asset: {name}")))
    }
}
