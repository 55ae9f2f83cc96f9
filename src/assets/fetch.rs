use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;

use crate::foundation::error::{ScrubError, ScrubResult};

/// Retrieves the encoded bytes behind a frame locator.
///
/// Called from loader worker threads, so implementations must be `Send + Sync`.
pub trait FrameFetcher: Send + Sync {
    /// Fetch the resource at `locator`.
    fn fetch(&self, locator: &str) -> ScrubResult<Vec<u8>>;
}

/// Serves locators from a static-file directory, the way a web host maps `/a/b.png` under its
/// public root.
#[derive(Clone, Debug)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    /// Serve files below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Public root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FrameFetcher for FsFetcher {
    fn fetch(&self, locator: &str) -> ScrubResult<Vec<u8>> {
        let rel = normalize_locator(locator)?;
        let path = self.root.join(Path::new(&rel));
        std::fs::read(&path)
            .with_context(|| format!("read frame bytes from '{}'", path.display()))
            .map_err(ScrubError::from)
    }
}

/// In-memory fetcher keyed by normalized locator. Missing keys fail like a 404.
#[derive(Clone, Debug, Default)]
pub struct MemoryFetcher {
    entries: HashMap<String, Arc<Vec<u8>>>,
}

impl MemoryFetcher {
    /// Empty fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bytes` under `locator`.
    pub fn insert(&mut self, locator: &str, bytes: Vec<u8>) -> ScrubResult<()> {
        let key = normalize_locator(locator)?;
        self.entries.insert(key, Arc::new(bytes));
        Ok(())
    }

    /// Number of registered resources.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FrameFetcher for MemoryFetcher {
    fn fetch(&self, locator: &str) -> ScrubResult<Vec<u8>> {
        let key = normalize_locator(locator)?;
        self.entries
            .get(&key)
            .map(|b| b.as_ref().clone())
            .ok_or_else(|| ScrubError::asset(format!("no resource at '{locator}'")))
    }
}

/// Normalize a site-absolute or relative locator into a relative `/`-separated path.
///
/// A single leading `/` is treated as the public root; `..` segments are rejected.
pub fn normalize_locator(locator: &str) -> ScrubResult<String> {
    let s = locator.replace('\\', "/");
    let s = s.trim_start_matches('/');
    if s.is_empty() {
        return Err(ScrubError::validation("frame locator must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(ScrubError::validation(
                "frame locators must not contain '..'",
            ));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(ScrubError::validation(
            "frame locator must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fetch.rs"]
mod tests;
