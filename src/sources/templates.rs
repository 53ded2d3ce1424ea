//! Background template lookup

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::debug;
use sha2::{Digest, Sha256};

use super::Topic;
use crate::{Error, Result};

const EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Resolves a topic to encoded background bytes.
///
/// `seed` selects among several templates of one topic; the same seed always
/// picks the same template.
pub trait TemplateStore: Send + Sync {
    fn background(&self, topic: Topic, seed: &[u8]) -> Result<Vec<u8>>;
}

/// Deterministic index in `0..n` derived from `seed`.
pub(crate) fn pick_index(seed: &[u8], n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    let digest = Sha256::digest(seed);
    let mut word = [0u8; 8];
    word.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(word) % n as u64) as usize
}

/// Templates on disk: `<root>/<topic>/*.{png,jpg,jpeg}`.
#[derive(Debug, Clone)]
pub struct DirectoryTemplates {
    root: PathBuf,
}

impl DirectoryTemplates {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Template files for `topic`, sorted by path.
    pub fn list(&self, topic: Topic) -> Result<Vec<PathBuf>> {
        let dir = self.root.join(topic.as_str());
        let entries = std::fs::read_dir(&dir)
            .map_err(|e| Error::Template(format!("cannot read {}: {}", dir.display(), e)))?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && has_image_extension(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl TemplateStore for DirectoryTemplates {
    fn background(&self, topic: Topic, seed: &[u8]) -> Result<Vec<u8>> {
        let files = self.list(topic)?;
        if files.is_empty() {
            return Err(Error::Template(format!(
                "no templates for topic {} under {}",
                topic,
                self.root.display()
            )));
        }
        let path = &files[pick_index(seed, files.len())];
        debug!("Picked template {}", path.display());
        Ok(std::fs::read(path)?)
    }
}

/// In-memory templates. Topics without templates fall back to `General`.
#[derive(Debug, Clone, Default)]
pub struct StaticTemplates {
    by_topic: HashMap<Topic, Vec<Vec<u8>>>,
}

impl StaticTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, topic: Topic, bytes: Vec<u8>) {
        self.by_topic.entry(topic).or_default().push(bytes);
    }

    pub fn with(mut self, topic: Topic, bytes: Vec<u8>) -> Self {
        self.insert(topic, bytes);
        self
    }
}

impl TemplateStore for StaticTemplates {
    fn background(&self, topic: Topic, seed: &[u8]) -> Result<Vec<u8>> {
        let list = self
            .by_topic
            .get(&topic)
            .filter(|l| !l.is_empty())
            .or_else(|| self.by_topic.get(&Topic::General).filter(|l| !l.is_empty()))
            .ok_or_else(|| Error::Template(format!("no templates for topic {}", topic)))?;
        Ok(list[pick_index(seed, list.len())].clone())
    }
}
