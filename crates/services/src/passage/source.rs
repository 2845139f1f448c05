use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use recita_db::models::{ScriptVariant, VerseRecord};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Chapter data {key} is missing")]
    Missing { key: String },
    #[error("Failed to read {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Corrupt chapter data {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Supplies one chapter's full verse set per script variant.
#[async_trait]
pub trait VerseSource: Send + Sync + 'static {
    async fn load_chapter(
        &self,
        chapter: u16,
        variant: ScriptVariant,
    ) -> Result<Vec<VerseRecord>, SourceError>;
}

/// Reads `{root}/{variant}/{chapter:03}.json`, each a JSON array of
/// [`VerseRecord`].
pub struct FsVerseSource {
    root: PathBuf,
}

impl FsVerseSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Deterministic location of one (chapter, variant) record set.
    pub fn chapter_path(&self, chapter: u16, variant: ScriptVariant) -> PathBuf {
        chapter_path(&self.root, chapter, variant)
    }
}

fn chapter_path(root: &Path, chapter: u16, variant: ScriptVariant) -> PathBuf {
    root.join(variant.as_str()).join(format!("{chapter:03}.json"))
}

#[async_trait]
impl VerseSource for FsVerseSource {
    async fn load_chapter(
        &self,
        chapter: u16,
        variant: ScriptVariant,
    ) -> Result<Vec<VerseRecord>, SourceError> {
        let path = self.chapter_path(chapter, variant);
        let key = path.display().to_string();
        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SourceError::Missing { key });
            }
            Err(source) => return Err(SourceError::Io { key, source }),
        };
        let verses: Vec<VerseRecord> =
            serde_json::from_slice(&bytes).map_err(|source| SourceError::Corrupt {
                key: key.clone(),
                source,
            })?;
        debug!(%key, verses = verses.len(), "Chapter loaded");
        Ok(verses)
    }
}

/// Chapter record sets held in memory.
#[derive(Default)]
pub struct MemoryVerseSource {
    chapters: HashMap<(u16, ScriptVariant), Vec<VerseRecord>>,
}

impl MemoryVerseSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, chapter: u16, variant: ScriptVariant, verses: Vec<VerseRecord>) {
        self.chapters.insert((chapter, variant), verses);
    }

    pub fn with_chapter(mut self, chapter: u16, variant: ScriptVariant, verses: Vec<VerseRecord>) -> Self {
        self.insert(chapter, variant, verses);
        self
    }
}

#[async_trait]
impl VerseSource for MemoryVerseSource {
    async fn load_chapter(
        &self,
        chapter: u16,
        variant: ScriptVariant,
    ) -> Result<Vec<VerseRecord>, SourceError> {
        self.chapters
            .get(&(chapter, variant))
            .cloned()
            .ok_or_else(|| SourceError::Missing {
                key: format!("{variant}/{chapter:03}"),
            })
    }
}
