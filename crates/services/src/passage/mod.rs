pub mod source;

use std::sync::Arc;

use recita_db::chapters;
use recita_db::models::{ScriptVariant, VerseRange, VerseRecord};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

pub use source::{FsVerseSource, MemoryVerseSource, SourceError, VerseSource};

#[derive(Debug, Error)]
pub enum RangeError {
    #[error("Chapter {0} is outside 1..=114")]
    InvalidChapter(u16),
    #[error("Range end {end} precedes start {start}")]
    Misordered { start: String, end: String },
    #[error("Failed to load chapter {chapter} ({variant}): {source}")]
    ChapterLoad {
        chapter: u16,
        variant: ScriptVariant,
        #[source]
        source: SourceError,
    },
    #[error("No verses found for {0}")]
    EmptyPassage(String),
}

impl RangeError {
    pub fn is_validation(&self) -> bool {
        matches!(self, RangeError::InvalidChapter(_) | RangeError::Misordered { .. })
    }
}

/// Canonical text for a verse range, stitched across chapters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedPassage {
    pub verses: Vec<VerseRecord>,
    pub text: String,
    pub text_diacritical: String,
    pub verse_count: usize,
    pub reference: String,
}

/// Validates a range, loads every chapter it spans and assembles the passage.
pub struct RangeResolver {
    source: Arc<dyn VerseSource>,
}

impl RangeResolver {
    pub fn new(source: Arc<dyn VerseSource>) -> Self {
        Self { source }
    }

    pub async fn resolve(&self, range: &VerseRange) -> Result<ResolvedPassage, RangeError> {
        validate(range)?;

        // Chapters load concurrently; any failure aborts the whole resolution.
        let loads = range.chapters().map(|chapter| async move {
            self.source
                .load_chapter(chapter, range.variant)
                .await
                .map(|verses| (chapter, verses))
                .map_err(|source| RangeError::ChapterLoad {
                    chapter,
                    variant: range.variant,
                    source,
                })
        });
        let chapters = futures::future::try_join_all(loads).await.inspect_err(|e| {
            warn!(error = %e, reference = %range.reference_label(), "Range resolution aborted");
        })?;

        let passage = assemble(range, chapters)?;
        info!(
            reference = %passage.reference,
            variant = %range.variant,
            verses = passage.verse_count,
            "Passage resolved"
        );
        Ok(passage)
    }
}

/// Chapter bounds first, then ordering.
pub fn validate(range: &VerseRange) -> Result<(), RangeError> {
    for chapter in [range.start_chapter, range.end_chapter] {
        if !chapters::is_valid_chapter(chapter) {
            return Err(RangeError::InvalidChapter(chapter));
        }
    }
    if !range.is_ordered() {
        return Err(RangeError::Misordered {
            start: format!("{}:{}", range.start_chapter, range.start_verse),
            end: format!("{}:{}", range.end_chapter, range.end_verse),
        });
    }
    Ok(())
}

/// Filters loaded chapters to the range and builds the passage.
///
/// Records whose `chapter` disagrees with the chapter they were loaded for
/// are dropped. The result is sorted by (chapter, verse) whatever order the
/// sources produced.
pub fn assemble(
    range: &VerseRange,
    chapters: Vec<(u16, Vec<VerseRecord>)>,
) -> Result<ResolvedPassage, RangeError> {
    let mut verses: Vec<VerseRecord> = Vec::new();
    for (chapter, records) in chapters {
        for record in records {
            if record.chapter != chapter {
                debug!(
                    expected = chapter,
                    found = record.chapter,
                    verse = record.verse,
                    "Discarding verse filed under the wrong chapter"
                );
                continue;
            }
            if range.contains(chapter, record.verse) {
                verses.push(record);
            }
        }
    }
    verses.sort_by_key(|v| (v.chapter, v.verse));

    let reference = range.reference_label();
    let text = join_trimmed(verses.iter().map(|v| v.text.as_str()));
    let text_diacritical = join_trimmed(verses.iter().map(|v| v.text_diacritical.as_str()));
    if verses.is_empty() || text.is_empty() {
        return Err(RangeError::EmptyPassage(reference));
    }

    Ok(ResolvedPassage {
        verse_count: verses.len(),
        verses,
        text,
        text_diacritical,
        reference,
    })
}

fn join_trimmed<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
