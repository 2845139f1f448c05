use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the two canonical recitation traditions a chapter record set is
/// rendered in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptVariant {
    #[default]
    Hafs,
    Warsh,
}

impl ScriptVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptVariant::Hafs => "hafs",
            ScriptVariant::Warsh => "warsh",
        }
    }
}

impl fmt::Display for ScriptVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScriptVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hafs" => Ok(ScriptVariant::Hafs),
            "warsh" => Ok(ScriptVariant::Warsh),
            other => Err(format!("unknown script variant '{other}'")),
        }
    }
}

/// Structural position of a verse inside the written text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub juz: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hizb: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u16>,
    #[serde(default)]
    pub sajda: bool,
}

/// Immutable reference record for one verse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseRecord {
    pub chapter: u16,
    pub verse: u16,
    /// Unmarked text used for loose comparison.
    pub text: String,
    /// Fully vowelized text.
    #[serde(default)]
    pub text_diacritical: String,
    #[serde(default)]
    pub meta: VerseMeta,
}

/// A `(start_chapter, start_verse)`..=`(end_chapter, end_verse)` span in one
/// script variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseRange {
    pub start_chapter: u16,
    pub start_verse: u16,
    pub end_chapter: u16,
    pub end_verse: u16,
    #[serde(default)]
    pub variant: ScriptVariant,
}

impl VerseRange {
    pub fn new(start_chapter: u16, start_verse: u16, end_chapter: u16, end_verse: u16) -> Self {
        Self {
            start_chapter,
            start_verse,
            end_chapter,
            end_verse,
            variant: ScriptVariant::default(),
        }
    }

    pub fn with_variant(mut self, variant: ScriptVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Chapter-major, verse-minor ordering of the endpoints.
    pub fn is_ordered(&self) -> bool {
        self.start_chapter < self.end_chapter
            || (self.start_chapter == self.end_chapter && self.start_verse <= self.end_verse)
    }

    /// Chapters covered by the range, inclusive.
    pub fn chapters(&self) -> std::ops::RangeInclusive<u16> {
        self.start_chapter..=self.end_chapter
    }

    /// Boundary filter: whether `verse` of `chapter` lies inside the range.
    ///
    /// The start chapter keeps verses from `start_verse`, the end chapter keeps
    /// verses up to `end_verse`, a chapter that is both keeps the closed
    /// interval, and interior chapters keep everything.
    pub fn contains(&self, chapter: u16, verse: u16) -> bool {
        let is_start = chapter == self.start_chapter;
        let is_end = chapter == self.end_chapter;
        match (is_start, is_end) {
            (true, true) => verse >= self.start_verse && verse <= self.end_verse,
            (true, false) => verse >= self.start_verse,
            (false, true) => verse <= self.end_verse,
            (false, false) => self.chapters().contains(&chapter),
        }
    }

    /// Verse numbers of `chapter` inside the range, given that chapter's
    /// verse count.
    pub fn verses_in_chapter(&self, chapter: u16, verse_count: u16) -> Vec<u16> {
        (1..=verse_count)
            .filter(|&v| self.contains(chapter, v))
            .collect()
    }

    /// `"sc:sv"`, `"sc:sv-ev"` or `"sc:sv - ec:ev"`.
    pub fn reference_label(&self) -> String {
        if self.start_chapter == self.end_chapter {
            if self.start_verse == self.end_verse {
                format!("{}:{}", self.start_chapter, self.start_verse)
            } else {
                format!("{}:{}-{}", self.start_chapter, self.start_verse, self.end_verse)
            }
        } else {
            format!(
                "{}:{} - {}:{}",
                self.start_chapter, self.start_verse, self.end_chapter, self.end_verse
            )
        }
    }
}
