use axum::{Json, extract::State};
use recita_db::models::{ScriptVariant, VerseRange, VerseRecord};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{error::ApiError, extractors::ApiJson, state::AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct PassageRequest {
    #[serde(alias = "startChapter")]
    #[validate(range(min = 1, max = 114))]
    pub start_chapter: u16,
    #[serde(alias = "startVerse")]
    #[validate(range(min = 1))]
    pub start_verse: u16,
    #[serde(alias = "endChapter")]
    #[validate(range(min = 1, max = 114))]
    pub end_chapter: u16,
    #[serde(alias = "endVerse")]
    #[validate(range(min = 1))]
    pub end_verse: u16,
    #[serde(default, alias = "scriptVariant")]
    pub script_variant: ScriptVariant,
}

impl PassageRequest {
    pub fn range(&self) -> VerseRange {
        VerseRange::new(
            self.start_chapter,
            self.start_verse,
            self.end_chapter,
            self.end_verse,
        )
        .with_variant(self.script_variant)
    }
}

#[derive(Debug, Serialize)]
pub struct PassageResponse {
    pub verses: Vec<VerseRecord>,
    pub simple_text: String,
    pub diacritical_text: String,
    pub verse_count: usize,
    pub reference: String,
}

pub async fn resolve(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<PassageRequest>,
) -> Result<Json<PassageResponse>, ApiError> {
    body.validate()?;
    let passage = state.resolver.resolve(&body.range()).await?;

    Ok(Json(PassageResponse {
        verses: passage.verses,
        simple_text: passage.text,
        diacritical_text: passage.text_diacritical,
        verse_count: passage.verse_count,
        reference: passage.reference,
    }))
}
