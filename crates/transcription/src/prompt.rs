//! Transcription instructions sent to prompt-capable backends.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Literal a backend must return when nothing is clearly spoken.
pub const NO_SPEECH_SENTINEL: &str = "NO_SPEECH_DETECTED";

/// Domain the audio comes from. Selects the instruction template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptionContext {
    #[default]
    General,
    /// Classical-language recitation that must keep full diacritics.
    Recitation,
}

impl FromStr for TranscriptionContext {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "general" => Ok(TranscriptionContext::General),
            "recitation" | "quran" => Ok(TranscriptionContext::Recitation),
            other => Err(format!("unknown transcription context '{other}'")),
        }
    }
}

fn language_name(code: &str) -> &str {
    match code {
        "ar" => "Arabic",
        "en" => "English",
        "fr" => "French",
        "de" => "German",
        "es" => "Spanish",
        "tr" => "Turkish",
        "ur" => "Urdu",
        "id" => "Indonesian",
        "ms" => "Malay",
        other => other,
    }
}

fn sentinel_clause() -> String {
    format!(
        "If nothing is clearly spoken, return the literal token {NO_SPEECH_SENTINEL} and nothing else."
    )
}

/// Builds the instruction for one transcription call.
///
/// Recitation context wins over the language hint; a language hint other than
/// `auto` selects a language-specific instruction; everything else gets the
/// neutral one.
pub fn build_prompt(
    context: TranscriptionContext,
    language: Option<&str>,
    expected_reference: Option<&str>,
) -> String {
    let language = language.map(str::trim).filter(|l| !l.is_empty() && *l != "auto");

    let body = match (context, language) {
        (TranscriptionContext::Recitation, _) => {
            let mut s = String::from(
                "Transcribe this recitation of classical Arabic scripture exactly as recited. \
                 Write it in Arabic script with full diacritical marks (tashkeel), preserving \
                 classical grammar and case endings. Do not correct, complete or paraphrase \
                 the reciter; transcribe only what is actually heard.",
            );
            if let Some(reference) = expected_reference.map(str::trim).filter(|r| !r.is_empty()) {
                s.push_str(&format!(
                    " The reciter is expected to recite passage {reference}."
                ));
            }
            s
        }
        (TranscriptionContext::General, Some(code)) => format!(
            "Transcribe the following {} audio verbatim, in {} script, without translating.",
            language_name(code),
            language_name(code)
        ),
        (TranscriptionContext::General, None) => {
            "Transcribe the following audio verbatim in the language it is spoken in.".to_string()
        }
    };

    format!("{body} {}", sentinel_clause())
}

/// Whether a backend reply is the no-speech contract rather than content.
pub fn is_no_speech(text: &str) -> bool {
    let trimmed = text.trim().trim_matches(|c| c == '"' || c == '.' || c == '`');
    trimmed.is_empty() || trimmed == NO_SPEECH_SENTINEL
}
