//! Maps a judge's structured reply onto a strictly bounded
//! [`AssessmentResult`], whatever the judge actually sent.

use recita_db::models::{
    AccuracyDetails, AssessmentResult, Discrepancy, DiscrepancyKind, clamp_score,
};
use serde_json::Value;

pub const DEFAULT_CONFIDENCE: f64 = 0.8;

fn field<'a>(obj: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|n| obj.get(*n)).filter(|v| !v.is_null())
}

fn as_number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Rounded and clamped to 0..=100; 0 when missing or non-numeric.
fn score(value: Option<&Value>) -> u8 {
    as_number(value).map(clamp_score).unwrap_or(0)
}

fn discrepancy_kind(raw: &str) -> Option<DiscrepancyKind> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "missing" => Some(DiscrepancyKind::Missing),
        "incorrect" => Some(DiscrepancyKind::Incorrect),
        "extra" => Some(DiscrepancyKind::Extra),
        "order" | "misordered" | "ordering" => Some(DiscrepancyKind::Misordered),
        _ => None,
    }
}

fn discrepancies(value: Option<&Value>) -> Vec<Discrepancy> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let kind = discrepancy_kind(item.get("type")?.as_str()?)?;
            let description = item.get("description")?.as_str()?.trim();
            (!description.is_empty()).then(|| Discrepancy {
                kind,
                description: description.to_string(),
            })
        })
        .collect()
}

fn suggestions(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Normalizes one judge reply. Never fails: every numeric field is clamped
/// independently and every missing or malformed field takes its default.
pub fn normalize(reply: &Value) -> AssessmentResult {
    let details = field(reply, &["accuracyDetails", "accuracy_details"]);
    let detail = |names: &[&str]| score(details.and_then(|d| field(d, names)));

    AssessmentResult {
        score: score(field(reply, &["score"])),
        feedback: field(reply, &["feedback"])
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
        accuracy: AccuracyDetails {
            overall_accuracy: detail(&["overallAccuracy", "overall_accuracy"]),
            pronunciation: detail(&["pronunciation"]),
            completeness: detail(&["completeness"]),
            ordering: detail(&["correctOrder", "correct_order", "ordering"]),
        },
        discrepancies: discrepancies(field(reply, &["mistakes"])),
        suggestions: suggestions(field(reply, &["suggestions"])),
        confidence: as_number(field(reply, &["confidence"]))
            .map(|c| c.clamp(0.0, 1.0))
            .unwrap_or(DEFAULT_CONFIDENCE),
    }
}
