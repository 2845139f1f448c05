use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyKind {
    Missing,
    Incorrect,
    Extra,
    Misordered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discrepancy {
    pub kind: DiscrepancyKind,
    pub description: String,
}

/// Rounds and clamps a raw score to 0..=100; non-finite values score 0.
pub fn clamp_score(value: f64) -> u8 {
    if value.is_finite() {
        value.round().clamp(0.0, 100.0) as u8
    } else {
        0
    }
}

/// Sub-scores, each 0..=100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccuracyDetails {
    pub overall_accuracy: u8,
    pub pronunciation: u8,
    pub completeness: u8,
    pub ordering: u8,
}

/// Normalized outcome of grading one transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub score: u8,
    #[serde(default)]
    pub feedback: String,
    pub accuracy: AccuracyDetails,
    #[serde(default)]
    pub discrepancies: Vec<Discrepancy>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    pub confidence: f64,
}

impl AssessmentResult {
    /// Clamps every numeric field into its legal range. Applied to results
    /// that arrive from outside the judge normalizer (e.g. client-submitted
    /// attempts).
    pub fn clamped(mut self) -> Self {
        self.score = self.score.min(100);
        self.accuracy.overall_accuracy = self.accuracy.overall_accuracy.min(100);
        self.accuracy.pronunciation = self.accuracy.pronunciation.min(100);
        self.accuracy.completeness = self.accuracy.completeness.min(100);
        self.accuracy.ordering = self.accuracy.ordering.min(100);
        self.confidence = if self.confidence.is_finite() {
            self.confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self
    }
}
