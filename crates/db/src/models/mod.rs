pub mod assessment;
pub mod attempt;
pub mod mastery;
pub mod verse;

pub use assessment::{AccuracyDetails, AssessmentResult, Discrepancy, DiscrepancyKind, clamp_score};
pub use attempt::{RecitationAttempt, RecordingMetadata, TranscriptionResult};
pub use mastery::MasteryLedgerEntry;
pub use verse::{ScriptVariant, VerseMeta, VerseRange, VerseRecord};
