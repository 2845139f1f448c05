pub mod assessment;
pub mod dao;
pub mod passage;
pub mod pipeline;
pub mod recorder;
pub mod store;

pub use assessment::{AssessmentJudge, AssessmentRequest, JudgeBackend, JudgeError};
pub use passage::{RangeError, RangeResolver, ResolvedPassage};
pub use pipeline::{PipelineError, RecitationOutcome, RecitationPipeline, RecitationRequest};
pub use recorder::{AttemptRecorder, RecordError, RecordOutcome};
