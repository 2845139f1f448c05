pub mod assessment;
pub mod attempt;
pub mod passage;
pub mod recitation;
pub mod transcription;
pub mod upload;
pub mod user;
