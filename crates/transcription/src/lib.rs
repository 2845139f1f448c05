pub mod asr;
pub mod config;
pub mod error;
pub mod gateway;
pub mod prompt;

pub use asr::{AudioSample, BackendError, BackendReply, SpeechBackend, SpeechRequest};
pub use config::GatewayConfig;
pub use error::TranscriptionError;
pub use gateway::{TranscriptionGateway, TranscriptionRequest};
pub use prompt::{NO_SPEECH_SENTINEL, TranscriptionContext};
pub use recita_db::models::TranscriptionResult;
