use crate::fixtures::fakes::{FakeJudge, ScriptedSpeech};
use crate::fixtures::test_app::{TestApp, TestBackends};
use recita_transcription::{BackendError, NO_SPEECH_SENTINEL};
use serde_json::Value;

async fn transcribe(app: &TestApp, form: reqwest::multipart::Form) -> reqwest::Response {
    app.client
        .post(app.url("/api/transcription"))
        .multipart(form)
        .send()
        .await
        .unwrap()
}

fn two_backends(primary: std::sync::Arc<ScriptedSpeech>) -> TestBackends {
    TestBackends {
        speech: vec![primary, ScriptedSpeech::replying("openai", "الحمد لله رب العالمين")],
        judges: vec![FakeJudge::replying("gemini", "{}")],
    }
}

#[tokio::test]
async fn transcribes_uploaded_audio() {
    let app = TestApp::spawn().await;

    let resp = transcribe(&app, app.audio_form(48_000).text("language", "ar")).await;

    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["text"], "بسم الله الرحمن الرحيم");
    assert_eq!(json["model"], "gemini");
    assert_eq!(json["attempts"], 1);
    assert!((json["confidence"].as_f64().unwrap() - 0.8).abs() < 1e-9);
    assert_eq!(json["audio_info"]["size"], 48_000);
    assert_eq!(json["audio_info"]["type"], "audio/webm");
    assert_eq!(json["audio_info"]["estimated_duration"], 3.0);
    assert!(app.speech[0].last_prompt().unwrap().contains("Arabic"));
}

#[tokio::test]
async fn recitation_context_boosts_confidence() {
    let app = TestApp::spawn().await;

    let form = app
        .audio_form(16_000)
        .text("context", "recitation")
        .text("expected_reference", "1:1");
    let resp = transcribe(&app, form).await;

    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert!((json["confidence"].as_f64().unwrap() - 0.9).abs() < 1e-9);
    assert!(app.speech[0].last_prompt().unwrap().contains("1:1"));
}

#[tokio::test]
async fn exhausted_backend_falls_back_in_priority_order() {
    let app = TestApp::spawn_with(two_backends(ScriptedSpeech::failing(
        "gemini",
        BackendError::Transient("503 overloaded".into()),
    )))
    .await;

    let resp = transcribe(&app, app.audio_form(8_000)).await;

    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["model"], "openai");
    assert_eq!(json["attempts"], 4);
    assert_eq!(app.speech[0].calls(), 3);
    assert_eq!(app.speech[1].calls(), 1);
}

#[tokio::test]
async fn selected_backend_goes_first() {
    let app = TestApp::spawn_with(two_backends(ScriptedSpeech::replying(
        "gemini",
        "بسم الله الرحمن الرحيم",
    )))
    .await;

    let resp = transcribe(&app, app.audio_form(8_000).text("backend", "openai")).await;

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["model"], "openai");
    assert_eq!(app.speech[0].calls(), 0);
}

#[tokio::test]
async fn rate_limit_surfaces_without_fallback() {
    let app = TestApp::spawn_with(two_backends(ScriptedSpeech::failing(
        "gemini",
        BackendError::RateLimited("429 quota exceeded".into()),
    )))
    .await;

    let resp = transcribe(&app, app.audio_form(8_000)).await;

    assert_eq!(resp.status().as_u16(), 429);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "too_many_requests");
    assert_eq!(app.speech[0].calls(), 1);
    assert_eq!(app.speech[1].calls(), 0);
}

#[tokio::test]
async fn sentinel_reply_is_no_speech() {
    let app = TestApp::spawn_with(two_backends(ScriptedSpeech::replying(
        "gemini",
        NO_SPEECH_SENTINEL,
    )))
    .await;

    let resp = transcribe(&app, app.audio_form(8_000)).await;

    assert_eq!(resp.status().as_u16(), 400);
    let json: Value = resp.json().await.unwrap();
    assert!(json["message"].as_str().unwrap().contains("No speech"));
    assert!(!json["message"].as_str().unwrap().contains(NO_SPEECH_SENTINEL));
}

#[tokio::test]
async fn missing_empty_and_oversized_audio_are_rejected() {
    let app = TestApp::spawn().await;

    let resp = transcribe(&app, reqwest::multipart::Form::new().text("language", "ar")).await;
    assert_eq!(resp.status().as_u16(), 400);

    let resp = transcribe(&app, app.audio_form(0)).await;
    assert_eq!(resp.status().as_u16(), 400);

    let resp = transcribe(&app, app.audio_form(10 * 1024 * 1024 + 1)).await;
    assert_eq!(resp.status().as_u16(), 400);
    let json: Value = resp.json().await.unwrap();
    assert!(json["message"].as_str().unwrap().contains("limit"));

    assert_eq!(app.speech[0].calls(), 0);
}

#[tokio::test]
async fn lists_configured_backends() {
    let app = TestApp::spawn_with(two_backends(ScriptedSpeech::replying("gemini", "abc")))
        .await;

    let resp = app
        .client
        .get(app.url("/api/transcription/backend"))
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["backends"], serde_json::json!(["gemini", "openai"]));
}
