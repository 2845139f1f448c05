use crate::fixtures::fakes::{FakeJudge, ScriptedSpeech};
use crate::fixtures::test_app::{TestApp, TestBackends};
use recita_transcription::BackendError;
use serde_json::Value;

const FATIHA_1_4: &str = r#"{"start_chapter":1,"start_verse":1,"end_chapter":1,"end_verse":4}"#;

async fn recite(app: &TestApp, form: reqwest::multipart::Form) -> reqwest::Response {
    app.client
        .post(app.url("/api/recitation"))
        .multipart(form)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn full_recitation_is_graded_and_recorded() {
    let app = TestApp::spawn().await;

    let form = app
        .audio_form(64_000)
        .text("user_id", "reciter-1")
        .text("range", FATIHA_1_4)
        .text("language", "ar");
    let resp = recite(&app, form).await;

    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["reference"], "1:1-4");
    assert_eq!(json["verse_count"], 4);
    assert_eq!(json["transcription"]["backend"], "gemini");
    assert_eq!(json["assessment"]["score"], 92);
    assert_eq!(json["audio_info"]["estimated_duration"], 4.0);
    assert_eq!(json["ledger_updated"], true);
    assert_eq!(app.attempts.count_for_user("reciter-1"), 1);

    // Transcription ran in the recitation context for this passage
    let prompt = app.speech[0].last_prompt().unwrap();
    assert!(prompt.contains("1:1-4"));

    let resp = app
        .client
        .get(app.url("/api/user/reciter-1/mastery/1"))
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["verses_mastered"], serde_json::json!([1, 2, 3, 4]));
}

#[tokio::test]
async fn judge_failure_records_nothing() {
    let app = TestApp::spawn_with(TestBackends {
        speech: vec![ScriptedSpeech::replying("gemini", "بسم الله الرحمن الرحيم")],
        judges: vec![FakeJudge::failing(
            "gemini",
            BackendError::RateLimited("quota".into()),
        )],
    })
    .await;

    let form = app
        .audio_form(16_000)
        .text("user_id", "reciter-2")
        .text("range", FATIHA_1_4);
    let resp = recite(&app, form).await;

    assert_eq!(resp.status().as_u16(), 429);
    assert_eq!(app.attempts.count_for_user("reciter-2"), 0);
}

#[tokio::test]
async fn no_speech_records_nothing() {
    let app = TestApp::spawn_with(TestBackends {
        speech: vec![ScriptedSpeech::replying("gemini", "NO_SPEECH_DETECTED")],
        judges: vec![FakeJudge::replying("gemini", "{\"score\": 99}")],
    })
    .await;

    let form = app
        .audio_form(16_000)
        .text("user_id", "reciter-3")
        .text("range", FATIHA_1_4);
    let resp = recite(&app, form).await;

    assert_eq!(resp.status().as_u16(), 400);
    assert_eq!(app.judges[0].calls(), 0);
    assert_eq!(app.attempts.count_for_user("reciter-3"), 0);
}

#[tokio::test]
async fn invalid_requests_never_reach_backends() {
    let app = TestApp::spawn().await;

    let resp = recite(&app, app.audio_form(16_000).text("range", FATIHA_1_4)).await;
    assert_eq!(resp.status().as_u16(), 400);

    let resp = recite(&app, app.audio_form(16_000).text("user_id", "reciter-4")).await;
    assert_eq!(resp.status().as_u16(), 400);

    let backwards = r#"{"start_chapter":2,"start_verse":1,"end_chapter":1,"end_verse":7}"#;
    let form = app
        .audio_form(16_000)
        .text("user_id", "reciter-4")
        .text("range", backwards);
    let resp = recite(&app, form).await;
    assert_eq!(resp.status().as_u16(), 400);

    assert_eq!(app.speech[0].calls(), 0);
    assert_eq!(app.judges[0].calls(), 0);
}

#[tokio::test]
async fn ledger_matches_resolved_passage() {
    let app = TestApp::spawn().await;

    let range = r#"{"start_chapter":1,"start_verse":5,"end_chapter":1,"end_verse":40}"#;
    let form = app
        .audio_form(16_000)
        .text("user_id", "reciter-5")
        .text("range", range);
    let resp = recite(&app, form).await;
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["verse_count"], 3);

    let resp = app
        .client
        .get(app.url("/api/user/reciter-5/mastery/1"))
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["verses_attempted"], serde_json::json!([5, 6, 7]));
}
