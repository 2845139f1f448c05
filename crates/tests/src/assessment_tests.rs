use crate::fixtures::fakes::{FakeJudge, ScriptedSpeech};
use crate::fixtures::test_app::{TestApp, TestBackends};
use recita_transcription::BackendError;
use serde_json::{Value, json};

fn body() -> Value {
    json!({
        "transcribedText": "بسم الله الرحمن",
        "originalText": "بسم الله الرحمن الرحيم",
        "originalDiacriticalText": "بِسْمِ ٱللَّهِ ٱلرَّحْمَٰنِ ٱلرَّحِيمِ",
        "reference": "1:1",
        "verseCount": 1
    })
}

fn with_judges(judges: Vec<std::sync::Arc<FakeJudge>>) -> TestBackends {
    TestBackends {
        speech: vec![ScriptedSpeech::replying("gemini", "abc")],
        judges,
    }
}

async fn assess(app: &TestApp, body: &Value) -> reqwest::Response {
    app.client
        .post(app.url("/api/assessment"))
        .json(body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn returns_normalized_assessment() {
    let app = TestApp::spawn().await;

    let resp = assess(&app, &body()).await;

    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["score"], 92);
    assert_eq!(json["accuracy"]["pronunciation"], 90);
    assert_eq!(json["accuracy"]["ordering"], 100);
    assert_eq!(json["discrepancies"][0]["kind"], "incorrect");
    assert_eq!(json["suggestions"][0], "Hold the madd for two counts");
    assert_eq!(json["confidence"], 0.85);
}

#[tokio::test]
async fn out_of_range_judge_scores_are_clamped() {
    let app = TestApp::spawn_with(with_judges(vec![FakeJudge::replying(
        "gemini",
        r#"```json
{"score": 150, "accuracyDetails": {"pronunciation": -5, "completeness": "80"},
 "mistakes": [{"type": "order", "description": "verses swapped"}, {"type": "tempo", "description": "?"}],
 "confidence": 7}
```"#,
    )]))
    .await;

    let resp = assess(&app, &body()).await;

    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["score"], 100);
    assert_eq!(json["accuracy"]["pronunciation"], 0);
    assert_eq!(json["accuracy"]["completeness"], 80);
    assert_eq!(json["accuracy"]["overall_accuracy"], 0);
    assert_eq!(json["discrepancies"].as_array().unwrap().len(), 1);
    assert_eq!(json["discrepancies"][0]["kind"], "misordered");
    assert_eq!(json["confidence"], 1.0);
}

#[tokio::test]
async fn unparsable_judge_reply_fails() {
    let app = TestApp::spawn_with(with_judges(vec![FakeJudge::replying(
        "gemini",
        "The recitation was mostly correct.",
    )]))
    .await;

    let resp = assess(&app, &body()).await;
    assert_eq!(resp.status().as_u16(), 500);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn failed_judge_is_not_replaced() {
    let failing = FakeJudge::failing("gemini", BackendError::Transient("503".into()));
    let spare = FakeJudge::replying("openai", r#"{"score": 70}"#);
    let app = TestApp::spawn_with(with_judges(vec![failing, spare])).await;

    let resp = assess(&app, &body()).await;

    assert_eq!(resp.status().as_u16(), 500);
    assert_eq!(app.judges[0].calls(), 1);
    assert_eq!(app.judges[1].calls(), 0);

    let mut selected = body();
    selected["judgeBackend"] = json!("openai");
    let resp = assess(&app, &selected).await;
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["score"], 70);
}

#[tokio::test]
async fn missing_fields_and_unknown_judge_are_bad_requests() {
    let app = TestApp::spawn().await;

    let mut missing = body();
    missing.as_object_mut().unwrap().remove("originalText");
    let resp = assess(&app, &missing).await;
    assert_eq!(resp.status().as_u16(), 400);

    let mut unknown = body();
    unknown["judgeBackend"] = json!("oracle");
    let resp = assess(&app, &unknown).await;
    assert_eq!(resp.status().as_u16(), 400);

    assert_eq!(app.judges[0].calls(), 0);
}

#[tokio::test]
async fn lists_judges_and_default() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .get(app.url("/api/assessment/backend"))
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["backends"], json!(["gemini"]));
    assert_eq!(json["default"], "gemini");
}
