use crate::fixtures::test_app::{TestApp, TestBackends};
use serde_json::{Value, json};

async fn post_passage(app: &TestApp, body: Value) -> reqwest::Response {
    app.client
        .post(app.url("/api/passage"))
        .json(&body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn single_verse_passage() {
    let app = TestApp::spawn().await;

    let resp = post_passage(
        &app,
        json!({ "start_chapter": 2, "start_verse": 255, "end_chapter": 2, "end_verse": 255 }),
    )
    .await;

    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["reference"], "2:255");
    assert_eq!(json["verse_count"], 1);
    assert_eq!(json["verses"][0]["verse"], 255);
}

#[tokio::test]
async fn cross_chapter_passage_accepts_camel_case() {
    let app = TestApp::spawn().await;

    let resp = post_passage(
        &app,
        json!({
            "startChapter": 1, "startVerse": 1,
            "endChapter": 2, "endVerse": 3,
            "scriptVariant": "hafs"
        }),
    )
    .await;

    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["reference"], "1:1 - 2:3");
    assert_eq!(json["verse_count"], 10);
    let text = json["simple_text"].as_str().unwrap();
    assert!(text.starts_with("بسم الله الرحمن الرحيم الحمد لله"));
    assert!(text.ends_with("آية 2:3"));
    assert!(json["diacritical_text"].as_str().unwrap().starts_with("بِسْمِ"));
}

#[tokio::test]
async fn misordered_range_is_bad_request() {
    let app = TestApp::spawn().await;

    let resp = post_passage(
        &app,
        json!({ "start_chapter": 2, "start_verse": 5, "end_chapter": 1, "end_verse": 1 }),
    )
    .await;

    assert_eq!(resp.status().as_u16(), 400);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "bad_request");
}

#[tokio::test]
async fn out_of_range_chapter_is_bad_request() {
    let app = TestApp::spawn().await;

    let resp = post_passage(
        &app,
        json!({ "start_chapter": 0, "start_verse": 1, "end_chapter": 1, "end_verse": 1 }),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 400);

    let resp = post_passage(&app, json!({ "start_chapter": 1 })).await;
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn verses_past_chapter_end_are_not_found() {
    let app = TestApp::spawn().await;

    let resp = post_passage(
        &app,
        json!({ "start_chapter": 1, "start_verse": 8, "end_chapter": 1, "end_verse": 9 }),
    )
    .await;

    assert_eq!(resp.status().as_u16(), 404);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "not_found");
}

#[tokio::test]
async fn unavailable_chapter_hides_internal_detail() {
    let app = TestApp::spawn().await;

    // Chapter 3 is not seeded; the whole resolution fails
    let resp = post_passage(
        &app,
        json!({ "start_chapter": 2, "start_verse": 280, "end_chapter": 3, "end_verse": 2 }),
    )
    .await;

    assert_eq!(resp.status().as_u16(), 500);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "internal");
    assert_eq!(json["message"], "An internal error occurred");
}

#[tokio::test]
async fn dev_mode_exposes_internal_detail() {
    let app = TestApp::spawn_configured(TestBackends::default(), |s| s.app.dev_mode = true).await;

    let resp = post_passage(
        &app,
        json!({ "start_chapter": 2, "start_verse": 280, "end_chapter": 3, "end_verse": 2 }),
    )
    .await;

    assert_eq!(resp.status().as_u16(), 500);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "internal");
    assert!(json["message"].as_str().unwrap().contains("chapter 3"));
}

#[tokio::test]
async fn health_reports_version() {
    let app = TestApp::spawn().await;

    let resp = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}
