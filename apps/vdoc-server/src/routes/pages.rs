//! Page API endpoints
//!
//! - `GET /api/pages` lists the page profiles
//! - `POST /api/pages/:kind/submit` runs the prompt composer for one page

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::compose::{ExtractionMode, RenderedResult, SubjectKind, SubjectPolicy};
use crate::error::{AppError, Result};
use crate::page::FormPage;
use crate::state::AppState;

/// Summary of a page profile
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    pub kind: SubjectKind,
    pub title: &'static str,
    pub input_placeholder: &'static str,
    pub submit_label: &'static str,
    pub extract_label: &'static str,
    pub subject_policy: SubjectPolicy,
    pub extraction: ExtractionMode,
}

#[derive(Debug, Serialize)]
pub struct PageListResponse {
    pub pages: Vec<PageSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub extracted_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub html: String,
}

/// Create the pages router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_pages))
        .route("/:kind/submit", post(submit))
}

async fn list_pages() -> Json<PageListResponse> {
    let pages = SubjectKind::ALL
        .iter()
        .map(|kind| {
            let profile = kind.profile();
            PageSummary {
                kind: *kind,
                title: profile.title,
                input_placeholder: profile.input_placeholder,
                submit_label: profile.submit_label,
                extract_label: profile.extract_label,
                subject_policy: profile.subject_policy,
                extraction: profile.extraction,
            }
        })
        .collect();

    Json(PageListResponse { pages })
}

async fn submit(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>> {
    let kind = SubjectKind::parse(&kind)
        .ok_or_else(|| AppError::NotFound(format!("Unknown page: {}", kind)))?;

    let mut page = FormPage::new(kind);
    page.set_input(request.input);
    if let Some(text) = request.extracted_text {
        page.set_extracted_text(text);
    }

    match page.submit(state.composer()).await {
        None => Err(AppError::BadRequest(
            "Enter a subject or extract text from an image first".to_string(),
        )),
        Some(RenderedResult::Answer { html }) => Ok(Json(SubmitResponse { html: html.clone() })),
        Some(RenderedResult::Failure { message }) => Err(AppError::Upstream(message.clone())),
    }
}

#[cfg(test)]
mod tests {
    use crate::genai::MockGenerator;
    use crate::ocr::MockDetector;
    use crate::routes::router;
    use crate::state::tests::mock_state;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn server(composer: Arc<MockGenerator>, dir: &TempDir) -> TestServer {
        let (state, _) = mock_state(
            MockDetector::with_text("unused"),
            Arc::new(MockGenerator::replying("unused")),
            composer,
            dir.path(),
        );
        TestServer::new(router(state)).unwrap()
    }

    #[tokio::test]
    async fn test_list_pages() {
        let temp_dir = TempDir::new().unwrap();
        let server = server(Arc::new(MockGenerator::replying("unused")), &temp_dir);

        let body: Value = server.get("/api/pages").await.json();
        let pages = body["pages"].as_array().unwrap();

        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0]["kind"], "drug");
        assert_eq!(pages[0]["extraction"], "ocr");
        assert_eq!(pages[1]["subjectPolicy"], "joinAll");
        assert_eq!(pages[1]["extraction"], "vision");
    }

    #[tokio::test]
    async fn test_submit_renders_answer() {
        let temp_dir = TempDir::new().unwrap();
        let composer = Arc::new(MockGenerator::replying("**Aspirin** thins blood"));
        let server = server(composer.clone(), &temp_dir);

        let response = server
            .post("/api/pages/drug/submit")
            .json(&json!({ "input": "Aspirin" }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert!(body["html"]
            .as_str()
            .unwrap()
            .contains("<strong>Aspirin</strong>"));
        assert_eq!(composer.calls(), 1);
    }

    #[tokio::test]
    async fn test_submit_joins_extracted_text() {
        let temp_dir = TempDir::new().unwrap();
        let composer = Arc::new(MockGenerator::replying("table"));
        let server = server(composer.clone(), &temp_dir);

        server
            .post("/api/pages/nutrition/submit")
            .json(&json!({ "input": "apple", "extractedText": "sugar" }))
            .await
            .assert_status_ok();

        let request = composer.last_request().unwrap();
        assert!(request.texts()[2].starts_with("Food items: apple, sugar"));
    }

    #[tokio::test]
    async fn test_submit_rejections() {
        let temp_dir = TempDir::new().unwrap();
        let composer = Arc::new(MockGenerator::replying("unused"));
        let server = server(composer.clone(), &temp_dir);

        server
            .post("/api/pages/drug/submit")
            .json(&json!({ "input": "  " }))
            .expect_failure()
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        server
            .post("/api/pages/weather/submit")
            .json(&json!({ "input": "rain" }))
            .expect_failure()
            .await
            .assert_status(StatusCode::NOT_FOUND);

        assert_eq!(composer.calls(), 0);
    }

    #[tokio::test]
    async fn test_submit_generation_failure() {
        let temp_dir = TempDir::new().unwrap();
        let server = server(Arc::new(MockGenerator::failing("upstream 503")), &temp_dir);

        let response = server
            .post("/api/pages/drug/submit")
            .json(&json!({ "input": "Aspirin" }))
            .expect_failure()
            .await;

        response.assert_status(StatusCode::BAD_GATEWAY);
        let body: Value = response.json();
        assert_eq!(
            body["message"],
            "An error occurred while fetching the drug interaction information."
        );
    }
}
