//! Ingredient detection endpoint
//!
//! `POST /api/obj-detect` with `{"image": "<data URL>"}`.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ObjDetectRequest {
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IngredientsResponse {
    pub ingredients: String,
}

/// Error body; `error` carries the underlying message
#[derive(Debug, Serialize)]
pub struct ObjDetectError {
    pub error: String,
}

type ObjDetectResult = Result<Json<IngredientsResponse>, (StatusCode, Json<ObjDetectError>)>;

fn failure(message: impl Into<String>) -> (StatusCode, Json<ObjDetectError>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ObjDetectError {
            error: message.into(),
        }),
    )
}

/// Ask the vision model which ingredients the image shows
pub async fn obj_detect(
    State(state): State<AppState>,
    body: Result<Json<ObjDetectRequest>, JsonRejection>,
) -> ObjDetectResult {
    let Json(request) = body.map_err(|e| {
        tracing::error!("Invalid detection request: {}", e);
        failure(e.body_text())
    })?;

    let image = request.image.ok_or_else(|| {
        tracing::error!("Detection request without image");
        failure("Missing image in request body")
    })?;

    let ingredients = state.vision().detect(&image).await.map_err(|e| {
        tracing::error!("Ingredient detection failed: {}", e);
        failure(e.to_string())
    })?;

    tracing::debug!("Detected ingredients: {}", ingredients.trim());

    Ok(Json(IngredientsResponse { ingredients }))
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

    fn server(vision: Arc<MockGenerator>, dir: &TempDir) -> TestServer {
        let (state, _) = mock_state(
            MockDetector::with_text("unused"),
            vision,
            Arc::new(MockGenerator::replying("unused")),
            dir.path(),
        );
        TestServer::new(router(state)).unwrap()
    }

    #[tokio::test]
    async fn test_detects_ingredients() {
        let temp_dir = TempDir::new().unwrap();
        let vision = Arc::new(MockGenerator::replying("tomato, basil, mozzarella"));
        let server = server(vision.clone(), &temp_dir);

        let response = server
            .post("/api/obj-detect")
            .json(&json!({ "image": "data:image/png;base64,iVBORw0KGgo=" }))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({ "ingredients": "tomato, basil, mozzarella" }));

        let request = vision.last_request().unwrap();
        let sent = serde_json::to_value(&request).unwrap();
        assert_eq!(sent["contents"][0]["parts"][0]["inlineData"]["data"], "iVBORw0KGgo=");
        assert_eq!(sent["contents"][0]["parts"][0]["inlineData"]["mimeType"], "image/jpeg");
    }

    #[tokio::test]
    async fn test_missing_separator_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let vision = Arc::new(MockGenerator::replying("unused"));
        let server = server(vision.clone(), &temp_dir);

        let response = server
            .post("/api/obj-detect")
            .json(&json!({ "image": "iVBORw0KGgo=" }))
            .expect_failure()
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert!(body["error"].as_str().unwrap().contains("data URL"));
        assert_eq!(vision.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_image_and_bad_json() {
        let temp_dir = TempDir::new().unwrap();
        let server = server(Arc::new(MockGenerator::replying("unused")), &temp_dir);

        let response = server
            .post("/api/obj-detect")
            .json(&json!({ "picture": "x" }))
            .expect_failure()
            .await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        response.assert_json(&json!({ "error": "Missing image in request body" }));

        let response = server
            .post("/api/obj-detect")
            .text("not json")
            .expect_failure()
            .await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_model_failure_message_is_returned() {
        let temp_dir = TempDir::new().unwrap();
        let server = server(Arc::new(MockGenerator::failing("Quota exceeded")), &temp_dir);

        let response = server
            .post("/api/obj-detect")
            .json(&json!({ "image": "data:image/jpeg;base64,QUJD" }))
            .expect_failure()
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert!(body["error"].as_str().unwrap().contains("Quota exceeded"));
    }
}
