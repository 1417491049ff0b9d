use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::assembler::{Profile, ProfileAssembler};
use crate::workflows::responses::{ImportIssue, ResponseImportError, ResponseImporter};

/// Answers for one respondent, either as a code-to-rating map or a raw CSV export.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileRequest {
    pub id: String,
    #[serde(default)]
    pub ratings: BTreeMap<String, Option<i64>>,
    #[serde(default)]
    pub csv: Option<String>,
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: Profile,
    pub import_issues: Vec<ImportIssue>,
}

/// Router builder exposing profile computation over HTTP.
pub fn profile_router(assembler: Arc<ProfileAssembler>) -> Router {
    Router::new()
        .route("/api/v1/profile", post(compute_handler))
        .with_state(assembler)
}

pub(crate) async fn compute_handler(
    State(assembler): State<Arc<ProfileAssembler>>,
    payload: Result<axum::Json<ProfileRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(axum::Json(request)) => request,
        Err(rejection) => {
            let payload = json!({ "error": rejection.body_text() });
            return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
        }
    };

    let ProfileRequest {
        id,
        ratings,
        csv,
        strict,
    } = request;

    let id = id.trim().to_string();
    if id.is_empty() {
        let payload = json!({ "error": "profile id must not be empty" });
        return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
    }
    if csv.is_some() && !ratings.is_empty() {
        let payload = json!({ "error": "send either ratings or csv, not both" });
        return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
    }

    let importer = ResponseImporter::new(assembler.registry()).strict(strict);
    let imported = match csv {
        Some(csv) => importer.import_reader(Cursor::new(csv.into_bytes())),
        None => importer.import_pairs(ratings),
    };

    match imported {
        Ok(import) => {
            let profile = assembler.assemble(id, &import.responses);
            info!(
                profile_id = %profile.id,
                answered = profile.meta.num_items_answered,
                issues = import.issues.len(),
                "profile computed"
            );
            let body = ProfileResponse {
                profile,
                import_issues: import.issues,
            };
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(ResponseImportError::Rejected { issues }) => {
            let payload = json!({
                "error": format!("response set rejected with {} issue(s)", issues.len()),
                "import_issues": issues,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    fn assembler() -> Arc<ProfileAssembler> {
        Arc::new(ProfileAssembler::standard().expect("standard registry"))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("body readable");
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn full_ratings(assembler: &ProfileAssembler, value: i64) -> BTreeMap<String, Option<i64>> {
        assembler
            .registry()
            .items()
            .iter()
            .map(|item| (item.code.to_string(), Some(value)))
            .collect()
    }

    #[tokio::test]
    async fn compute_handler_scores_rating_maps() {
        let assembler = assembler();
        let request = ProfileRequest {
            id: "p-17".to_string(),
            ratings: full_ratings(&assembler, 5),
            ..ProfileRequest::default()
        };

        let response = compute_handler(State(assembler), Ok(axum::Json(request))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["profile"]["id"], "p-17");
        assert_eq!(body["profile"]["meta"]["num_items_answered"], 88);
        assert!(body["import_issues"].as_array().expect("issues").is_empty());
    }

    #[tokio::test]
    async fn compute_handler_rejects_blank_ids() {
        let request = ProfileRequest {
            id: "   ".to_string(),
            ..ProfileRequest::default()
        };

        let response = compute_handler(State(assembler()), Ok(axum::Json(request))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn compute_handler_reports_strict_rejections() {
        let mut ratings = BTreeMap::new();
        ratings.insert("A1".to_string(), Some(3));
        let request = ProfileRequest {
            id: "strict".to_string(),
            ratings,
            strict: true,
            ..ProfileRequest::default()
        };

        let response = compute_handler(State(assembler()), Ok(axum::Json(request))).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["import_issues"].as_array().expect("issues").len(), 87);
    }

    #[tokio::test]
    async fn profile_route_accepts_csv_payloads() {
        let router = profile_router(assembler());
        let payload = json!({
            "id": "csv-upload",
            "csv": "item_code,rating\nA1,4\nA2,9\n",
        });

        let response = router
            .oneshot(
                Request::post("/api/v1/profile")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["profile"]["meta"]["num_items_answered"], 1);
        let issues = body["import_issues"].as_array().expect("issues");
        assert!(issues
            .iter()
            .any(|issue| issue["kind"] == "out_of_range" && issue["code"] == "A2"));
    }

    async fn post_profile(body: &str) -> Response {
        profile_router(assembler())
            .oneshot(
                Request::post("/api/v1/profile")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("router responds")
    }

    #[tokio::test]
    async fn profile_route_rejects_payload_without_id() {
        let response = post_profile(r#"{"ratings":{"A1":4}}"#).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        let error = body["error"].as_str().expect("error message");
        assert!(error.contains("id"), "unexpected error: {error}");
    }

    #[tokio::test]
    async fn profile_route_rejects_fractional_ratings() {
        let response = post_profile(r#"{"id":"x","ratings":{"A1":3.5}}"#).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn profile_route_rejects_malformed_json() {
        let response = post_profile("{not json").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());
    }
}
