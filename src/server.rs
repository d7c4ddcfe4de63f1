use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::bioc::FullTextSource;
use crate::harvest::Harvester;
use crate::pubmed::LiteratureIndex;

#[derive(Debug, Deserialize)]
pub struct PlantRequest {
    pub scientific_name: String,
}

pub struct AppState<I, F> {
    harvester: Arc<Harvester<I, F>>,
}

// Derived Clone would require I: Clone and F: Clone.
impl<I, F> Clone for AppState<I, F> {
    fn clone(&self) -> Self {
        Self {
            harvester: Arc::clone(&self.harvester),
        }
    }
}

/// Build the HTTP router around a shared harvester.
pub fn router<I, F>(harvester: Harvester<I, F>) -> Router
where
    I: LiteratureIndex + Send + Sync + 'static,
    F: FullTextSource + Send + Sync + 'static,
{
    let state = AppState {
        harvester: Arc::new(harvester),
    };

    Router::new()
        .route("/medicinal", post(medicinal::<I, F>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Every body rejection (bad syntax, wrong shape, missing content type) is a 422.
fn reject_body(rejection: JsonRejection) -> Response {
    warn!(status = %rejection.status(), error = %rejection.body_text(), "rejected request body");
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "detail": rejection.body_text() })),
    )
        .into_response()
}

async fn medicinal<I, F>(
    State(state): State<AppState<I, F>>,
    payload: Result<Json<PlantRequest>, JsonRejection>,
) -> Response
where
    I: LiteratureIndex + Send + Sync + 'static,
    F: FullTextSource + Send + Sync + 'static,
{
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return reject_body(rejection),
    };

    info!(plant = %request.scientific_name, "POST /medicinal");
    Json(state.harvester.harvest(&request.scientific_name).await).into_response()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use reqwest::Client;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::bioc::BiocClient;
    use crate::harvest::HarvestOptions;
    use crate::harvest::tests::{FakeFullText, FakeIndex, bioc};
    use crate::pubmed::PubMedClient;

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/medicinal")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn fake_app() -> Router {
        let index = FakeIndex {
            ids: Some(vec!["111".into(), "222".into()]),
            titles: HashMap::from([
                ("111".into(), "Ginger in cold remedies".into()),
                ("222".into(), "Ginger cultivation".into()),
            ]),
        };
        let full_text = FakeFullText {
            documents: HashMap::from([(
                "111".into(),
                bioc(&["Used in cold remedies", "Grows in tropical regions"]),
            )]),
            ..Default::default()
        };
        router(Harvester::new(index, full_text, HarvestOptions::default()))
    }

    #[tokio::test]
    async fn medicinal_returns_matching_articles() {
        let response = fake_app()
            .oneshot(post_json(r#"{"scientific_name": "Zingiber officinale"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({
                "plant": "Zingiber officinale",
                "results": [{
                    "article_title": "Ginger in cold remedies",
                    "passages": ["Used in cold remedies"],
                    "pubmed_id": "111"
                }]
            })
        );
    }

    #[tokio::test]
    async fn missing_field_is_unprocessable() {
        let response = fake_app().oneshot(post_json(r#"{"name": "x"}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn non_string_name_is_unprocessable() {
        let response = fake_app()
            .oneshot(post_json(r#"{"scientific_name": 42}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn invalid_json_is_unprocessable() {
        let response = fake_app().oneshot(post_json("{not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_json(response).await["detail"].is_string());
    }

    #[tokio::test]
    async fn missing_content_type_is_unprocessable() {
        let request = Request::builder()
            .method("POST")
            .uri("/medicinal")
            .body(Body::from(r#"{"scientific_name": "Zingiber officinale"}"#))
            .unwrap();

        let response = fake_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn only_medicinal_route_is_served() {
        let response = fake_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn end_to_end_against_upstream_stubs() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/eutils/esearch.fcgi"))
            .and(query_param("term", "Zingiber officinale medicinal"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "esearchresult": {"idlist": ["111", "222"]}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/eutils/esummary.fcgi"))
            .and(query_param("id", "111"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {"uids": ["111"], "111": {"title": "Ginger as therapy"}}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/eutils/esummary.fcgi"))
            .and(query_param("id", "222"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/bioc/BioC_xml/111/unicode"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<?xml version="1.0"?><collection><document><passage><text>Treats fever and pain.</text></passage></document></collection>"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/bioc/BioC_xml/222/unicode"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[Error] : No result can be found."))
            .mount(&server)
            .await;

        let http = Client::new();
        let harvester = Harvester::new(
            PubMedClient::with_base_url(http.clone(), &format!("{}/eutils", server.uri())),
            BiocClient::with_base_url(http, &format!("{}/bioc", server.uri())),
            HarvestOptions::default(),
        );

        let response = router(harvester)
            .oneshot(post_json(r#"{"scientific_name": "Zingiber officinale"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["plant"], "Zingiber officinale");
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["pubmed_id"], "111");
        assert_eq!(results[0]["article_title"], "Ginger as therapy");
        assert_eq!(results[0]["passages"], json!(["Treats fever and pain."]));
    }
}
