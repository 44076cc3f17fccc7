use crate::api::{adapter, ApiError, Endpoint};
use crate::config::Endpoints;
use crate::domain::{
    AnalysisResult, ComplaintRecord, DetectionReport, HotspotRecord, ServerHistoryItem, Timeline,
};
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

/// Number of retrieved documents requested for recommendations.
pub const RECOMMENDATION_TOP_K: u32 = 3;

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
}

/// Thin client over the backend services. No retries: callers decide what a
/// failure means, usually via [`or_empty`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl ApiClient {
    pub fn new(endpoints: Endpoints, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Client)?;
        Ok(Self { http, endpoints })
    }

    fn url(&self, endpoint: Endpoint) -> String {
        let base = match endpoint {
            Endpoint::Analyze => &self.endpoints.analysis,
            Endpoint::ComplaintsMap | Endpoint::Timeline => &self.endpoints.map,
            Endpoint::Hotspots => &self.endpoints.hotspots,
            Endpoint::History => &self.endpoints.history,
            Endpoint::Detect => &self.endpoints.detect,
        };
        format!("{}{}", base.trim_end_matches('/'), endpoint.path())
    }

    async fn read_json(endpoint: Endpoint, response: reqwest::Response) -> Result<Value, ApiError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { endpoint, status });
        }
        let body = response
            .bytes()
            .await
            .map_err(|source| ApiError::Transport { endpoint, source })?;
        serde_json::from_slice(&body).map_err(|source| ApiError::Decode { endpoint, source })
    }

    async fn get_json(&self, endpoint: Endpoint) -> Result<Value, ApiError> {
        let url = self.url(endpoint);
        tracing::debug!(%url, "GET");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| ApiError::Transport { endpoint, source })?;
        Self::read_json(endpoint, response).await
    }

    async fn post_analyze(&self, text: &str, top_k: Option<u32>) -> Result<Value, ApiError> {
        let endpoint = Endpoint::Analyze;
        let url = self.url(endpoint);
        tracing::debug!(%url, "POST");
        let response = self
            .http
            .post(&url)
            .json(&AnalyzeRequest { text, top_k })
            .send()
            .await
            .map_err(|source| ApiError::Transport { endpoint, source })?;
        Self::read_json(endpoint, response).await
    }

    pub async fn fetch_map_complaints(&self) -> Result<Vec<ComplaintRecord>, ApiError> {
        let payload = self.get_json(Endpoint::ComplaintsMap).await?;
        Ok(adapter::complaints_from_map(&payload))
    }

    pub async fn fetch_hotspots(&self) -> Result<Vec<HotspotRecord>, ApiError> {
        let payload = self.get_json(Endpoint::Hotspots).await?;
        Ok(adapter::hotspots_from_payload(&payload))
    }

    pub async fn fetch_history(&self) -> Result<Vec<ServerHistoryItem>, ApiError> {
        let payload = self.get_json(Endpoint::History).await?;
        Ok(adapter::history_items_from_payload(&payload))
    }

    pub async fn fetch_timeline(&self) -> Result<Timeline, ApiError> {
        let payload = self.get_json(Endpoint::Timeline).await?;
        Ok(adapter::timeline_from_payload(&payload))
    }

    pub async fn analyze(&self, text: &str) -> Result<AnalysisResult, ApiError> {
        let payload = self.post_analyze(text, None).await?;
        adapter::analysis_from_payload(payload).map_err(|source| ApiError::Decode {
            endpoint: Endpoint::Analyze,
            source,
        })
    }

    /// Asks the analysis service what to do about a hotspot.
    pub async fn recommend(&self, area: &str, sample_text: &str) -> Result<String, ApiError> {
        let question = recommendation_question(area, sample_text);
        let payload = self
            .post_analyze(&question, Some(RECOMMENDATION_TOP_K))
            .await?;
        Ok(adapter::recommendation_text(&payload))
    }

    /// Uploads an image to the YOLO service as multipart field `file`.
    pub async fn detect(&self, image: &Path) -> Result<DetectionReport, ApiError> {
        let endpoint = Endpoint::Detect;
        let bytes = tokio::fs::read(image).await.map_err(|source| ApiError::Io {
            path: image.to_path_buf(),
            source,
        })?;
        let file_name = image
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();

        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));
        let url = self.url(endpoint);
        tracing::debug!(%url, "POST multipart");
        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|source| ApiError::Transport { endpoint, source })?;
        let payload = Self::read_json(endpoint, response).await?;
        adapter::detection_report_from_payload(payload)
            .map_err(|source| ApiError::Decode { endpoint, source })
    }
}

pub fn recommendation_question(area: &str, sample_text: &str) -> String {
    format!("There are {area} with many complaints: {sample_text}. What should authorities do?")
}

/// Degrades a failed fetch to an empty dataset, logging the cause.
pub fn or_empty<T: Default>(endpoint: Endpoint, result: Result<T, ApiError>) -> T {
    match result {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(%endpoint, %error, "fetch failed, continuing without data");
            T::default()
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use axum::extract::Multipart;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;

    /// Serves `router` on an ephemeral port and returns its base URL.
    pub async fn spawn_backend(router: Router) -> std::io::Result<String> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        Ok(format!("http://{addr}"))
    }

    pub fn client_for(base: &str) -> Result<ApiClient, ApiError> {
        let endpoints = Endpoints {
            analysis: base.to_string(),
            hotspots: base.to_string(),
            map: base.to_string(),
            history: base.to_string(),
            detect: base.to_string(),
        };
        ApiClient::new(endpoints, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn hotspots_skip_invalid_coordinates() -> Result<(), Box<dyn std::error::Error>> {
        let router = Router::new().route(
            "/hotspots",
            get(|| async {
                Json(json!({"hotspots": [
                    {"area": "Bad", "lat": "abc", "lng": 75.1, "count": 30},
                    {"area": "Keshwapur", "lat": 15.35, "lng": 75.13, "count": 7,
                     "avg_urgency_label": "High", "sample_text": "Overflowing drain"},
                    {"area": "Vidyanagar", "lat": 15.37, "lng": 75.12, "count": 2,
                     "avg_urgency_label": "Low", "sample_text": "Loose paving"}
                ]}))
            }),
        );
        let base = spawn_backend(router).await?;
        let hotspots = client_for(&base)?.fetch_hotspots().await?;

        let areas: Vec<_> = hotspots.iter().map(|h| h.area.as_str()).collect();
        assert_eq!(areas, vec!["Keshwapur", "Vidyanagar"]);
        Ok(())
    }

    #[tokio::test]
    async fn failed_fetches_degrade_to_empty() -> Result<(), Box<dyn std::error::Error>> {
        let router = Router::new()
            .route(
                "/complaints/map",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            )
            .route("/hotspots", get(|| async { "not json" }));
        let base = spawn_backend(router).await?;
        let client = client_for(&base)?;

        let map = client.fetch_map_complaints().await;
        assert!(matches!(map, Err(ApiError::Status { .. })));
        assert!(or_empty(Endpoint::ComplaintsMap, map).is_empty());

        let hotspots = client.fetch_hotspots().await;
        assert!(matches!(hotspots, Err(ApiError::Decode { .. })));
        assert!(or_empty(Endpoint::Hotspots, hotspots).is_empty());

        // no route registered
        let history = client.fetch_history().await;
        assert!(or_empty(Endpoint::History, history).is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() -> Result<(), Box<dyn std::error::Error>> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        drop(listener);

        let client = client_for(&format!("http://{addr}"))?;
        let timeline = client.fetch_timeline().await;
        assert!(matches!(timeline, Err(ApiError::Transport { .. })));
        assert!(or_empty(Endpoint::Timeline, timeline).is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn recommend_sends_hotspot_question() -> Result<(), Box<dyn std::error::Error>> {
        let router = Router::new().route(
            "/analyze",
            post(|Json(body): Json<Value>| async move {
                let text = body["text"].as_str().unwrap_or_default().to_string();
                let top_k = body["top_k"].as_u64().unwrap_or_default();
                Json(json!({"recommended_action": format!("{top_k}:{text}")}))
            }),
        );
        let base = spawn_backend(router).await?;
        let answer = client_for(&base)?
            .recommend("Old Hubli", "Streetlights out")
            .await?;

        assert_eq!(
            answer,
            "3:There are Old Hubli with many complaints: Streetlights out. What should authorities do?"
        );
        Ok(())
    }

    #[tokio::test]
    async fn detect_uploads_file_field() -> Result<(), Box<dyn std::error::Error>> {
        let router = Router::new().route(
            "/yolo",
            post(|mut multipart: Multipart| async move {
                let mut name = String::new();
                let mut size = 0;
                while let Ok(Some(field)) = multipart.next_field().await {
                    name = field.name().unwrap_or_default().to_string();
                    size = field.bytes().await.map(|b| b.len()).unwrap_or_default();
                }
                Json(json!({
                    "detections": [{"class": name, "confidence": 0.9, "x": 10, "y": 10,
                                    "width": 4, "height": size}],
                    "rendered_image": "aGk=", "width": 64, "height": 48
                }))
            }),
        );
        let base = spawn_backend(router).await?;

        let path = std::env::temp_dir().join(format!("civic-dash-upload-{}.png", std::process::id()));
        tokio::fs::write(&path, b"12345").await?;
        let report = client_for(&base)?.detect(&path).await;
        tokio::fs::remove_file(&path).await?;
        let report = report?;

        assert_eq!(report.detections.len(), 1);
        assert_eq!(report.detections[0].class, "file");
        assert!((report.detections[0].height - 5.0).abs() < f64::EPSILON);
        assert_eq!(report.width, Some(64));
        Ok(())
    }

    #[tokio::test]
    async fn detect_reports_missing_file() -> Result<(), Box<dyn std::error::Error>> {
        let client = client_for("http://127.0.0.1:9")?;
        let result = client.detect(Path::new("/definitely/not/here.png")).await;
        assert!(matches!(result, Err(ApiError::Io { .. })));
        Ok(())
    }
}
