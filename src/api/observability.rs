use crate::api::AppState;
use axum::{
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, field, info, info_span};
use uuid::Uuid;

const REQUIREMENT_ROUTE: &str = "/api/require/{id}";
const EXPORT_ROUTE: &str = "/api/require/requirement/get-excel";

pub async fn get_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.prometheus_handle.as_ref().map_or_else(
        || "Metrics not enabled or failed to initialize".to_string(),
        metrics_exporter_prometheus::PrometheusHandle::render,
    )
}

/// What the request log line says about one request.
#[derive(Debug, Default, PartialEq, Eq)]
struct RequestLabels {
    method: String,
    path: String,
    route: Option<String>,
    requirement_id: Option<String>,
    export_query: Option<String>,
}

impl RequestLabels {
    fn from_request(req: &Request) -> Self {
        let route = req.extensions().get::<MatchedPath>().map(MatchedPath::as_str);
        Self::new(req.method().as_str(), req.uri().path(), req.uri().query(), route)
    }

    fn new(method: &str, path: &str, query: Option<&str>, route: Option<&str>) -> Self {
        let requirement_id = (route == Some(REQUIREMENT_ROUTE))
            .then(|| path.rsplit('/').next().map(str::to_string))
            .flatten();

        let export_query =
            (route == Some(EXPORT_ROUTE)).then(|| query.unwrap_or_default().to_string());

        Self {
            method: method.to_string(),
            path: path.to_string(),
            route: route.map(str::to_string),
            requirement_id,
            export_query,
        }
    }

    /// Route template when matched, so ids do not inflate label cardinality.
    fn metrics_path(&self) -> &str {
        self.route.as_deref().unwrap_or(&self.path)
    }
}

fn outcome(status: StatusCode) -> &'static str {
    if status.is_server_error() {
        "error"
    } else if status.is_client_error() {
        "client_error"
    } else {
        "success"
    }
}

pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let labels = RequestLabels::from_request(&req);

    let span = info_span!(
        "request",
        request_id = %Uuid::new_v4(),
        method = %labels.method,
        path = %labels.path,
        route = labels.route.as_deref(),
        requirement_id = field::Empty,
        export_query = field::Empty,
    );
    if let Some(id) = &labels.requirement_id {
        span.record("requirement_id", id.as_str());
    }
    if let Some(query) = &labels.export_query {
        span.record("export_query", query.as_str());
    }

    async move {
        let response = next.run(req).await;
        let status = response.status();
        let elapsed = start.elapsed();

        let metric_labels = [
            ("method", labels.method.clone()),
            ("path", labels.metrics_path().to_string()),
            ("status", status.as_u16().to_string()),
        ];
        metrics::counter!("http_requests_total", &metric_labels).increment(1);
        metrics::histogram!("http_request_duration_seconds", &metric_labels)
            .record(elapsed.as_secs_f64());

        info!(
            event = "http_request_finished",
            duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            status_code = status.as_u16(),
            outcome = outcome(status),
            "Request finished"
        );

        response
    }
    .instrument(span)
    .await
}
