//! Middleware APIクライアント
//!
//! 全エンドポイントは`/api/v1`配下。認証はAuthorizationヘッダーが
//! 設定されていればそれを優先し、なければApiKeyヘッダーを送る。
//! リトライは行わない。

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::types::{
    Alert, AlertsResponse, BuilderDataResponse, CustomWidget, IncidentsResponse, LayoutRequest,
    MetricsV2Request, MetricsV2Response, NewAlert, QueryRequest, QueryResponse, Report,
    ReportListResponse, StatsResponse, UpsertReportRequest, Widget,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// APIクライアントエラー
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("received HTML response instead of JSON. This usually indicates the endpoint doesn't exist or there's an authentication issue. Response preview: {preview}")]
    Html { preview: String },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// ダッシュボード一覧の検索パラメータ
#[derive(Debug, Clone, Default)]
pub struct GetDashboardsParams {
    pub limit: i64,
    pub offset: i64,
    pub search: String,
    pub filter_by: String,
    pub display_scope: String,
    pub sort: String,
}

/// ウィジェット一覧の検索パラメータ
#[derive(Debug, Clone, Default)]
pub struct GetWidgetsParams {
    pub report_id: i64,
    pub display_scope: String,
}

/// アラート一覧の検索パラメータ
#[derive(Debug, Clone, Default)]
pub struct GetAlertsParams {
    pub page: i64,
    pub order_by: String,
}

/// インシデント一覧の検索パラメータ
#[derive(Debug, Clone, Default)]
pub struct GetIncidentsParams {
    pub from_ts: i64,
    pub to_ts: i64,
    pub page: i64,
    pub filter: String,
    pub status: String,
    pub search: String,
}

/// インシデント詳細の検索パラメータ
#[derive(Debug, Clone, Default)]
pub struct GetIncidentDetailParams {
    pub fingerprint: String,
    pub from_ts: i64,
    pub to_ts: i64,
    pub filter: String,
}

pub struct MiddlewareClient {
    base_url: String,
    api_key: String,
    auth_header: String,
    http: reqwest::Client,
}

impl MiddlewareClient {
    /// クライアントを生成する。ベースURL末尾のスラッシュは取り除く。
    pub fn new(
        base_url: &str,
        api_key: &str,
        authorization: &str,
    ) -> Result<Self, ClientError> {
        let normalized = base_url.strip_suffix('/').unwrap_or(base_url);
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            base_url: normalized.to_string(),
            api_key: api_key.to_string(),
            auth_header: authorization.to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn do_request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<Value, ClientError> {
        let url = format!("{}/api/v1{}", self.base_url, path);
        debug!("Request: method={} path={} url={}", method, path, url);

        let mut req = self
            .http
            .request(method, &url)
            .header("Content-Type", "application/json");

        if !self.auth_header.is_empty() {
            req = req.header("Authorization", &self.auth_header);
        } else if !self.api_key.is_empty() {
            req = req.header("ApiKey", &self.api_key);
        }

        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = &body {
            debug!("Request body: {}", body);
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(error_from_response(status, &text));
        }

        if text.is_empty() {
            return Ok(Value::Null);
        }
        if text.starts_with('<') {
            return Err(ClientError::Html {
                preview: truncate(&text, 200),
            });
        }

        Ok(serde_json::from_str(&text)?)
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<T, ClientError> {
        let value = self.do_request(method, path, query, body).await?;
        Ok(serde_json::from_value(value)?)
    }

    // -- ダッシュボード ----------------------------------------------------

    pub async fn get_dashboards(
        &self,
        params: &GetDashboardsParams,
    ) -> Result<ReportListResponse, ClientError> {
        let mut query = Vec::new();
        if params.limit > 0 {
            query.push(("limit", params.limit.to_string()));
        }
        if params.offset > 0 {
            query.push(("offset", params.offset.to_string()));
        }
        if !params.search.is_empty() {
            query.push(("search", params.search.clone()));
        }
        if !params.filter_by.is_empty() {
            query.push(("filterBy", params.filter_by.clone()));
        }
        if !params.display_scope.is_empty() {
            query.push(("display_scope", params.display_scope.clone()));
        }
        if !params.sort.is_empty() {
            query.push(("sort", params.sort.clone()));
        }

        self.request(Method::GET, "/builder/report", &query, None)
            .await
    }

    pub async fn get_dashboard_by_key(
        &self,
        report_key: &str,
    ) -> Result<ReportListResponse, ClientError> {
        let path = format!("/builder/report/{}", report_key);
        self.request(Method::GET, &path, &[], None).await
    }

    pub async fn create_dashboard(
        &self,
        req: &UpsertReportRequest,
    ) -> Result<Report, ClientError> {
        self.request(
            Method::POST,
            "/builder/report",
            &[],
            Some(serde_json::to_value(req)?),
        )
        .await
    }

    pub async fn update_dashboard(
        &self,
        id: i64,
        req: &UpsertReportRequest,
    ) -> Result<Report, ClientError> {
        let path = format!("/builder/report/{}", id);
        self.request(Method::PUT, &path, &[], Some(serde_json::to_value(req)?))
            .await
    }

    pub async fn delete_dashboard(&self, id: i64) -> Result<(), ClientError> {
        let path = format!("/builder/report/{}", id);
        self.do_request(Method::DELETE, &path, &[], None).await?;
        Ok(())
    }

    pub async fn clone_dashboard(
        &self,
        req: &UpsertReportRequest,
    ) -> Result<Report, ClientError> {
        self.request(
            Method::POST,
            "/builder/report/clone",
            &[],
            Some(serde_json::to_value(req)?),
        )
        .await
    }

    pub async fn set_dashboard_favorite(
        &self,
        report_id: i64,
        favorite: bool,
    ) -> Result<(), ClientError> {
        let path = format!("/builder/report/favourite/{}/{}", report_id, favorite);
        self.do_request(Method::GET, &path, &[], None).await?;
        Ok(())
    }

    // -- ウィジェット ------------------------------------------------------

    pub async fn get_widgets(&self, params: &GetWidgetsParams) -> Result<Widget, ClientError> {
        let mut query = Vec::new();
        if params.report_id > 0 {
            query.push(("report_id", params.report_id.to_string()));
        }
        if !params.display_scope.is_empty() {
            query.push(("display_scope", params.display_scope.clone()));
        }

        self.request(Method::GET, "/builder/widget", &query, None)
            .await
    }

    /// ウィジェットの作成。エンドポイントはupsertとして振る舞う。
    pub async fn create_widget(&self, widget: &CustomWidget) -> Result<Widget, ClientError> {
        self.request(
            Method::POST,
            "/builder/widget",
            &[],
            Some(serde_json::to_value(widget)?),
        )
        .await
    }

    /// 既存ウィジェットの更新。builderIdを含めて同じupsertエンドポイントに送る。
    pub async fn update_widget(&self, widget: &CustomWidget) -> Result<Widget, ClientError> {
        self.create_widget(widget).await
    }

    pub async fn delete_widget(&self, builder_id: i64) -> Result<(), ClientError> {
        let path = format!("/builder/widget/{}", builder_id);
        self.do_request(Method::DELETE, &path, &[], None).await?;
        Ok(())
    }

    pub async fn get_widget_data(
        &self,
        widget: &CustomWidget,
    ) -> Result<BuilderDataResponse, ClientError> {
        self.request(
            Method::POST,
            "/builder/widget/data",
            &[],
            Some(serde_json::to_value(widget)?),
        )
        .await
    }

    pub async fn get_multi_widget_data(
        &self,
        widgets: &[CustomWidget],
    ) -> Result<Vec<BuilderDataResponse>, ClientError> {
        self.request(
            Method::POST,
            "/builder/widget/multi-data",
            &[],
            Some(serde_json::to_value(widgets)?),
        )
        .await
    }

    pub async fn update_widget_layouts(&self, req: &LayoutRequest) -> Result<(), ClientError> {
        self.do_request(
            Method::PUT,
            "/builder/widget/scope/layouts",
            &[],
            Some(serde_json::to_value(req)?),
        )
        .await?;
        Ok(())
    }

    // -- メトリクス・クエリ ------------------------------------------------

    pub async fn get_metrics(
        &self,
        req: &MetricsV2Request,
    ) -> Result<MetricsV2Response, ClientError> {
        self.request(
            Method::POST,
            "/builder/metrics-v2",
            &[],
            Some(serde_json::to_value(req)?),
        )
        .await
    }

    pub async fn get_resources(&self) -> Result<Vec<String>, ClientError> {
        self.request(Method::GET, "/builder/resources", &[], None)
            .await
    }

    pub async fn query(&self, req: &QueryRequest) -> Result<QueryResponse, ClientError> {
        self.request(Method::POST, "/query", &[], Some(serde_json::to_value(req)?))
            .await
    }

    // -- アラート ----------------------------------------------------------

    pub async fn get_alerts(
        &self,
        rule_id: i64,
        params: &GetAlertsParams,
    ) -> Result<AlertsResponse, ClientError> {
        let path = format!("/rules/{}/alerts", rule_id);
        let mut query = Vec::new();
        if params.page > 0 {
            query.push(("page", params.page.to_string()));
        }
        if !params.order_by.is_empty() {
            query.push(("order_by", params.order_by.clone()));
        }

        self.request(Method::GET, &path, &query, None).await
    }

    pub async fn create_alert(
        &self,
        rule_id: i64,
        alert: &NewAlert,
    ) -> Result<Alert, ClientError> {
        let path = format!("/rules/{}/alerts", rule_id);
        self.request(Method::POST, &path, &[], Some(serde_json::to_value(alert)?))
            .await
    }

    pub async fn get_alert_stats(&self, rule_id: i64) -> Result<StatsResponse, ClientError> {
        let path = format!("/rules/{}/alerts/stats", rule_id);
        self.request(Method::GET, &path, &[], None).await
    }

    // -- インシデント --------------------------------------------------------

    /// インシデント一覧。各項目にWeb UIへの`issue_url`を付与して返す。
    pub async fn get_incidents(
        &self,
        params: &GetIncidentsParams,
    ) -> Result<IncidentsResponse, ClientError> {
        let mut query = Vec::new();
        if params.from_ts > 0 {
            query.push(("from_ts", params.from_ts.to_string()));
        }
        if params.to_ts > 0 {
            query.push(("to_ts", params.to_ts.to_string()));
        }
        if params.page > 0 {
            query.push(("page", params.page.to_string()));
        }
        if !params.filter.is_empty() {
            query.push(("filter", params.filter.clone()));
        }
        if !params.status.is_empty() {
            query.push(("status", params.status.clone()));
        }
        if !params.search.is_empty() {
            query.push(("search", params.search.clone()));
        }

        let mut result: IncidentsResponse = self
            .request(Method::GET, "/ops-ai/incidents", &query, None)
            .await?;

        for item in &mut result.items {
            if !item.fingerprint.is_empty() {
                item.issue_url =
                    format!("{}/ops-ai?fingerprint={}", self.base_url, item.fingerprint);
            }
        }

        Ok(result)
    }

    pub async fn get_incident_detail(
        &self,
        params: &GetIncidentDetailParams,
    ) -> Result<Value, ClientError> {
        let mut query = Vec::new();
        if !params.fingerprint.is_empty() {
            query.push(("fingerprint", params.fingerprint.clone()));
        }
        if params.from_ts > 0 {
            query.push(("from_ts", params.from_ts.to_string()));
        }
        if params.to_ts > 0 {
            query.push(("to_ts", params.to_ts.to_string()));
        }
        if !params.filter.is_empty() {
            query.push(("filter", params.filter.clone()));
        }

        self.do_request(Method::GET, "/ops-ai/incident-detail", &query, None)
            .await
    }
}

fn error_from_response(status: StatusCode, body: &str) -> ClientError {
    if let Ok(err) = serde_json::from_str::<Value>(body) {
        if let Some(message) = err.get("error").and_then(Value::as_str) {
            if !message.is_empty() {
                return ClientError::Api {
                    status: status.as_u16(),
                    message: message.to_string(),
                };
            }
        }
    }

    if body.starts_with('<') {
        return ClientError::Api {
            status: status.as_u16(),
            message: format!(
                "received HTML response instead of JSON. This usually indicates the endpoint doesn't exist or there's an authentication issue. Response preview: {}",
                truncate(body, 200)
            ),
        };
    }

    ClientError::Api {
        status: status.as_u16(),
        message: truncate(body, 500),
    }
}

/// 文字境界を壊さずに文字列を切り詰める
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, Query, RawQuery};
    use axum::http::HeaderMap;
    use axum::routing::{delete, get, post};
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    async fn spawn_mock(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let client = MiddlewareClient::new("https://demo.middleware.io/", "key", "").unwrap();
        assert_eq!(client.base_url(), "https://demo.middleware.io");
    }

    #[test]
    fn test_truncate_char_boundary() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
        // マルチバイト文字でもパニックしない
        assert_eq!(truncate("あいうえお", 2), "あい...");
    }

    #[tokio::test]
    async fn test_api_key_header_sent() {
        let router = Router::new().route(
            "/api/v1/builder/resources",
            get(|headers: HeaderMap| async move {
                assert_eq!(headers.get("ApiKey").unwrap(), "secret-key");
                assert!(headers.get("Authorization").is_none());
                Json(json!(["host", "container"]))
            }),
        );
        let base = spawn_mock(router).await;

        let client = MiddlewareClient::new(&base, "secret-key", "").unwrap();
        let resources = client.get_resources().await.unwrap();
        assert_eq!(resources, vec!["host", "container"]);
    }

    #[tokio::test]
    async fn test_authorization_takes_precedence() {
        let router = Router::new().route(
            "/api/v1/builder/resources",
            get(|headers: HeaderMap| async move {
                assert_eq!(headers.get("Authorization").unwrap(), "Bearer token123");
                assert!(headers.get("ApiKey").is_none());
                Json(json!([]))
            }),
        );
        let base = spawn_mock(router).await;

        let client = MiddlewareClient::new(&base, "secret-key", "Bearer token123").unwrap();
        client.get_resources().await.unwrap();
    }

    #[tokio::test]
    async fn test_get_dashboards_query_params() {
        let router = Router::new().route(
            "/api/v1/builder/report",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("limit").unwrap(), "10");
                assert_eq!(params.get("search").unwrap(), "cpu");
                assert_eq!(params.get("filterBy").unwrap(), "favorite");
                assert!(!params.contains_key("offset"));
                assert!(!params.contains_key("sort"));
                Json(json!({"reports": [], "total": 0, "limit": 10, "offset": 0}))
            }),
        );
        let base = spawn_mock(router).await;

        let client = MiddlewareClient::new(&base, "key", "").unwrap();
        let params = GetDashboardsParams {
            limit: 10,
            search: "cpu".to_string(),
            filter_by: "favorite".to_string(),
            ..Default::default()
        };
        let result = client.get_dashboards(&params).await.unwrap();
        assert_eq!(result.limit, 10);
    }

    #[tokio::test]
    async fn test_delete_dashboard_path_and_empty_body() {
        let router = Router::new().route(
            "/api/v1/builder/report/{id}",
            delete(|Path(id): Path<i64>| async move {
                assert_eq!(id, 42);
                ""
            }),
        );
        let base = spawn_mock(router).await;

        let client = MiddlewareClient::new(&base, "key", "").unwrap();
        client.delete_dashboard(42).await.unwrap();
    }

    #[tokio::test]
    async fn test_set_dashboard_favorite_path() {
        let router = Router::new().route(
            "/api/v1/builder/report/favourite/{id}/{flag}",
            get(|Path((id, flag)): Path<(i64, String)>| async move {
                assert_eq!(id, 7);
                assert_eq!(flag, "true");
                ""
            }),
        );
        let base = spawn_mock(router).await;

        let client = MiddlewareClient::new(&base, "key", "").unwrap();
        client.set_dashboard_favorite(7, true).await.unwrap();
    }

    #[tokio::test]
    async fn test_json_error_response_mapped() {
        let router = Router::new().route(
            "/api/v1/builder/report",
            get(|| async {
                (
                    axum::http::StatusCode::FORBIDDEN,
                    Json(json!({"error": "invalid api key", "success": false})),
                )
            }),
        );
        let base = spawn_mock(router).await;

        let client = MiddlewareClient::new(&base, "bad-key", "").unwrap();
        let err = client
            .get_dashboards(&GetDashboardsParams::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "API error (403): invalid api key");
    }

    #[tokio::test]
    async fn test_html_error_response_mapped() {
        let router = Router::new().route(
            "/api/v1/builder/resources",
            get(|| async {
                (
                    axum::http::StatusCode::NOT_FOUND,
                    "<html><body>Not Found</body></html>",
                )
            }),
        );
        let base = spawn_mock(router).await;

        let client = MiddlewareClient::new(&base, "key", "").unwrap();
        let err = client.get_resources().await.unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("API error (404): received HTML response"));
        assert!(message.contains("<html>"));
    }

    #[tokio::test]
    async fn test_html_body_on_success_status() {
        let router = Router::new().route(
            "/api/v1/builder/resources",
            get(|| async { "<!DOCTYPE html><html></html>" }),
        );
        let base = spawn_mock(router).await;

        let client = MiddlewareClient::new(&base, "key", "").unwrap();
        let err = client.get_resources().await.unwrap_err();
        assert!(matches!(err, ClientError::Html { .. }));
    }

    #[tokio::test]
    async fn test_incidents_issue_url_enrichment() {
        let router = Router::new().route(
            "/api/v1/ops-ai/incidents",
            get(|RawQuery(raw): RawQuery| async move {
                let raw = raw.unwrap_or_default();
                assert!(raw.contains("page=2"));
                assert!(raw.contains("status=all"));
                Json(json!({
                    "items": [
                        {"fingerprint": "fp-1", "title": "OOMKilled"},
                        {"title": "no fingerprint"}
                    ],
                    "total": 2
                }))
            }),
        );
        let base = spawn_mock(router).await;

        let client = MiddlewareClient::new(&base, "key", "").unwrap();
        let params = GetIncidentsParams {
            page: 2,
            status: "all".to_string(),
            ..Default::default()
        };
        let result = client.get_incidents(&params).await.unwrap();

        assert_eq!(
            result.items[0].issue_url,
            format!("{}/ops-ai?fingerprint=fp-1", base)
        );
        assert!(result.items[1].issue_url.is_empty());
        assert_eq!(result.extra["total"], json!(2));
    }

    #[tokio::test]
    async fn test_create_widget_posts_builder_payload() {
        let router = Router::new().route(
            "/api/v1/builder/widget",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["builderId"], json!(-1));
                assert_eq!(body["label"], json!("CPU"));
                Json(json!({"id": 101, "label": "CPU"}))
            }),
        );
        let base = spawn_mock(router).await;

        let client = MiddlewareClient::new(&base, "key", "").unwrap();
        let widget = CustomWidget {
            builder_id: Some(-1),
            label: Some("CPU".to_string()),
            ..Default::default()
        };
        let created = client.create_widget(&widget).await.unwrap();
        assert_eq!(created.id, Some(101));
    }

    #[tokio::test]
    async fn test_alerts_path_includes_rule_id() {
        let router = Router::new().route(
            "/api/v1/rules/{rule_id}/alerts",
            get(|Path(rule_id): Path<i64>| async move {
                assert_eq!(rule_id, 55);
                Json(json!({
                    "alerts": [],
                    "columns": [],
                    "latest_status": 0,
                    "latest_triggered_at": ""
                }))
            }),
        );
        let base = spawn_mock(router).await;

        let client = MiddlewareClient::new(&base, "key", "").unwrap();
        client
            .get_alerts(55, &GetAlertsParams::default())
            .await
            .unwrap();
    }
}
