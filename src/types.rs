//! Middleware APIのワイヤ型定義
//!
//! アップストリームのJSONスキーマをそのまま写した構造体群。
//! 省略可能なフィールドは`Option` + `skip_serializing_if`で表現し、
//! レスポンス側は`#[serde(default)]`で欠損フィールドを許容する。

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// with句のキー: グループ化指定
pub const WITH_KEY_SELECT_DATA_BY: &str = "SELECT_DATA_BY";
/// with句のキー: 属性フィルタ指定
pub const WITH_KEY_ATTRIBUTE_FILTER: &str = "ATTRIBUTE_FILTER";

fn is_zero(n: &i64) -> bool {
    *n == 0
}

// ---------------------------------------------------------------------------
// ダッシュボード（レポート）
// ---------------------------------------------------------------------------

/// ダッシュボード（アップストリームでは report と呼ばれる）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_scope: Option<String>,
    pub visibility: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<ReportUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportUser {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportListResponse {
    pub reports: Vec<Report>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// ダッシュボードの作成・更新リクエスト
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpsertReportRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_scope: Option<String>,
    pub visibility: String,
    #[serde(rename = "metaData", skip_serializing_if = "Option::is_none")]
    pub meta_data: Option<Value>,
}

// ---------------------------------------------------------------------------
// ウィジェット
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Widget {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<WidgetScope>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widget_app_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetScope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builder_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// ビルダーAPIへ送るウィジェット本体（作成・更新・データ取得で共用）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomWidget {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builder_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builder_config: Option<Vec<BuilderConfigItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builder_meta_data: Option<WidgetMetaData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builder_view_options: Option<BuilderViewOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Vec<RequestParam>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widget_app_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_clone: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formulas: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dont_refresh_data: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_v2: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_old_data: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_only_formula_result: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetMetaData {
    #[serde(rename = "chartType", skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<String>,
    #[serde(rename = "colorScheme", skip_serializing_if = "Option::is_none")]
    pub color_scheme: Option<String>,
    #[serde(rename = "default_key", skip_serializing_if = "Option::is_none")]
    pub default_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "display_preference", skip_serializing_if = "Option::is_none")]
    pub display_preference: Option<String>,
    // アップストリーム側のタイポをそのまま踏襲
    #[serde(rename = "expanedLegendColumns", skip_serializing_if = "Option::is_none")]
    pub expanded_legend_columns: Option<Vec<String>>,
    #[serde(rename = "group_name", skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(rename = "group_order", skip_serializing_if = "Option::is_none")]
    pub group_order: Option<i64>,
    #[serde(rename = "is_default", skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
    #[serde(rename = "legendType", skip_serializing_if = "Option::is_none")]
    pub legend_type: Option<String>,
    #[serde(rename = "lineStroke", skip_serializing_if = "Option::is_none")]
    pub line_stroke: Option<String>,
    #[serde(rename = "lineStyle", skip_serializing_if = "Option::is_none")]
    pub line_style: Option<String>,
    #[serde(rename = "yAxisAlwaysIncludeZero", skip_serializing_if = "Option::is_none")]
    pub y_axis_always_include_zero: Option<bool>,
    #[serde(rename = "yAxisMax", skip_serializing_if = "Option::is_none")]
    pub y_axis_max: Option<i64>,
    #[serde(rename = "yAxisMin", skip_serializing_if = "Option::is_none")]
    pub y_axis_min: Option<i64>,
    #[serde(rename = "yAxisType", skip_serializing_if = "Option::is_none")]
    pub y_axis_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuilderViewOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_user_edit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ReportView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_description: Option<String>,
    #[serde(rename = "metadata", skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceRef {
    pub name: String,
}

/// グリッドレイアウト項目。ゼロ値のフィールドは送信しない（アップストリームのomitempty相当）。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutItem {
    #[serde(skip_serializing_if = "is_zero")]
    pub x: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub y: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub w: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub h: i64,
    #[serde(rename = "_scope_id", skip_serializing_if = "is_zero")]
    pub scope_id: i64,
    #[serde(rename = "resizeHandles", skip_serializing_if = "Option::is_none")]
    pub resize_handles: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestParam {
    pub key: String,
    pub value: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutRequest {
    pub layouts: Vec<LayoutItem>,
}

// ---------------------------------------------------------------------------
// ビルダー設定（ウィジェットのクエリ定義）
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfigItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub with: Option<Vec<BuilderConfigWith>>,
    pub columns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<BuilderConfigSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_data: Option<BuilderConfigMetaData>,
    #[serde(rename = "metricMetadata", skip_serializing_if = "Option::is_none")]
    pub metric_metadata: Option<MetricMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuilderConfigWith {
    pub key: String,
    pub value: Value,
    #[serde(rename = "isArg")]
    pub is_arg: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfigSource {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfigMetaData {
    #[serde(rename = "metricTypes", skip_serializing_if = "Option::is_none")]
    pub metric_types: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

// ---------------------------------------------------------------------------
// ウィジェットデータ
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderDataResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_data_v2: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_available_metrics: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_desc: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeRange {
    pub from_ts: i64,
    pub to_ts: i64,
    pub interval: i64,
}

// ---------------------------------------------------------------------------
// メトリクス
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsV2Request {
    pub data_type: String,
    pub widget_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kpi_type: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kpi_types: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_metrics: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mandatory_metrics: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_filters: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mandatory_filters: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_types: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_only_mandatory_data: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsV2Response {
    pub items: Vec<serde_json::Map<String, Value>>,
    pub page: i64,
    pub limit: i64,
}

// ---------------------------------------------------------------------------
// アラート
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Alert {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub rule_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executor_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_uid: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub status: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<HashMap<String, String>>,
    #[serde(rename = "attributesb", skip_serializing_if = "Option::is_none")]
    pub attributes_b: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub triggered_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewAlert {
    pub rule_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executor_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_uid: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub status: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub triggered_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsResponse {
    pub alerts: Vec<ViewModelAlert>,
    pub columns: Vec<AlertColumn>,
    pub latest_status: i64,
    pub latest_triggered_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewModelAlert {
    pub id: i64,
    pub executor_id: i64,
    pub title: String,
    pub message: String,
    pub status: i64,
    pub value: f64,
    pub threshold: f64,
    pub operator: String,
    pub unit: String,
    pub attributes: HashMap<String, String>,
    pub total_count: i64,
    pub triggered_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertColumn {
    pub key: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsResponse {
    pub count_by_status: Vec<CountBy>,
    pub count_by_title: Vec<CountBy>,
    pub timeseries_by_title: Vec<CountBy>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CountBy {
    pub name: String,
    pub status: i64,
    pub value: f64,
    pub timestamp: String,
}

// ---------------------------------------------------------------------------
// 汎用クエリ
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryRequest {
    pub queries: Vec<Query>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    pub chart_type: String,
    pub columns: Vec<String>,
    pub resources: Vec<String>,
    pub time_range: QueryTimeRange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<serde_json::Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_by: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryTimeRange {
    pub from: i64,
    pub to: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryResponse {
    pub query_results: Vec<QueryResult>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryResult {
    pub query_data: QueryData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryData {
    pub columns: Vec<QueryColumn>,
    pub data: Vec<serde_json::Map<String, Value>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryColumn {
    pub accessor: String,
    pub order: i64,
    pub sort: String,
    #[serde(rename = "isMetric")]
    pub is_metric: bool,
}

// ---------------------------------------------------------------------------
// インシデント（エラー）
// ---------------------------------------------------------------------------

/// インシデント。アップストリームのレスポンスは開いたスキーマなので
/// 既知フィールド以外は`extra`にそのまま保持する。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Incident {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub fingerprint: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub issue_url: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IncidentsResponse {
    pub items: Vec<Incident>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_layout_item_omits_zero_fields() {
        let layout = LayoutItem {
            x: 0,
            y: 0,
            w: 4,
            h: 6,
            ..Default::default()
        };
        let value = serde_json::to_value(&layout).unwrap();
        assert_eq!(value, json!({"w": 4, "h": 6}));
    }

    #[test]
    fn test_layout_item_scope_id_key() {
        let layout = LayoutItem {
            x: 2,
            y: 3,
            w: 8,
            h: 6,
            scope_id: 42,
            ..Default::default()
        };
        let value = serde_json::to_value(&layout).unwrap();
        assert_eq!(value["_scope_id"], json!(42));
        assert_eq!(value["x"], json!(2));
    }

    #[test]
    fn test_custom_widget_camel_case_keys() {
        let widget = CustomWidget {
            builder_id: Some(-1),
            label: Some("CPU".to_string()),
            widget_app_id: Some(1),
            scope_id: Some(-1),
            is_clone: Some(false),
            category: Some("Metrics".to_string()),
            formulas: Some(vec![]),
            dont_refresh_data: Some(false),
            ..Default::default()
        };
        let value = serde_json::to_value(&widget).unwrap();
        assert_eq!(value["builderId"], json!(-1));
        assert_eq!(value["widgetAppId"], json!(1));
        assert_eq!(value["scopeId"], json!(-1));
        assert_eq!(value["isClone"], json!(false));
        assert_eq!(value["dontRefreshData"], json!(false));
        assert_eq!(value["formulas"], json!([]));
    }

    #[test]
    fn test_builder_config_with_is_arg_key() {
        let with = BuilderConfigWith {
            key: WITH_KEY_SELECT_DATA_BY.to_string(),
            value: json!(["host.id"]),
            is_arg: true,
        };
        let value = serde_json::to_value(&with).unwrap();
        assert_eq!(
            value,
            json!({"key": "SELECT_DATA_BY", "value": ["host.id"], "isArg": true})
        );
    }

    #[test]
    fn test_report_list_response_lenient_decode() {
        let response: ReportListResponse = serde_json::from_value(json!({
            "reports": [{"label": "Overview", "visibility": "public"}]
        }))
        .unwrap();
        assert_eq!(response.reports.len(), 1);
        assert_eq!(response.total, 0);
    }

    #[test]
    fn test_incident_preserves_unknown_fields() {
        let incident: Incident = serde_json::from_value(json!({
            "fingerprint": "abc123",
            "title": "OOMKilled",
            "count": 7
        }))
        .unwrap();
        assert_eq!(incident.fingerprint, "abc123");
        assert_eq!(incident.extra["title"], json!("OOMKilled"));

        let back = serde_json::to_value(&incident).unwrap();
        assert_eq!(back["count"], json!(7));
        assert!(back.get("issue_url").is_none());
    }

    #[test]
    fn test_upsert_report_meta_data_key() {
        let req = UpsertReportRequest {
            label: "Team".to_string(),
            visibility: "private".to_string(),
            meta_data: Some(json!({"a": 1})),
            ..Default::default()
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["metaData"], json!({"a": 1}));
        assert!(value.get("meta_data").is_none());
    }
}
