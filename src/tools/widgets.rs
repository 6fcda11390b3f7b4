//! ウィジェット操作ツール
//!
//! ウィジェット本体の組み立ては純粋関数に分離してある。
//! カラム式・キー生成・レイアウト正規化の規則は`builder`モジュール参照。

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

use crate::builder::{
    build_config, generate_widget_key, normalize_layout, widget_app_id, BuilderConfigItemInput,
    LayoutItemInput,
};
use crate::client::{GetWidgetsParams, MiddlewareClient};
use crate::tool::{parse_input, Tool, ToolError, ToolResult};
use crate::types::{BuilderViewOptions, CustomWidget, LayoutRequest, ReportView};

const CHART_TYPES: [&str; 11] = [
    "time_series_chart",
    "bar_chart",
    "data_table",
    "query_value",
    "pie_chart",
    "scatter_plot",
    "count_chart",
    "tree_chart",
    "top_list_chart",
    "heatmap_chart",
    "hexagon_chart",
];

/// builderConfig項目のスキーマ（create/update/データ取得で共通）
fn builder_config_schema(description: &str) -> JsonValue {
    json!({
        "type": "array",
        "description": description,
        "items": {
            "type": "object",
            "properties": {
                "columns": {
                    "type": "array",
                    "description": "Array of column configurations, each specifying metric/attribute name and its aggregation/rollup methods. Each column can have different aggregation and rollup settings.",
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": {
                                "type": "string",
                                "description": "The metric or metric attribute name (e.g., 'k8s.node.cpu.utilization', 'host.memory.usage')"
                            },
                            "aggregation_method": {
                                "type": "string",
                                "enum": ["avg", "sum", "min", "max", "any", "uniq", "count", "group"],
                                "description": "Aggregation method to apply to this column. Supported values: avg, sum, min, max, any (default), uniq, count, group. If empty or 'any', no aggregation is applied."
                            },
                            "rollup_method": {
                                "type": "string",
                                "enum": ["avg", "sum", "min", "max", "any", "uniq", "count", "group", "none"],
                                "description": "Rollup method to apply to this column. Supported values: avg, sum, min, max, any (default), uniq, count, group, none. If empty, 'none', or 'any', no rollup is applied."
                            }
                        },
                        "required": ["name"]
                    }
                },
                "source": {
                    "type": "object",
                    "description": "Data source configuration with name, alias, and dataset_id. IMPORTANT: The source.name field MUST be a resource type that is supported by Middleware and returned by the get_resources tool. You MUST first call the get_resources tool to discover available resource types, then use only those exact resource type names here. Do not use arbitrary or guessed resource names. Examples (if returned by get_resources): 'host', 'container', 'log', 'trace', 'k8s.pod', 'database', 'service', etc. The source.name identifies which resource type the widget will query data from.",
                    "properties": {
                        "name": {"type": "string"},
                        "alias": {"type": "string"},
                        "dataset_id": {"type": "integer"}
                    },
                    "required": ["name"]
                },
                "id": {
                    "type": "string",
                    "description": "Unique identifier for this config item (UUID format)"
                },
                "meta_data": {
                    "type": "object",
                    "description": "Metadata containing metricTypes mapping"
                },
                "metricMetadata": {
                    "type": "object",
                    "description": "Map of metric names to their metadata. Each key is a metric name (e.g., \"k8s.node.cpu.utilization_percent\") and value is the metadata object with name, label, resource, type, attributes, and config"
                },
                "key": {
                    "type": "string",
                    "description": "Key identifier for this config item"
                },
                "group_by": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Array of attribute names to group by (e.g., [\"host.cpu.model.id\"]). This will be converted to SELECT_DATA_BY in the 'with' array"
                },
                "filter_with": {
                    "type": "object",
                    "description": "Filter conditions object with 'and' or 'or' arrays (e.g., {\"and\": [{\"host.id\": {\"=\": \"ai-team2\"}}, {\"host.name\": {\"LIKE\": \"%ai%\"}}]}). This will be converted to ATTRIBUTE_FILTER in the 'with' array"
                }
            },
            "required": ["columns"]
        }
    })
}

fn layout_schema() -> JsonValue {
    json!({
        "type": "object",
        "description": "Layout for the widget including coordinates and size. Based on the widget type, you MUST set proper layout. Width (w) must be minimum 4 (strict minimum requirement) and height (h) must be minimum 6 (strict minimum requirement)",
        "properties": {
            "x": {
                "type": "integer",
                "description": "Horizontal position in the grid (0-based index from left)"
            },
            "y": {
                "type": "integer",
                "description": "Vertical position in the grid (0-based index from top)"
            },
            "w": {
                "type": "integer",
                "description": "Width in grid units between 4 and 12 minimum size is 4"
            },
            "h": {
                "type": "integer",
                "description": "Height in grid units between 6 and 12 minimum size is 6"
            },
            "scope_id": {
                "type": "integer",
                "description": "The scope ID of the widget to update layout for"
            }
        },
        "required": ["x", "y", "w", "h"]
    })
}

fn none_if_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// レポート指定があればBuilderViewOptionsを構築する
fn build_view_options(
    report_id: i64,
    report_key: &str,
    report_name: &str,
    report_description: &str,
    report_metadata: Option<JsonValue>,
    disable_user_edit: bool,
) -> Option<BuilderViewOptions> {
    if report_id <= 0 && report_key.is_empty() && report_name.is_empty() {
        return None;
    }

    Some(BuilderViewOptions {
        disable_user_edit: Some(disable_user_edit),
        report: Some(ReportView {
            report_id: (report_id > 0).then_some(report_id),
            report_key: none_if_empty(report_key.to_string()),
            report_name: none_if_empty(report_name.to_string()),
            report_description: none_if_empty(report_description.to_string()),
            metadata: report_metadata,
        }),
        ..Default::default()
    })
}

// ---------------------------------------------------------------------------
// list_widgets
// ---------------------------------------------------------------------------

pub struct ListWidgetsTool {
    client: Arc<MiddlewareClient>,
}

impl ListWidgetsTool {
    pub fn new(client: Arc<MiddlewareClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct ListWidgetsInput {
    #[serde(default)]
    report_id: i64,
    #[serde(default)]
    display_scope: String,
    #[serde(default)]
    #[allow(dead_code)]
    message: String,
}

#[async_trait]
impl Tool for ListWidgetsTool {
    fn name(&self) -> &str {
        "list_widgets"
    }

    fn description(&self) -> &str {
        "Get a list of widgets associated with a specific dashboard or display scope.\n\nThis tool retrieves all widgets (charts, graphs, tables) that belong to a dashboard or scope. Widgets are the building blocks of dashboards - each widget represents a visualization of your monitoring data. Use this to discover what widgets are available in a dashboard or to inspect widget configurations."
    }

    fn input_schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "report_id": {
                    "type": "integer",
                    "description": "The numeric ID of the dashboard (report) to filter widgets by"
                },
                "display_scope": {
                    "type": "string",
                    "description": "The display scope to filter widgets by (e.g., 'infrastructure', 'apm', 'logs')"
                },
                "message": {
                    "type": "string",
                    "description": "Message to know which widgets are being listed. Length should be less than 100 characters."
                }
            },
            "required": ["message"]
        })
    }

    async fn execute(&self, params: JsonValue) -> Result<ToolResult, ToolError> {
        let input: ListWidgetsInput = parse_input(params)?;

        let params = GetWidgetsParams {
            report_id: input.report_id,
            display_scope: input.display_scope,
        };

        let result = self.client.get_widgets(&params).await?;
        ToolResult::json(&result)
    }
}

// ---------------------------------------------------------------------------
// create_widget
// ---------------------------------------------------------------------------

pub struct CreateWidgetTool {
    client: Arc<MiddlewareClient>,
}

impl CreateWidgetTool {
    pub fn new(client: Arc<MiddlewareClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Default, Deserialize)]
struct CreateWidgetInput {
    label: String,
    widget_type: String,
    #[serde(default)]
    key: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "builderConfig", default)]
    builder_config: Vec<BuilderConfigItemInput>,
    #[serde(default)]
    report_id: i64,
    #[serde(default)]
    report_key: String,
    #[serde(default)]
    report_name: String,
    #[serde(default)]
    report_description: String,
    #[serde(default)]
    report_metadata: Option<JsonValue>,
    #[serde(default)]
    disable_user_edit: bool,
    #[serde(default)]
    layout: Option<LayoutItemInput>,
}

/// create_widget入力からアップストリームへ送るウィジェットを組み立てる
fn assemble_create_widget(input: CreateWidgetInput) -> CustomWidget {
    let widget_key = if input.key.is_empty() {
        generate_widget_key(&input.label)
    } else {
        input.key
    };

    let view_options = build_view_options(
        input.report_id,
        &input.report_key,
        &input.report_name,
        &input.report_description,
        input.report_metadata,
        input.disable_user_edit,
    );

    CustomWidget {
        label: Some(input.label),
        key: Some(widget_key),
        description: none_if_empty(input.description),
        builder_config: Some(build_config(&input.builder_config)),
        builder_view_options: view_options,
        widget_app_id: Some(widget_app_id(&input.widget_type)),
        layout: Some(normalize_layout(input.layout.as_ref())),
        // 固定の既定値（入力には出さない）
        builder_id: Some(-1),
        scope_id: Some(-1),
        is_clone: Some(false),
        category: Some("Metrics".to_string()),
        formulas: Some(vec![]),
        dont_refresh_data: Some(false),
        ..Default::default()
    }
}

#[async_trait]
impl Tool for CreateWidgetTool {
    fn name(&self) -> &str {
        "create_widget"
    }

    fn description(&self) -> &str {
        "Create a new widget or update an existing widget on a dashboard.\n\nThis tool allows you to add new visualizations (charts, graphs, tables) to dashboards or modify existing ones.\n\nCreation Workflow:\n1. Identify the Resource: Use 'get_resources' to find available resource types (e.g., 'host', 'container').\n2. Identify Metrics/Data: Use 'get_metrics' to find available metrics and dimensions for that resource. IMPORTANT: You MUST explore all edge cases! For each metric, explicitly check its supported 'filters' and 'groupby' tags using the get_metrics tool to ensure your widget query is valid and precise.\n3. Construct BuilderConfig: Create the widget configuration using the discovered resource and metrics.\n\nBuilderConfig Structure (Critical):\n- 'source.name': MUST be an exact resource type returned by 'get_resources' (e.g., 'host', 'container').\n- 'metricMetadata': Defines the specific metric to visualize.\n- 'columns': Array of column configuration objects. Each object MUST have 'name' (metric name) and can optionally have 'aggregation_method' (e.g., avg, sum, min, max, uniq, count, group) and 'rollup_method' (e.g., avg, sum, min, max, none). This replaces the old string array format.\n- 'group_by': (Optional) Dimensions to group data by (discovered via 'get_metrics' with data_type='groupby').\n- 'filter_with': (Optional) Conditions to filter data (discovered via 'get_metrics' with data_type='filters').\n\nIMPORTANT - Validation Rules:\n- Resource Validation: You CANNOT use arbitrary resource names. You MUST use the exact strings returned by 'get_resources'.\n- Dashboard ID: The 'report_id' is REQUIRED to place the widget on a specific dashboard.\n- Widget Type: Choose the appropriate visualization type (e.g., 'time_series_chart', 'bar_chart') based on the data.\n- Layout Requirements: Based on the widget type, you MUST set proper layout. Width (w) must be minimum 4 (this is a strict minimum requirement) and height (h) must be minimum 6 (this is a strict minimum requirement). The layout dimensions should be appropriate for the widget type to ensure proper visualization.\n\nUse this tool to build rich, data-driven dashboards by combining resources, metrics, and visualizations."
    }

    fn input_schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "label": {
                    "type": "string",
                    "description": "The display name for the widget (e.g., 'CPU Usage', 'Error Rate')"
                },
                "widget_type": {
                    "type": "string",
                    "enum": CHART_TYPES,
                    "description": "The type of chart/widget to create"
                },
                "key": {
                    "type": "string",
                    "description": "Optional unique key identifier for the widget"
                },
                "description": {
                    "type": "string",
                    "description": "Optional description explaining what the widget displays"
                },
                "builderConfig": builder_config_schema("Widget configuration array containing queries, chart type, display settings, and data sources. Each item should have: columns, source, id, meta_data, metricMetadata, key, group_by, and filter_with"),
                "report_id": {
                    "type": "integer",
                    "description": "The numeric ID of the dashboard ID (Report ID) where this widget will be created"
                },
                "report_key": {
                    "type": "string",
                    "description": "The unique key identifier of the dashboard (report) where this widget will be created"
                },
                "report_name": {
                    "type": "string",
                    "description": "The name of the dashboard (report) where this widget will be created"
                },
                "report_description": {
                    "type": "string",
                    "description": "Optional description of the dashboard (report)"
                },
                "report_metadata": {
                    "description": "Optional metadata for the dashboard (report)"
                },
                "disable_user_edit": {
                    "type": "boolean",
                    "description": "Whether to disable user editing of the widget (default: false)"
                },
                "layout": layout_schema()
            },
            "required": ["label", "widget_type", "builderConfig", "report_id", "layout"]
        })
    }

    async fn execute(&self, params: JsonValue) -> Result<ToolResult, ToolError> {
        let input: CreateWidgetInput = parse_input(params)?;
        let widget = assemble_create_widget(input);

        let result = self.client.create_widget(&widget).await?;
        ToolResult::json(&result)
    }
}

// ---------------------------------------------------------------------------
// update_widget
// ---------------------------------------------------------------------------

pub struct UpdateWidgetTool {
    client: Arc<MiddlewareClient>,
}

impl UpdateWidgetTool {
    pub fn new(client: Arc<MiddlewareClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Default, Deserialize)]
struct UpdateWidgetInput {
    #[serde(default)]
    builder_id: i64,
    #[serde(default)]
    label: String,
    #[serde(default)]
    widget_type: String,
    #[serde(default)]
    key: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "builderConfig", default)]
    builder_config: Vec<BuilderConfigItemInput>,
    #[serde(default)]
    report_id: i64,
    #[serde(default)]
    report_key: String,
    #[serde(default)]
    report_name: String,
    #[serde(default)]
    report_description: String,
    #[serde(default)]
    report_metadata: Option<JsonValue>,
    #[serde(default)]
    disable_user_edit: bool,
    #[serde(default)]
    layout: Option<LayoutItemInput>,
}

/// update_widget入力からウィジェットを組み立てる。builder_idが正でなければエラー。
fn assemble_update_widget(input: UpdateWidgetInput) -> Result<CustomWidget, ToolError> {
    if input.builder_id <= 0 {
        return Err(ToolError::ExecutionFailed(
            "builder_id is required for updating a widget".to_string(),
        ));
    }

    let widget_key = if input.key.is_empty() && !input.label.is_empty() {
        generate_widget_key(&input.label)
    } else {
        input.key
    };

    let view_options = build_view_options(
        input.report_id,
        &input.report_key,
        &input.report_name,
        &input.report_description,
        input.report_metadata,
        input.disable_user_edit,
    );

    let builder_config = if input.builder_config.is_empty() {
        None
    } else {
        Some(build_config(&input.builder_config))
    };

    Ok(CustomWidget {
        builder_id: Some(input.builder_id),
        label: none_if_empty(input.label),
        key: none_if_empty(widget_key),
        description: none_if_empty(input.description),
        builder_config,
        builder_view_options: view_options,
        widget_app_id: (!input.widget_type.is_empty())
            .then(|| widget_app_id(&input.widget_type)),
        layout: input
            .layout
            .as_ref()
            .map(|layout| normalize_layout(Some(layout))),
        ..Default::default()
    })
}

#[async_trait]
impl Tool for UpdateWidgetTool {
    fn name(&self) -> &str {
        "update_widget"
    }

    fn description(&self) -> &str {
        "Update an existing widget on a dashboard.\n\nThis tool allows you to modify existing visualizations (charts, graphs, tables) on dashboards. The builderConfig is an array of configuration objects, each containing queries, chart type, and visualization settings. Each builderConfig item should have: with (array), columns (array of column configuration objects, each with 'name', 'aggregation_method', and 'rollup_method'), source (object with name, alias, dataset_id), id (string UUID), meta_data (object with metricTypes), metricMetadata (object with attributes, config, label, name, resource, type), and key (string). You MUST provide the builder_id (widget ID) of the widget you want to update.\n\nIMPORTANT - Source Name (Resource Type):\n- The 'source.name' field in builderConfig MUST be a resource type that is supported by Middleware and returned by the get_resources tool\n- You MUST first call the get_resources tool to discover available resource types in your environment\n- You can ONLY use resource type names that are returned by the get_resources tool\n- Do not use arbitrary or guessed resource names - only use the exact resource type names returned by get_resources\n- Examples of valid source.name values (if returned by get_resources): 'host', 'container', 'log', 'trace', 'k8s.pod', 'database', 'service', etc.\n- The source.name identifies which resource type the widget will query data from, and it must match a resource type that Middleware supports and has data for\nIMPORTANT - Builder ID (Widget ID):\n- The builder_id field is REQUIRED for updating a widget.\n- The builder_id is the widget ID of the widget that needs to be updated.\n- This is the unique identifier of the widget you want to update.\n- You can get the builder_id (widget ID) from the list_widgets tool or from the widget creation response.\nIMPORTANT - Layout Requirements:\n- Based on the widget type, you MUST set proper layout. Width (w) must be minimum 4 (this is a strict minimum requirement) and height (h) must be minimum 6 (this is a strict minimum requirement). The layout dimensions should be appropriate for the widget type to ensure proper visualization."
    }

    fn input_schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "builder_id": {
                    "type": "integer",
                    "description": "The widget ID (builder ID) of the widget that needs to be updated"
                },
                "label": {
                    "type": "string",
                    "description": "The display name for the widget (e.g., 'CPU Usage', 'Error Rate')"
                },
                "widget_type": {
                    "type": "string",
                    "enum": CHART_TYPES,
                    "description": "The type of chart/widget"
                },
                "key": {
                    "type": "string",
                    "description": "Optional unique key identifier for the widget"
                },
                "description": {
                    "type": "string",
                    "description": "Optional description explaining what the widget displays"
                },
                "builderConfig": builder_config_schema("Widget configuration array containing queries, chart type, display settings, and data sources. Each item should have: columns, source, id, meta_data, metricMetadata, key, group_by, and filter_with"),
                "report_id": {
                    "type": "integer",
                    "description": "The numeric ID of the dashboard ID (Report ID) where this widget belongs"
                },
                "report_key": {
                    "type": "string",
                    "description": "The unique key identifier of the dashboard (report) where this widget belongs"
                },
                "report_name": {
                    "type": "string",
                    "description": "The name of the dashboard (report) where this widget belongs"
                },
                "report_description": {
                    "type": "string",
                    "description": "Optional description of the dashboard (report)"
                },
                "report_metadata": {
                    "description": "Optional metadata for the dashboard (report)"
                },
                "disable_user_edit": {
                    "type": "boolean",
                    "description": "Whether to disable user editing of the widget (default: false)"
                },
                "layout": layout_schema()
            },
            "required": ["builder_id", "layout"]
        })
    }

    async fn execute(&self, params: JsonValue) -> Result<ToolResult, ToolError> {
        let input: UpdateWidgetInput = parse_input(params)?;
        let widget = assemble_update_widget(input)?;

        let result = self.client.update_widget(&widget).await?;
        ToolResult::json(&result)
    }
}

// ---------------------------------------------------------------------------
// delete_widget
// ---------------------------------------------------------------------------

pub struct DeleteWidgetTool {
    client: Arc<MiddlewareClient>,
}

impl DeleteWidgetTool {
    pub fn new(client: Arc<MiddlewareClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct DeleteWidgetInput {
    builder_id: i64,
    #[serde(default)]
    #[allow(dead_code)]
    message: String,
    #[serde(default)]
    #[allow(dead_code)]
    widget_label: String,
}

#[async_trait]
impl Tool for DeleteWidgetTool {
    fn name(&self) -> &str {
        "delete_widget"
    }

    fn description(&self) -> &str {
        "Permanently delete a widget from a dashboard.\n\nThis tool removes a widget (chart, graph, table) from its dashboard. Warning: This action cannot be undone. The widget configuration and data will be permanently deleted."
    }

    fn input_schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "builder_id": {
                    "type": "integer",
                    "description": "The numeric builder ID of the widget to delete permanently"
                },
                "message": {
                    "type": "string",
                    "description": "Message to know which widget is being deleted."
                },
                "widget_label": {
                    "type": "string",
                    "description": "Label of the widget to delete."
                }
            },
            "required": ["builder_id"]
        })
    }

    async fn execute(&self, params: JsonValue) -> Result<ToolResult, ToolError> {
        let input: DeleteWidgetInput = parse_input(params)?;
        self.client.delete_widget(input.builder_id).await?;
        ToolResult::json(&json!({"success": true, "message": "Widget deleted successfully"}))
    }
}

// ---------------------------------------------------------------------------
// get_widget_data / get_multi_widget_data
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct WidgetDataRequest {
    #[serde(default)]
    builder_id: i64,
    #[serde(default)]
    key: String,
    #[serde(default)]
    label: String,
    #[serde(default)]
    builder_config: Vec<BuilderConfigItemInput>,
    #[serde(default)]
    use_v2: bool,
}

fn assemble_data_widget(req: WidgetDataRequest) -> CustomWidget {
    let builder_config = if req.builder_config.is_empty() {
        None
    } else {
        Some(build_config(&req.builder_config))
    };

    CustomWidget {
        builder_id: (req.builder_id != 0).then_some(req.builder_id),
        key: none_if_empty(req.key),
        label: none_if_empty(req.label),
        builder_config,
        use_v2: req.use_v2.then_some(true),
        ..Default::default()
    }
}

fn widget_data_request_schema() -> JsonValue {
    json!({
        "type": "object",
        "properties": {
            "builder_id": {
                "type": "integer",
                "description": "The numeric builder ID of the widget to fetch data for"
            },
            "key": {
                "type": "string",
                "description": "Alternative to builder_id: the unique key identifier of the widget"
            },
            "label": {
                "type": "string",
                "description": "Alternative to builder_id: the label of the widget"
            },
            "builder_config": builder_config_schema("Widget configuration array containing the query and data source settings. Each item's columns MUST be an object with name, aggregation_method, and rollup_method."),
            "use_v2": {
                "type": "boolean",
                "description": "Set to true to use the newer v2 data format (default: false)"
            }
        }
    })
}

pub struct GetWidgetDataTool {
    client: Arc<MiddlewareClient>,
}

impl GetWidgetDataTool {
    pub fn new(client: Arc<MiddlewareClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for GetWidgetDataTool {
    fn name(&self) -> &str {
        "get_widget_data"
    }

    fn description(&self) -> &str {
        "Fetch the actual data and metrics displayed by a specific widget.\n\nThis tool executes the widget's query and returns the visualization data (time series, metrics, logs, traces). Use this to get the current values shown in a widget, analyze trends, or export widget data. The data format depends on the widget type (timeseries, table, single value, etc.)."
    }

    fn input_schema(&self) -> JsonValue {
        widget_data_request_schema()
    }

    async fn execute(&self, params: JsonValue) -> Result<ToolResult, ToolError> {
        let input: WidgetDataRequest = parse_input(params)?;
        let widget = assemble_data_widget(input);

        let result = self.client.get_widget_data(&widget).await?;
        ToolResult::json(&result)
    }
}

pub struct GetMultiWidgetDataTool {
    client: Arc<MiddlewareClient>,
}

impl GetMultiWidgetDataTool {
    pub fn new(client: Arc<MiddlewareClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct GetMultiWidgetDataInput {
    widgets: Vec<WidgetDataRequest>,
}

#[async_trait]
impl Tool for GetMultiWidgetDataTool {
    fn name(&self) -> &str {
        "get_multi_widget_data"
    }

    fn description(&self) -> &str {
        "Fetch data for multiple widgets simultaneously in a single request.\n\nThis tool is optimized for loading data for multiple widgets at once, such as when refreshing an entire dashboard. It's more efficient than calling get_widget_data multiple times. Returns data for all requested widgets in a single response."
    }

    fn input_schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "widgets": {
                    "type": "array",
                    "description": "Array of widget specifications to fetch data for. Each widget can be identified by builder_id, key, or label",
                    "items": widget_data_request_schema()
                }
            },
            "required": ["widgets"]
        })
    }

    async fn execute(&self, params: JsonValue) -> Result<ToolResult, ToolError> {
        let input: GetMultiWidgetDataInput = parse_input(params)?;

        let widgets: Vec<CustomWidget> = input
            .widgets
            .into_iter()
            .map(assemble_data_widget)
            .collect();

        let result = self.client.get_multi_widget_data(&widgets).await?;
        ToolResult::json(&json!({"widgets": result}))
    }
}

// ---------------------------------------------------------------------------
// update_widget_layouts
// ---------------------------------------------------------------------------

pub struct UpdateWidgetLayoutsTool {
    client: Arc<MiddlewareClient>,
}

impl UpdateWidgetLayoutsTool {
    pub fn new(client: Arc<MiddlewareClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct UpdateWidgetLayoutsInput {
    layouts: Vec<LayoutItemInput>,
    #[serde(default)]
    #[allow(dead_code)]
    message: String,
    #[serde(default)]
    operation_message: String,
}

#[async_trait]
impl Tool for UpdateWidgetLayoutsTool {
    fn name(&self) -> &str {
        "update_widget_layouts"
    }

    fn description(&self) -> &str {
        "Update the position and size of widgets on a dashboard.\n\nThis tool modifies the layout (position, size) of multiple widgets on a dashboard. Use this to rearrange widgets, resize them, or optimize dashboard layout. The dashboard uses a grid system where x,y represent position and w,h represent size in grid units. IMPORTANT: Based on the widget type, you MUST set proper layout. Width (w) must be minimum 4 (this is a strict minimum requirement) and height (h) must be minimum 6 (this is a strict minimum requirement). The layout dimensions should be appropriate for the widget type to ensure proper visualization."
    }

    fn input_schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "layouts": {
                    "type": "array",
                    "description": "Array of layout specifications for each widget. Each item defines position and size in the dashboard grid. Based on the widget type, you MUST set proper layout. Width (w) must be minimum 4 (strict minimum requirement) and height (h) must be minimum 6 (strict minimum requirement)",
                    "items": layout_schema()
                },
                "message": {
                    "type": "string",
                    "description": "Message to know which widgets are being updated. Length should be less than 100 characters."
                },
                "operation_message": {
                    "type": "string",
                    "description": "Message to know the operation being completed. Example: 'Updating widget CPU Usage layouts successfully' Length should be less than 100 characters."
                }
            },
            "required": ["layouts", "message", "operation_message"]
        })
    }

    async fn execute(&self, params: JsonValue) -> Result<ToolResult, ToolError> {
        let input: UpdateWidgetLayoutsInput = parse_input(params)?;

        let layouts = input
            .layouts
            .iter()
            .map(|layout| normalize_layout(Some(layout)))
            .collect();

        self.client
            .update_widget_layouts(&LayoutRequest { layouts })
            .await?;

        ToolResult::json(&json!({"success": true, "message": input.operation_message}))
    }
}
