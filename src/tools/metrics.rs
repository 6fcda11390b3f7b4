//! メトリクス探索・汎用クエリツール

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

use crate::builder::{transform_columns, ColumnConfig};
use crate::client::MiddlewareClient;
use crate::tool::{parse_input, Tool, ToolError, ToolResult};
use crate::types::{MetricsV2Request, Query, QueryRequest, QueryTimeRange};

fn none_if_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

// ---------------------------------------------------------------------------
// get_metrics
// ---------------------------------------------------------------------------

pub struct GetMetricsTool {
    client: Arc<MiddlewareClient>,
}

impl GetMetricsTool {
    pub fn new(client: Arc<MiddlewareClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct GetMetricsInput {
    data_type: String,
    widget_type: String,
    #[serde(default)]
    resources: Vec<String>,
    #[serde(default)]
    metric: String,
    #[serde(default)]
    page: i64,
    #[serde(default)]
    limit: i64,
    #[serde(default)]
    search: String,
}

#[async_trait]
impl Tool for GetMetricsTool {
    fn name(&self) -> &str {
        "get_metrics"
    }

    fn description(&self) -> &str {
        "Get a list of available metrics, filters, or groupby tags for building monitoring queries.\n\nThis tool is essential for discovering the metadata needed to construct accurate queries. Since every metric supports different filters and grouping dimensions (groupby tags), you must use this tool to validate what is available for each specific metric before querying data.\n\nDiscovery Workflow:\n1. First, identify available resources using the 'get_resources' tool.\n2. Find available metrics for a resource: Use data_type='metrics' with the 'resources' parameter.\n3. Explore dimensions for a specific metric:\n   - To find how you can group data: Use data_type='groupby' AND provide the specific 'metric' name.\n   - To find how you can filter data: Use data_type='filters' (optionally with 'resources').\n\nIMPORTANT - Metric-Specific Metadata:\n- Filters and GroupBy tags are NOT universal. They vary by metric.\n- ALWAYS check 'groupby' options for a specific metric before trying to aggregate by a dimension.\n- ALWAYS check 'filters' to see what dimensions are available for narrowing down your search.\n\nData Type Options:\n- 'metrics': List metric names (requires 'resources').\n- 'filters': List filter dimensions.\n- 'groupby': List grouping tags (requires 'metric').\n\nResource Selection:\n- Use exact resource names returned by 'get_resources'."
    }

    fn input_schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "data_type": {
                    "type": "string",
                    "enum": ["metrics", "filters", "groupby"],
                    "description": "Type of data to fetch. DataType is the type of data that is being fetched. Must be one of: 'metrics' (metric names), 'filters' (filter dimensions), 'groupby' (grouping tags)"
                },
                "widget_type": {
                    "type": "string",
                    "enum": ["timeseries", "list", "queryValue"],
                    "description": "Widget type for the query. Must be one of: 'timeseries' (for timeseries, bar, stackbar, area), 'list' (for table, pie, scatter, tree, toplist, hexagon), or 'queryValue' (for queryvalue)"
                },
                "resources": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Array of resource type names obtained from calling get_resources. Use this for multi-resource queries. IMPORTANT: You can ONLY use resource type names that are returned by the get_resources tool. You must first call get_resources to discover available resources, then use only those exact resource type names here. Each resource name should be the exact resource type name returned by get_resources (e.g., ['host', 'container', 'trace'])."
                },
                "metric": {
                    "type": "string",
                    "description": "Specific metric name. IMPORTANT: This field is REQUIRED when data_type is 'groupby'. When fetching groupby tags, you must specify which metric you want to group by to get the available grouping dimensions for that specific metric."
                },
                "page": {
                    "type": "integer",
                    "description": "Page number for paginated results (default: 1)"
                },
                "limit": {
                    "type": "integer",
                    "description": "Number of items per page (default: 100, max: varies by data type)"
                },
                "search": {
                    "type": "string",
                    "description": "Search term to filter metrics or resources by name (case-insensitive substring match)"
                }
            },
            "required": ["data_type", "widget_type", "resources"]
        })
    }

    async fn execute(&self, params: JsonValue) -> Result<ToolResult, ToolError> {
        let input: GetMetricsInput = parse_input(params)?;

        let req = MetricsV2Request {
            data_type: input.data_type,
            widget_type: input.widget_type,
            resources: if input.resources.is_empty() {
                None
            } else {
                Some(input.resources)
            },
            metric: none_if_empty(input.metric),
            page: (input.page != 0).then_some(input.page),
            limit: (input.limit != 0).then_some(input.limit),
            search: none_if_empty(input.search),
            ..Default::default()
        };

        let result = self.client.get_metrics(&req).await?;
        ToolResult::json(&result)
    }
}

// ---------------------------------------------------------------------------
// get_resources
// ---------------------------------------------------------------------------

pub struct GetResourcesTool {
    client: Arc<MiddlewareClient>,
}

impl GetResourcesTool {
    pub fn new(client: Arc<MiddlewareClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for GetResourcesTool {
    fn name(&self) -> &str {
        "get_resources"
    }

    fn description(&self) -> &str {
        "Get a list of all available resource types in your Middleware.io environment.\n\nThis tool returns all resource types that have data in your monitoring environment. Resources represent the entities you're monitoring (e.g., hosts, containers, databases, services, processes). Use this to discover what resource types are available before querying metrics for specific resources.\n\nExample resources: host, container, pod, service, database, redis, mongodb, postgresql, mysql, nginx, etc."
    }

    fn input_schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _params: JsonValue) -> Result<ToolResult, ToolError> {
        let result = self.client.get_resources().await?;
        ToolResult::json(&json!({"resources": result}))
    }
}

// ---------------------------------------------------------------------------
// query
// ---------------------------------------------------------------------------

pub struct QueryTool {
    client: Arc<MiddlewareClient>,
}

impl QueryTool {
    pub fn new(client: Arc<MiddlewareClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct QueryInput {
    queries: Vec<QueryInputItem>,
}

#[derive(Debug, Deserialize)]
struct QueryInputItem {
    #[serde(rename = "chartType")]
    chart_type: String,
    columns: Vec<ColumnConfig>,
    resources: Vec<String>,
    #[serde(rename = "timeRange")]
    time_range: QueryTimeRangeInput,
    #[serde(default)]
    filters: Option<serde_json::Map<String, JsonValue>>,
    #[serde(rename = "groupBy", default)]
    group_by: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct QueryTimeRangeInput {
    from: i64,
    to: i64,
}

#[async_trait]
impl Tool for QueryTool {
    fn name(&self) -> &str {
        "query"
    }

    fn description(&self) -> &str {
        "Execute a flexible query to retrieve logs, metrics, traces, and other data from Middleware.io.\n\nThis is a powerful tool that allows you to query any type of data from Middleware including logs, metrics, traces, and resource information. You can filter by resource types, time ranges, apply filters, and group results. This tool provides comprehensive access to all your monitoring data.\n\nIMPORTANT - Resource Selection:\n- For logs: Always use [\"log\"] as the resource (no need to check get_resources first)\n- For metrics, traces, or other data types: FIRST use the get_resources tool to discover available resource types in your environment, THEN use those specific resource types in this query tool\n\nWorkflow for non-log queries:\n1. Call get_resources tool to get list of available resources (e.g., [\"host\", \"container\", \"service\", \"trace\", \"k8s.pod\", etc.])\n2. Use the discovered resource types in this query tool's resources parameter\n\nUse cases:\n- Query logs from containers, hosts, or services (use resource: [\"log\"])\n- Retrieve metrics for specific resources (first get resources, then use: [\"host\"], [\"container\"], [\"service\"], etc.)\n- Get trace data for distributed systems (first get resources, then use: [\"trace\"], [\"trace.service\"], etc.)\n- Filter data by any resource attribute\n- Group results by dimensions for aggregation\n- Query multiple data types in a single request"
    }

    fn input_schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "queries": {
                    "type": "array",
                    "description": "Array of query objects to execute. Each query can target different resources and data types",
                    "items": {
                        "type": "object",
                        "properties": {
                            "chartType": {
                                "type": "string",
                                "enum": [
                                    "time_series_chart", "bar_chart", "pie_chart",
                                    "scatter_plot", "data_table", "count_chart",
                                    "tree_chart", "top_list_chart", "heatmap_chart",
                                    "hexagon_chart", "query_value"
                                ],
                                "description": "Type of chart/visualization. Must be one of the supported chart type keys (same as create_widget widget_type)"
                            },
                            "columns": {
                                "type": "array",
                                "description": "Array of column configs: each has 'name' (metric/attribute name, e.g. 'body', 'timestamp', 'k8s.node.cpu.utilization') and optional 'aggregation_method' (avg, sum, min, max, uniq, count, group) and 'rollup_method' (avg, sum, min, max, none). For logs use name only (e.g. body, timestamp, level). Same format as create_widget columns.",
                                "items": {
                                    "type": "object",
                                    "properties": {
                                        "name": {"type": "string"},
                                        "aggregation_method": {
                                            "type": "string",
                                            "enum": ["avg", "sum", "min", "max", "any", "uniq", "count", "group"]
                                        },
                                        "rollup_method": {
                                            "type": "string",
                                            "enum": ["avg", "sum", "min", "max", "any", "uniq", "count", "group", "none"]
                                        }
                                    },
                                    "required": ["name"]
                                }
                            },
                            "resources": {
                                "type": "array",
                                "items": {"type": "string"},
                                "description": "Array of resource types to query. IMPORTANT: For logs, always use ['log']. For other data types (metrics, traces, etc.), FIRST use get_resources tool to discover available resources, THEN use those resource types here. Examples: ['log'] for logs, ['container'] for container data (discovered via get_resources), ['host'] for host data, ['trace'] for traces, ['k8s.pod'] for Kubernetes pods"
                            },
                            "timeRange": {
                                "type": "object",
                                "description": "Time range for the query with from and to timestamps in milliseconds",
                                "properties": {
                                    "from": {
                                        "type": "integer",
                                        "description": "Start timestamp in milliseconds (Unix timestamp * 1000)"
                                    },
                                    "to": {
                                        "type": "integer",
                                        "description": "End timestamp in milliseconds (Unix timestamp * 1000)"
                                    }
                                },
                                "required": ["from", "to"]
                            },
                            "filters": {
                                "type": "object",
                                "description": "Optional filters to apply. Format: {\"field.name\": {\"=\": \"value\"}} or {\"field.name\": {\"!=\": \"value\"}}"
                            },
                            "groupBy": {
                                "type": "array",
                                "items": {"type": "string"},
                                "description": "Optional array of field names to group results by (e.g., ['container.id', 'service.name'])"
                            }
                        },
                        "required": ["chartType", "columns", "resources", "timeRange"]
                    }
                }
            },
            "required": ["queries"]
        })
    }

    async fn execute(&self, params: JsonValue) -> Result<ToolResult, ToolError> {
        let input: QueryInput = parse_input(params)?;

        let queries = input
            .queries
            .into_iter()
            .map(|q| Query {
                chart_type: q.chart_type,
                columns: transform_columns(&q.columns),
                resources: q.resources,
                time_range: QueryTimeRange {
                    from: q.time_range.from,
                    to: q.time_range.to,
                },
                filters: q.filters,
                group_by: q.group_by,
            })
            .collect();

        let result = self.client.query(&QueryRequest { queries }).await?;
        ToolResult::json(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_input_transforms_columns() {
        let input: QueryInput = serde_json::from_value(json!({
            "queries": [{
                "chartType": "data_table",
                "columns": [
                    {"name": "body"},
                    {"name": "timestamp"},
                    {"name": "level", "aggregation_method": "count", "rollup_method": "sum"}
                ],
                "resources": ["log"],
                "timeRange": {"from": 1700000000000i64, "to": 1700003600000i64},
                "groupBy": ["service.name"]
            }]
        }))
        .unwrap();

        let item = &input.queries[0];
        assert_eq!(item.chart_type, "data_table");
        assert_eq!(
            transform_columns(&item.columns),
            vec!["body", "timestamp", "count(level, value(sum))"]
        );
        assert_eq!(item.group_by.as_ref().unwrap(), &vec!["service.name"]);
    }

    #[test]
    fn test_get_metrics_input_defaults() {
        let input: GetMetricsInput = serde_json::from_value(json!({
            "data_type": "groupby",
            "widget_type": "timeseries",
            "metric": "k8s.node.cpu.utilization"
        }))
        .unwrap();

        assert_eq!(input.data_type, "groupby");
        assert!(input.resources.is_empty());
        assert_eq!(input.page, 0);
    }

    #[test]
    fn test_status_enums_in_schemas() {
        let client =
            Arc::new(MiddlewareClient::new("https://demo.middleware.io", "key", "").unwrap());

        let schema = GetMetricsTool::new(client.clone()).input_schema();
        assert_eq!(
            schema["properties"]["data_type"]["enum"],
            json!(["metrics", "filters", "groupby"])
        );
        assert_eq!(
            schema["properties"]["widget_type"]["enum"],
            json!(["timeseries", "list", "queryValue"])
        );

        let schema = QueryTool::new(client).input_schema();
        let chart_types = schema["properties"]["queries"]["items"]["properties"]["chartType"]
            ["enum"]
            .as_array()
            .unwrap();
        assert_eq!(chart_types.len(), 11);
    }
}
