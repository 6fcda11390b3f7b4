//! アラート操作ツール

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::collections::HashMap;
use std::sync::Arc;

use crate::client::{GetAlertsParams, MiddlewareClient};
use crate::tool::{parse_input, Tool, ToolError, ToolResult};
use crate::types::NewAlert;

fn none_if_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

// ---------------------------------------------------------------------------
// list_alerts
// ---------------------------------------------------------------------------

pub struct ListAlertsTool {
    client: Arc<MiddlewareClient>,
}

impl ListAlertsTool {
    pub fn new(client: Arc<MiddlewareClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct ListAlertsInput {
    rule_id: i64,
    #[serde(default)]
    page: i64,
    #[serde(default)]
    order_by: String,
}

#[async_trait]
impl Tool for ListAlertsTool {
    fn name(&self) -> &str {
        "list_alerts"
    }

    fn description(&self) -> &str {
        "Get a list of triggered alerts for a specific alert rule with pagination and sorting.\nThis tool retrieves all alert instances that have been triggered for a specific alert rule. Each alert instance represents a time when the alert condition was met. Use this to review alert history, analyze alert patterns, or investigate recent incidents. Results can be paginated and ordered by various fields."
    }

    fn input_schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "rule_id": {
                    "type": "integer",
                    "description": "The numeric ID of the alert rule to fetch alerts for"
                },
                "page": {
                    "type": "integer",
                    "description": "Page number for pagination. 0-based index (default: 0 for first page)"
                },
                "order_by": {
                    "type": "string",
                    "description": "Field name to sort results by (e.g., 'created_at', 'triggered_at', 'status'). Default: 'created_at' in descending order"
                }
            },
            "required": ["rule_id"]
        })
    }

    async fn execute(&self, params: JsonValue) -> Result<ToolResult, ToolError> {
        let input: ListAlertsInput = parse_input(params)?;

        let params = GetAlertsParams {
            page: input.page,
            order_by: input.order_by,
        };

        let result = self.client.get_alerts(input.rule_id, &params).await?;
        ToolResult::json(&result)
    }
}

// ---------------------------------------------------------------------------
// create_alert
// ---------------------------------------------------------------------------

pub struct CreateAlertTool {
    client: Arc<MiddlewareClient>,
}

impl CreateAlertTool {
    pub fn new(client: Arc<MiddlewareClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct CreateAlertInput {
    rule_id: i64,
    title: String,
    #[serde(default)]
    message: String,
    status: i64,
    #[serde(default)]
    value: f64,
    #[serde(default)]
    threshold: f64,
    #[serde(default)]
    operator: String,
    #[serde(default)]
    unit: String,
    #[serde(default)]
    attributes: HashMap<String, String>,
    #[serde(default)]
    project_uid: String,
    #[serde(default)]
    executor_id: i64,
    #[serde(default)]
    triggered_at: String,
}

#[async_trait]
impl Tool for CreateAlertTool {
    fn name(&self) -> &str {
        "create_alert"
    }

    fn description(&self) -> &str {
        "Manually create a new alert instance for a specific alert rule.\n\nThis tool allows you to programmatically create alert instances, typically used for custom alerting logic or integrations with external monitoring systems. The alert will be associated with an existing alert rule and will appear in the alerts list and trigger configured notification channels.\n\nNote: In most cases, alerts are automatically created when rule conditions are met. Use this tool for custom alerting workflows or manual alert creation."
    }

    fn input_schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "rule_id": {
                    "type": "integer",
                    "description": "The numeric ID of the alert rule this alert instance belongs to"
                },
                "title": {
                    "type": "string",
                    "description": "Alert title/summary describing what triggered (e.g., 'High CPU Usage on prod-server-01')"
                },
                "message": {
                    "type": "string",
                    "description": "Detailed alert message with additional context and information"
                },
                "status": {
                    "type": "integer",
                    "description": "Alert status code. Typically: 0=OK/Resolved, 1=Warning, 2=Critical, 3=Unknown"
                },
                "value": {
                    "type": "number",
                    "description": "The actual measured value that triggered the alert (e.g., 95.5 for 95.5% CPU usage)"
                },
                "threshold": {
                    "type": "number",
                    "description": "The threshold value that was exceeded (e.g., 80.0 for 80% threshold)"
                },
                "operator": {
                    "type": "string",
                    "description": "Comparison operator used (e.g., '>', '<', '>=', '<=', '==', '!=')"
                },
                "unit": {
                    "type": "string",
                    "description": "Unit of measurement for the value (e.g., 'percent', 'ms', 'requests/sec', 'GB')"
                },
                "attributes": {
                    "type": "object",
                    "additionalProperties": {"type": "string"},
                    "description": "Additional key-value pairs with context (e.g., {'hostname': 'prod-01', 'region': 'us-east-1'})"
                },
                "project_uid": {
                    "type": "string",
                    "description": "Project unique identifier if alert is project-specific"
                },
                "executor_id": {
                    "type": "integer",
                    "description": "ID of the executor/rule evaluator that triggered the alert"
                },
                "triggered_at": {
                    "type": "string",
                    "description": "Timestamp when the alert was triggered (ISO 8601 format, e.g., '2024-01-15T10:30:00Z')"
                }
            },
            "required": ["rule_id", "title", "status"]
        })
    }

    async fn execute(&self, params: JsonValue) -> Result<ToolResult, ToolError> {
        let input: CreateAlertInput = parse_input(params)?;

        let alert = NewAlert {
            rule_id: input.rule_id,
            title: input.title,
            message: none_if_empty(input.message),
            status: input.status,
            value: (input.value != 0.0).then_some(input.value),
            threshold: (input.threshold != 0.0).then_some(input.threshold),
            operator: none_if_empty(input.operator),
            unit: none_if_empty(input.unit),
            attributes: if input.attributes.is_empty() {
                None
            } else {
                Some(input.attributes)
            },
            project_uid: none_if_empty(input.project_uid),
            executor_id: (input.executor_id != 0).then_some(input.executor_id),
            triggered_at: none_if_empty(input.triggered_at),
            created_at: None,
        };

        let result = self.client.create_alert(input.rule_id, &alert).await?;
        ToolResult::json(&result)
    }
}

// ---------------------------------------------------------------------------
// get_alert_stats
// ---------------------------------------------------------------------------

pub struct GetAlertStatsTool {
    client: Arc<MiddlewareClient>,
}

impl GetAlertStatsTool {
    pub fn new(client: Arc<MiddlewareClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct GetAlertStatsInput {
    rule_id: i64,
}

#[async_trait]
impl Tool for GetAlertStatsTool {
    fn name(&self) -> &str {
        "get_alert_stats"
    }

    fn description(&self) -> &str {
        "Get aggregated statistics and metrics for alerts of a specific rule.\n\nThis tool provides statistical analysis of alert history including counts by status (OK, Warning, Critical), counts by alert title, and time series data showing alert trends over time. Use this to understand alert patterns, identify frequently triggered alerts, and analyze alert distribution.\n\nReturns:\n- Count by status: Number of alerts in each status (OK, Warning, Critical)\n- Count by title: Distribution of alerts by their titles\n- Timeseries by title: Historical alert counts over time grouped by title"
    }

    fn input_schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "rule_id": {
                    "type": "integer",
                    "description": "The numeric ID of the alert rule to fetch statistics for"
                }
            },
            "required": ["rule_id"]
        })
    }

    async fn execute(&self, params: JsonValue) -> Result<ToolResult, ToolError> {
        let input: GetAlertStatsInput = parse_input(params)?;
        let result = self.client.get_alert_stats(input.rule_id).await?;
        ToolResult::json(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_alert_input_omits_empty_optionals() {
        let input: CreateAlertInput = serde_json::from_value(json!({
            "rule_id": 3,
            "title": "High CPU",
            "status": 2
        }))
        .unwrap();

        assert_eq!(input.rule_id, 3);
        assert_eq!(input.value, 0.0);
        assert!(input.attributes.is_empty());
    }

    #[tokio::test]
    async fn test_list_alerts_requires_rule_id() {
        let client =
            Arc::new(MiddlewareClient::new("https://demo.middleware.io", "key", "").unwrap());
        let tool = ListAlertsTool::new(client);
        let err = tool.execute(json!({"page": 1})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams(_)));
    }
}
