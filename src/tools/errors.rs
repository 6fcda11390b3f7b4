//! エラー（インシデント）照会ツール

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

use crate::client::{GetIncidentDetailParams, GetIncidentsParams, MiddlewareClient};
use crate::tool::{parse_input, Tool, ToolError, ToolResult};

// ---------------------------------------------------------------------------
// list_errors
// ---------------------------------------------------------------------------

pub struct ListErrorsTool {
    client: Arc<MiddlewareClient>,
}

impl ListErrorsTool {
    pub fn new(client: Arc<MiddlewareClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct ListErrorsInput {
    from_ts: i64,
    to_ts: i64,
    #[serde(default)]
    page: i64,
    #[serde(default)]
    filter: String,
    status: String,
    #[serde(default)]
    search: String,
}

#[async_trait]
impl Tool for ListErrorsTool {
    fn name(&self) -> &str {
        "list_errors"
    }

    fn description(&self) -> &str {
        "List all errors/incidents currently happening in the system.\n\nThis tool retrieves all error incidents from the Middleware.io system. Use this to monitor system health, identify ongoing issues, and track error patterns. Results can be filtered by time range, status, and search terms, and support pagination.\n\nIMPORTANT: Each error/incident in the response includes an 'issue_url' field that contains a direct, clickable URL link to view the issue details in the Middleware.io web interface. This URL can be used to redirect users to the full issue details page where they can see complete context, occurrence history, related information, and all technical details. The URL format is: https://[base-url]/ops-ai?fingerprint=[fingerprint]. Always include this URL when presenting error information to users so they can easily navigate to view more details."
    }

    fn input_schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "from_ts": {
                    "type": "integer",
                    "description": "Start timestamp in milliseconds (Unix timestamp * 1000)"
                },
                "to_ts": {
                    "type": "integer",
                    "description": "End timestamp in milliseconds (Unix timestamp * 1000)"
                },
                "page": {
                    "type": "integer",
                    "description": "Page number for pagination (default: 1)"
                },
                "filter": {
                    "type": "string",
                    "description": "Optional filter string to narrow down results"
                },
                "status": {
                    "type": "string",
                    "enum": ["all", "for_review", "resolved", "reviewed", "ignored"],
                    "description": "Filter by status"
                },
                "search": {
                    "type": "string",
                    "description": "Search term to filter incidents by title or description"
                }
            },
            "required": ["from_ts", "to_ts", "page", "status"]
        })
    }

    async fn execute(&self, params: JsonValue) -> Result<ToolResult, ToolError> {
        let input: ListErrorsInput = parse_input(params)?;

        let params = GetIncidentsParams {
            from_ts: input.from_ts,
            to_ts: input.to_ts,
            page: default_page(input.page),
            filter: input.filter,
            status: input.status,
            search: input.search,
        };

        let result = self.client.get_incidents(&params).await?;
        ToolResult::json(&result)
    }
}

/// 0以下のページ番号は1ページ目にする
fn default_page(page: i64) -> i64 {
    if page <= 0 {
        1
    } else {
        page
    }
}

// ---------------------------------------------------------------------------
// get_error_details
// ---------------------------------------------------------------------------

pub struct GetErrorDetailsTool {
    client: Arc<MiddlewareClient>,
}

impl GetErrorDetailsTool {
    pub fn new(client: Arc<MiddlewareClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct GetErrorDetailsInput {
    fingerprint: String,
    from_ts: i64,
    to_ts: i64,
    #[serde(default)]
    filter: String,
}

#[async_trait]
impl Tool for GetErrorDetailsTool {
    fn name(&self) -> &str {
        "get_error_details"
    }

    fn description(&self) -> &str {
        "Get detailed information about a specific error/incident by its fingerprint.\n\nThis tool retrieves comprehensive details about a specific error incident from the Middleware.io system. Use this to investigate a particular error, view its full context, occurrence history, and related information."
    }

    fn input_schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "fingerprint": {
                    "type": "string",
                    "description": "The unique fingerprint identifier of the error/incident"
                },
                "from_ts": {
                    "type": "integer",
                    "description": "Start timestamp in milliseconds (Unix timestamp * 1000)"
                },
                "to_ts": {
                    "type": "integer",
                    "description": "End timestamp in milliseconds (Unix timestamp * 1000)"
                },
                "filter": {
                    "type": "string",
                    "description": "Optional filter string to narrow down results"
                }
            },
            "required": ["fingerprint", "from_ts", "to_ts"]
        })
    }

    async fn execute(&self, params: JsonValue) -> Result<ToolResult, ToolError> {
        let input: GetErrorDetailsInput = parse_input(params)?;

        let params = GetIncidentDetailParams {
            fingerprint: input.fingerprint,
            from_ts: input.from_ts,
            to_ts: input.to_ts,
            filter: input.filter,
        };

        let result = self.client.get_incident_detail(&params).await?;
        ToolResult::json(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_page() {
        assert_eq!(default_page(0), 1);
        assert_eq!(default_page(-5), 1);
        assert_eq!(default_page(1), 1);
        assert_eq!(default_page(3), 3);
    }

    #[test]
    fn test_list_errors_status_enum() {
        let client =
            Arc::new(MiddlewareClient::new("https://demo.middleware.io", "key", "").unwrap());
        let schema = ListErrorsTool::new(client).input_schema();
        assert_eq!(
            schema["properties"]["status"]["enum"],
            json!(["all", "for_review", "resolved", "reviewed", "ignored"])
        );
    }

    #[tokio::test]
    async fn test_get_error_details_requires_fingerprint() {
        let client =
            Arc::new(MiddlewareClient::new("https://demo.middleware.io", "key", "").unwrap());
        let tool = GetErrorDetailsTool::new(client);
        let err = tool
            .execute(json!({"from_ts": 1, "to_ts": 2}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams(_)));
    }
}
