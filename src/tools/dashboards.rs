//! ダッシュボード操作ツール

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

use crate::client::{GetDashboardsParams, MiddlewareClient};
use crate::tool::{parse_input, Tool, ToolError, ToolResult};
use crate::types::UpsertReportRequest;

fn none_if_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

// ---------------------------------------------------------------------------
// list_dashboards
// ---------------------------------------------------------------------------

pub struct ListDashboardsTool {
    client: Arc<MiddlewareClient>,
}

impl ListDashboardsTool {
    pub fn new(client: Arc<MiddlewareClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct ListDashboardsInput {
    #[serde(default)]
    limit: i64,
    #[serde(default)]
    offset: i64,
    #[serde(default)]
    search: String,
    #[serde(default)]
    filter_by: String,
    #[serde(default)]
    display_scope: String,
}

#[async_trait]
impl Tool for ListDashboardsTool {
    fn name(&self) -> &str {
        "list_dashboards"
    }

    fn description(&self) -> &str {
        "Get a list of dashboards (i.e. reports) with advanced filtering and pagination support.\n\nThis tool retrieves dashboards from Middleware.io with support for searching, filtering by various criteria, and pagination. Use this to discover available dashboards, find specific dashboards by name, or filter by ownership and usage patterns."
    }

    fn input_schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "limit": {
                    "type": "integer",
                    "description": "Number of items per page for pagination"
                },
                "offset": {
                    "type": "integer",
                    "description": "Number of items to skip for pagination (page offset)"
                },
                "search": {
                    "type": "string",
                    "description": "Search query to find dashboards by name or description"
                },
                "filter_by": {
                    "type": "string",
                    "description": "Comma-separated list of filter values. Valid values: custom, created_by_you, favorite, frequently_viewed, or data source names like aws, mysql, postgresql, etc."
                },
                "display_scope": {
                    "type": "string",
                    "description": "Filter dashboards by comma-separated list of display scopes"
                }
            }
        })
    }

    async fn execute(&self, params: JsonValue) -> Result<ToolResult, ToolError> {
        let input: ListDashboardsInput = parse_input(params)?;

        let params = GetDashboardsParams {
            limit: input.limit,
            offset: input.offset,
            search: input.search,
            filter_by: input.filter_by,
            display_scope: input.display_scope,
            sort: String::new(),
        };

        let result = self.client.get_dashboards(&params).await?;
        ToolResult::json(&result)
    }
}

// ---------------------------------------------------------------------------
// get_dashboard
// ---------------------------------------------------------------------------

pub struct GetDashboardTool {
    client: Arc<MiddlewareClient>,
}

impl GetDashboardTool {
    pub fn new(client: Arc<MiddlewareClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct GetDashboardInput {
    report_key: String,
}

#[async_trait]
impl Tool for GetDashboardTool {
    fn name(&self) -> &str {
        "get_dashboard"
    }

    fn description(&self) -> &str {
        "Get detailed information about a specific dashboard by its unique key.\n\nThis tool retrieves complete dashboard configuration including widgets, layout, metadata, and settings. Use this when you need to inspect or work with a specific dashboard's structure and content."
    }

    fn input_schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "report_key": {
                    "type": "string",
                    "description": "The unique key identifier of the dashboard to retrieve"
                }
            },
            "required": ["report_key"]
        })
    }

    async fn execute(&self, params: JsonValue) -> Result<ToolResult, ToolError> {
        let input: GetDashboardInput = parse_input(params)?;
        let result = self.client.get_dashboard_by_key(&input.report_key).await?;
        ToolResult::json(&result)
    }
}

// ---------------------------------------------------------------------------
// create_dashboard
// ---------------------------------------------------------------------------

pub struct CreateDashboardTool {
    client: Arc<MiddlewareClient>,
}

impl CreateDashboardTool {
    pub fn new(client: Arc<MiddlewareClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct CreateDashboardInput {
    label: String,
    visibility: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    key: String,
}

#[async_trait]
impl Tool for CreateDashboardTool {
    fn name(&self) -> &str {
        "create_dashboard"
    }

    fn description(&self) -> &str {
        "Create a new custom dashboard in Middleware.io.\n\nThis tool creates a new dashboard with the specified configuration. Dashboards can be public (shared with team) or private (personal). You can organize dashboards using display scopes and provide custom keys for easier identification."
    }

    fn input_schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "label": {
                    "type": "string",
                    "minLength": 3,
                    "description": "The dashboard name/title. Must be at least 3 characters long"
                },
                "visibility": {
                    "type": "string",
                    "enum": ["public", "private"],
                    "description": "Dashboard visibility setting. Must be either 'public' (shared with team) or 'private' (personal only)"
                },
                "description": {
                    "type": "string",
                    "description": "Optional detailed description of the dashboard's purpose and contents"
                },
                "key": {
                    "type": "string",
                    "description": "Optional unique key identifier for the dashboard. If not provided, will be auto-generated"
                }
            },
            "required": ["label", "visibility"]
        })
    }

    async fn execute(&self, params: JsonValue) -> Result<ToolResult, ToolError> {
        let input: CreateDashboardInput = parse_input(params)?;

        let req = UpsertReportRequest {
            label: input.label,
            visibility: input.visibility,
            description: none_if_empty(input.description),
            key: none_if_empty(input.key),
            ..Default::default()
        };

        let result = self.client.create_dashboard(&req).await?;
        ToolResult::json(&result)
    }
}

// ---------------------------------------------------------------------------
// update_dashboard
// ---------------------------------------------------------------------------

pub struct UpdateDashboardTool {
    client: Arc<MiddlewareClient>,
}

impl UpdateDashboardTool {
    pub fn new(client: Arc<MiddlewareClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct UpdateDashboardInput {
    id: i64,
    label: String,
    visibility: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    key: String,
}

#[async_trait]
impl Tool for UpdateDashboardTool {
    fn name(&self) -> &str {
        "update_dashboard"
    }

    fn description(&self) -> &str {
        "Update an existing dashboard's configuration and metadata.\n\nThis tool modifies an existing dashboard identified by its ID. You can update the name, description, visibility settings, and display scope. Use this to rename dashboards, change sharing settings, or reorganize dashboard categories."
    }

    fn input_schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "id": {
                    "type": "integer",
                    "description": "The numeric ID of the dashboard to update"
                },
                "label": {
                    "type": "string",
                    "minLength": 3,
                    "description": "The updated dashboard name/title. Must be at least 3 characters long"
                },
                "visibility": {
                    "type": "string",
                    "enum": ["public", "private"],
                    "description": "Updated visibility setting. Must be either 'public' or 'private'"
                },
                "description": {
                    "type": "string",
                    "description": "Updated description of the dashboard"
                },
                "key": {
                    "type": "string",
                    "description": "Updated unique key identifier. Must be unique across all dashboards"
                }
            },
            "required": ["id", "label", "visibility"]
        })
    }

    async fn execute(&self, params: JsonValue) -> Result<ToolResult, ToolError> {
        let input: UpdateDashboardInput = parse_input(params)?;

        let req = UpsertReportRequest {
            id: Some(input.id),
            label: input.label,
            visibility: input.visibility,
            description: none_if_empty(input.description),
            key: none_if_empty(input.key),
            ..Default::default()
        };

        let result = self.client.update_dashboard(input.id, &req).await?;
        ToolResult::json(&result)
    }
}

// ---------------------------------------------------------------------------
// delete_dashboard
// ---------------------------------------------------------------------------

pub struct DeleteDashboardTool {
    client: Arc<MiddlewareClient>,
}

impl DeleteDashboardTool {
    pub fn new(client: Arc<MiddlewareClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct DeleteDashboardInput {
    id: i64,
}

#[async_trait]
impl Tool for DeleteDashboardTool {
    fn name(&self) -> &str {
        "delete_dashboard"
    }

    fn description(&self) -> &str {
        "Permanently delete a dashboard and all its widgets.\n\nThis tool removes a dashboard from Middleware.io. Warning: This action cannot be undone. All widgets and configurations associated with the dashboard will be permanently deleted."
    }

    fn input_schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "id": {
                    "type": "integer",
                    "description": "The numeric ID of the dashboard to delete permanently"
                }
            },
            "required": ["id"]
        })
    }

    async fn execute(&self, params: JsonValue) -> Result<ToolResult, ToolError> {
        let input: DeleteDashboardInput = parse_input(params)?;
        self.client.delete_dashboard(input.id).await?;
        ToolResult::json(&json!({"success": true, "message": "Dashboard deleted successfully"}))
    }
}

// ---------------------------------------------------------------------------
// clone_dashboard
// ---------------------------------------------------------------------------

pub struct CloneDashboardTool {
    client: Arc<MiddlewareClient>,
}

impl CloneDashboardTool {
    pub fn new(client: Arc<MiddlewareClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct CloneDashboardInput {
    label: String,
    visibility: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    source_key: String,
}

#[async_trait]
impl Tool for CloneDashboardTool {
    fn name(&self) -> &str {
        "clone_dashboard"
    }

    fn description(&self) -> &str {
        "Create a copy of an existing dashboard with all its widgets and configuration.\n\nThis tool duplicates an existing dashboard, creating a new dashboard with the same widgets, layout, and settings. Useful for creating variations of dashboards or starting from a template. The cloned dashboard will have a new ID and can have different visibility settings."
    }

    fn input_schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "label": {
                    "type": "string",
                    "minLength": 3,
                    "description": "The name for the new cloned dashboard. Must be at least 3 characters"
                },
                "visibility": {
                    "type": "string",
                    "enum": ["public", "private"],
                    "description": "Visibility setting for the cloned dashboard: 'public' or 'private'"
                },
                "description": {
                    "type": "string",
                    "description": "Optional description for the cloned dashboard"
                },
                "source_key": {
                    "type": "string",
                    "description": "The unique key of the source dashboard to clone from"
                }
            },
            "required": ["label", "visibility"]
        })
    }

    async fn execute(&self, params: JsonValue) -> Result<ToolResult, ToolError> {
        let input: CloneDashboardInput = parse_input(params)?;

        let req = UpsertReportRequest {
            label: input.label,
            visibility: input.visibility,
            description: none_if_empty(input.description),
            key: none_if_empty(input.source_key),
            ..Default::default()
        };

        let result = self.client.clone_dashboard(&req).await?;
        ToolResult::json(&result)
    }
}

// ---------------------------------------------------------------------------
// set_dashboard_favorite
// ---------------------------------------------------------------------------

pub struct SetDashboardFavoriteTool {
    client: Arc<MiddlewareClient>,
}

impl SetDashboardFavoriteTool {
    pub fn new(client: Arc<MiddlewareClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct SetDashboardFavoriteInput {
    report_id: i64,
    favorite: bool,
}

#[async_trait]
impl Tool for SetDashboardFavoriteTool {
    fn name(&self) -> &str {
        "set_dashboard_favorite"
    }

    fn description(&self) -> &str {
        "Mark a dashboard as favorite or remove it from favorites.\n\nThis tool allows you to favorite dashboards for quick access. Favorited dashboards appear at the top of dashboard lists and can be filtered using the 'favorite' filter in list_dashboards. Use this to bookmark frequently accessed dashboards."
    }

    fn input_schema(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "report_id": {
                    "type": "integer",
                    "description": "The numeric ID of the dashboard to mark as favorite or unfavorite"
                },
                "favorite": {
                    "type": "boolean",
                    "description": "Set to true to add dashboard to favorites, false to remove from favorites"
                }
            },
            "required": ["report_id", "favorite"]
        })
    }

    async fn execute(&self, params: JsonValue) -> Result<ToolResult, ToolError> {
        let input: SetDashboardFavoriteInput = parse_input(params)?;
        self.client
            .set_dashboard_favorite(input.report_id, input.favorite)
            .await?;
        ToolResult::json(&json!({"success": true, "message": "Dashboard favorite status updated"}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> Arc<MiddlewareClient> {
        Arc::new(MiddlewareClient::new("https://demo.middleware.io", "key", "").unwrap())
    }

    #[test]
    fn test_schemas_declare_required_fields() {
        let client = test_client();

        let schema = GetDashboardTool::new(client.clone()).input_schema();
        assert_eq!(schema["required"], json!(["report_key"]));

        let schema = CreateDashboardTool::new(client.clone()).input_schema();
        assert_eq!(schema["required"], json!(["label", "visibility"]));
        assert_eq!(
            schema["properties"]["visibility"]["enum"],
            json!(["public", "private"])
        );
        assert_eq!(schema["properties"]["label"]["minLength"], json!(3));

        let schema = UpdateDashboardTool::new(client).input_schema();
        assert_eq!(schema["required"], json!(["id", "label", "visibility"]));
    }

    #[tokio::test]
    async fn test_get_dashboard_missing_key_is_invalid_params() {
        let tool = GetDashboardTool::new(test_client());
        let err = tool.execute(json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams(_)));
    }

    #[tokio::test]
    async fn test_delete_dashboard_rejects_non_numeric_id() {
        let tool = DeleteDashboardTool::new(test_client());
        let err = tool.execute(json!({"id": "42"})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams(_)));
    }
}
