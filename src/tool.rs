//! ツール抽象とレジストリ
//!
//! 各MCPツールは`Tool`トレイトを実装し、`ToolManager`に登録される。
//! 登録順がそのままツール一覧の順序になる。

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::client::ClientError;

/// ツール実行エラー
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// ツール実行結果
#[derive(Debug, Clone)]
pub struct ToolResult {
    pub output: String,
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            output: message.into(),
            is_error: true,
        }
    }

    /// 値をJSONにシリアライズしてテキスト結果にする
    pub fn json<T: serde::Serialize>(value: &T) -> Result<Self, ToolError> {
        Ok(Self::success(serde_json::to_string(value)?))
    }
}

/// Tool trait - すべてのツールが実装する
#[async_trait]
pub trait Tool: Send + Sync {
    /// ツール名
    fn name(&self) -> &str;

    /// ツールの説明（LLM用）
    fn description(&self) -> &str;

    /// 入力スキーマ（JSON Schema）
    fn input_schema(&self) -> JsonValue;

    /// ツール実行
    async fn execute(&self, params: JsonValue) -> Result<ToolResult, ToolError>;
}

/// ツールマネージャー
pub struct ToolManager {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolManager {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// ツールを登録
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        info!("Registering tool: {}", tool.name());
        self.tools.push(Arc::new(tool));
    }

    /// ツールを取得
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    /// 登録順のツール一覧
    pub fn all(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    /// ツールを実行
    pub async fn execute(&self, name: &str, params: JsonValue) -> Result<ToolResult, ToolError> {
        let tool = self.get(name).ok_or_else(|| {
            error!("Tool not found: {}", name);
            ToolError::NotFound(name.to_string())
        })?;

        debug!("Executing tool: {} with params: {:?}", name, params);
        let result = tool.execute(params).await;

        match &result {
            Ok(r) => debug!("Tool {} result: {}", name, r.output),
            Err(e) => error!("Tool {} error: {}", name, e),
        }

        result
    }

    /// 登録されているツール名一覧
    pub fn list_tools(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }
}

impl Default for ToolManager {
    fn default() -> Self {
        Self::new()
    }
}

/// ツール入力をserdeで構造体にパースする
pub fn parse_input<T: serde::de::DeserializeOwned>(params: JsonValue) -> Result<T, ToolError> {
    serde_json::from_value(params)
        .map_err(|e| ToolError::InvalidParams(format!("failed to parse input: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct MockTool;

    #[async_trait]
    impl Tool for MockTool {
        fn name(&self) -> &str {
            "mock_tool"
        }

        fn description(&self) -> &str {
            "A mock tool for testing"
        }

        fn input_schema(&self) -> JsonValue {
            json!({
                "type": "object",
                "properties": {
                    "input": {
                        "type": "string",
                        "description": "Input string"
                    }
                },
                "required": ["input"]
            })
        }

        async fn execute(&self, params: JsonValue) -> Result<ToolResult, ToolError> {
            let input = params["input"]
                .as_str()
                .ok_or_else(|| ToolError::InvalidParams("Missing 'input' parameter".to_string()))?;
            Ok(ToolResult::success(format!("Echo: {}", input)))
        }
    }

    struct OtherTool;

    #[async_trait]
    impl Tool for OtherTool {
        fn name(&self) -> &str {
            "other_tool"
        }

        fn description(&self) -> &str {
            "Another mock tool"
        }

        fn input_schema(&self) -> JsonValue {
            json!({"type": "object", "properties": {}})
        }

        async fn execute(&self, _params: JsonValue) -> Result<ToolResult, ToolError> {
            Ok(ToolResult::success("{}"))
        }
    }

    #[test]
    fn test_tool_manager_register() {
        let mut manager = ToolManager::new();
        manager.register(MockTool);

        assert!(manager.get("mock_tool").is_some());
        assert!(manager.get("unknown").is_none());
    }

    #[test]
    fn test_tool_manager_preserves_registration_order() {
        let mut manager = ToolManager::new();
        manager.register(OtherTool);
        manager.register(MockTool);

        assert_eq!(manager.list_tools(), vec!["other_tool", "mock_tool"]);
    }

    #[tokio::test]
    async fn test_tool_execute() {
        let mut manager = ToolManager::new();
        manager.register(MockTool);

        let result = manager
            .execute("mock_tool", json!({"input": "hello"}))
            .await
            .unwrap();

        assert!(!result.is_error);
        assert_eq!(result.output, "Echo: hello");
    }

    #[tokio::test]
    async fn test_tool_execute_not_found() {
        let manager = ToolManager::new();

        let result = manager.execute("unknown", json!({})).await;
        assert!(matches!(result, Err(ToolError::NotFound(_))));
    }

    #[test]
    fn test_parse_input_invalid() {
        #[derive(Debug, serde::Deserialize)]
        struct Input {
            #[allow(dead_code)]
            id: i64,
        }

        let err = parse_input::<Input>(json!({"id": "not-a-number"})).unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams(_)));
    }

    #[test]
    fn test_tool_result_json() {
        let result = ToolResult::json(&json!({"success": true})).unwrap();
        assert!(!result.is_error);
        assert_eq!(result.output, r#"{"success":true}"#);
    }
}
