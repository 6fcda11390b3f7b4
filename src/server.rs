//! MCPサーバー本体
//!
//! `ToolManager`をrmcpの`ServerHandler`に橋渡しし、
//! stdio / Streamable HTTP / SSE の各トランスポートで公開する。
//! sseモードもStreamable HTTPサービス（SSEでストリーミングする）を
//! `/sse`にマウントして提供する。

use std::borrow::Cow;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use rmcp::model::*;
use rmcp::{ErrorData as McpError, ServerHandler};
use tokio::sync::Notify;
use tracing::{info, warn};

use crate::client::MiddlewareClient;
use crate::config::Config;
use crate::tool::{ToolError, ToolManager};
use crate::tools::register_tools;

/// HTTPモード停止時の接続ドレイン上限
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Middleware.io MCPサーバー
///
/// セッションごとにクローンされるが、ツール集合は`Arc`で共有する。
#[derive(Clone)]
pub struct MiddlewareServer {
    tools: Arc<ToolManager>,
}

impl MiddlewareServer {
    pub fn new(config: &Config, client: Arc<MiddlewareClient>) -> Self {
        let mut manager = ToolManager::new();
        register_tools(&mut manager, config, client);
        Self {
            tools: Arc::new(manager),
        }
    }

    /// 登録済みツール名（登録順）
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.list_tools()
    }

    /// 内部ツールをrmcpの`Tool`記述子へ変換する
    fn to_mcp_tool(tool: &dyn crate::tool::Tool) -> Tool {
        let input_schema: Arc<serde_json::Map<String, serde_json::Value>> =
            match tool.input_schema() {
                serde_json::Value::Object(map) => Arc::new(map),
                _ => Arc::new(serde_json::Map::new()),
            };

        Tool {
            name: Cow::Owned(tool.name().to_string()),
            title: None,
            description: Some(Cow::Owned(tool.description().to_string())),
            input_schema,
            output_schema: None,
            annotations: None,
            execution: None,
            icons: None,
            meta: None,
        }
    }
}

impl ServerHandler for MiddlewareServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "middleware-mcp-server".to_string(),
                title: Some("Middleware MCP Server".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "MCP server for the Middleware.io observability platform. \
                 Exposes tools for managing dashboards and widgets, querying \
                 metrics, reviewing alerts, and investigating errors/incidents."
                    .to_string(),
            ),
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let tools: Vec<Tool> = self
            .tools
            .all()
            .iter()
            .map(|t| Self::to_mcp_tool(t.as_ref()))
            .collect();
        std::future::ready(Ok(ListToolsResult::with_all_items(tools)))
    }

    fn get_tool(&self, name: &str) -> Option<Tool> {
        self.tools.get(name).map(|t| Self::to_mcp_tool(t.as_ref()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let params = request
            .arguments
            .map(serde_json::Value::Object)
            .unwrap_or(serde_json::Value::Object(serde_json::Map::new()));

        match self.tools.execute(&request.name, params).await {
            Ok(result) => {
                let content = vec![Content::text(result.output)];
                if result.is_error {
                    Ok(CallToolResult::error(content))
                } else {
                    Ok(CallToolResult::success(content))
                }
            }
            Err(ToolError::NotFound(name)) => Err(McpError::new(
                ErrorCode::METHOD_NOT_FOUND,
                format!("no tool registered with name: {}", name),
                None,
            )),
            Err(ToolError::InvalidParams(message)) => {
                Err(McpError::invalid_params(message, None))
            }
            Err(e) => Ok(CallToolResult::error(vec![Content::text(e.to_string())])),
        }
    }
}

/// stdioトランスポートで起動する
pub async fn run_stdio(server: MiddlewareServer) -> anyhow::Result<()> {
    use rmcp::{transport::stdio, ServiceExt};

    info!("Starting MCP server on stdio");
    let service = server.serve(stdio()).await?;

    tokio::select! {
        result = service.waiting() => {
            result?;
            info!("stdio transport closed");
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    Ok(())
}

/// Streamable HTTPサービスを指定パスにマウントしたルーターを作る
fn streamable_router(server: MiddlewareServer, path: &str) -> axum::Router {
    use rmcp::transport::streamable_http_server::{
        session::local::LocalSessionManager, StreamableHttpService,
    };

    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    );
    axum::Router::new().nest_service(path, service)
}

async fn serve_streamable(
    server: MiddlewareServer,
    host: &str,
    port: u16,
    path: &str,
) -> anyhow::Result<()> {
    let router = streamable_router(server, path);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Starting MCP server on http://{}{}", addr, path);

    let shutdown = Arc::new(Notify::new());
    let trigger = shutdown.clone();
    let serve = axum::serve(listener, router)
        .with_graceful_shutdown(async move { trigger.notified().await })
        .into_future();
    tokio::pin!(serve);

    tokio::select! {
        result = &mut serve => {
            result?;
            return Ok(());
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received, draining connections");
            shutdown.notify_one();
        }
    }

    match tokio::time::timeout(SHUTDOWN_TIMEOUT, serve).await {
        Ok(result) => result?,
        Err(_) => warn!("Drain did not finish within {:?}, exiting", SHUTDOWN_TIMEOUT),
    }

    Ok(())
}

/// Streamable HTTPトランスポートで起動する（エンドポイントは/mcp）
pub async fn run_http(server: MiddlewareServer, host: &str, port: u16) -> anyhow::Result<()> {
    serve_streamable(server, host, port, "/mcp").await
}

/// SSEモードで起動する。エンドポイントは/sse。
pub async fn run_sse(server: MiddlewareServer, host: &str, port: u16) -> anyhow::Result<()> {
    serve_streamable(server, host, port, "/sse").await
}

/// Ctrl-CまたはSIGTERMを待つ
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppMode;
    use std::collections::HashSet;

    fn test_config(excluded: &[&str]) -> Config {
        Config {
            api_key: "key".to_string(),
            base_url: "https://demo.middleware.io".to_string(),
            authorization: String::new(),
            app_mode: AppMode::Stdio,
            app_host: "localhost".to_string(),
            app_port: 8080,
            excluded_tools: excluded.iter().map(|s| s.to_string()).collect::<HashSet<_>>(),
        }
    }

    fn test_client() -> Arc<MiddlewareClient> {
        Arc::new(MiddlewareClient::new("https://demo.middleware.io", "key", "").unwrap())
    }

    #[test]
    fn test_all_tools_registered_in_order() {
        let server = MiddlewareServer::new(&test_config(&[]), test_client());
        let names = server.tool_names();

        assert_eq!(names.len(), 22);
        assert_eq!(names[0], "list_dashboards");
        assert_eq!(names[6], "set_dashboard_favorite");
        assert_eq!(names[7], "list_widgets");
        assert_eq!(names[14], "get_metrics");
        assert_eq!(names[17], "list_alerts");
        assert_eq!(names[20], "list_errors");
        assert_eq!(names[21], "get_error_details");
    }

    #[test]
    fn test_excluded_tools_are_not_registered() {
        let server = MiddlewareServer::new(&test_config(&["query", "create_alert"]), test_client());
        let names = server.tool_names();

        assert_eq!(names.len(), 20);
        assert!(!names.contains(&"query"));
        assert!(!names.contains(&"create_alert"));
        assert!(names.contains(&"get_metrics"));
    }

    #[test]
    fn test_get_tool_conversion() {
        let server = MiddlewareServer::new(&test_config(&[]), test_client());

        let tool = server.get_tool("list_dashboards").unwrap();
        assert_eq!(tool.name, "list_dashboards");
        assert!(tool.description.is_some());
        assert_eq!(tool.input_schema["type"], "object");

        assert!(server.get_tool("no_such_tool").is_none());
    }

    #[test]
    fn test_streamable_router_mounts_both_endpoints() {
        let server = MiddlewareServer::new(&test_config(&[]), test_client());
        let _http = streamable_router(server.clone(), "/mcp");
        let _sse = streamable_router(server, "/sse");
    }

    #[test]
    fn test_get_info_enables_tools() {
        let server = MiddlewareServer::new(&test_config(&[]), test_client());
        let info = server.get_info();

        assert_eq!(info.server_info.name, "middleware-mcp-server");
        assert!(info.capabilities.tools.is_some());
    }
}
