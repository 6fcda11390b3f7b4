//! MCPツールの登録
//!
//! 各ツールはAPIクライアントを共有し、`EXCLUDED_TOOLS`に挙がった名前は
//! 起動時に登録をスキップする。

pub mod alerts;
pub mod dashboards;
pub mod errors;
pub mod metrics;
pub mod widgets;

use std::sync::Arc;

use crate::client::MiddlewareClient;
use crate::config::Config;
use crate::tool::ToolManager;

/// 全ツールを登録する。登録順が一覧の順序になる。
pub fn register_tools(
    manager: &mut ToolManager,
    config: &Config,
    client: Arc<MiddlewareClient>,
) {
    // ダッシュボード
    if !config.is_tool_excluded("list_dashboards") {
        manager.register(dashboards::ListDashboardsTool::new(client.clone()));
    }
    if !config.is_tool_excluded("get_dashboard") {
        manager.register(dashboards::GetDashboardTool::new(client.clone()));
    }
    if !config.is_tool_excluded("create_dashboard") {
        manager.register(dashboards::CreateDashboardTool::new(client.clone()));
    }
    if !config.is_tool_excluded("update_dashboard") {
        manager.register(dashboards::UpdateDashboardTool::new(client.clone()));
    }
    if !config.is_tool_excluded("delete_dashboard") {
        manager.register(dashboards::DeleteDashboardTool::new(client.clone()));
    }
    if !config.is_tool_excluded("clone_dashboard") {
        manager.register(dashboards::CloneDashboardTool::new(client.clone()));
    }
    if !config.is_tool_excluded("set_dashboard_favorite") {
        manager.register(dashboards::SetDashboardFavoriteTool::new(client.clone()));
    }

    // ウィジェット
    if !config.is_tool_excluded("list_widgets") {
        manager.register(widgets::ListWidgetsTool::new(client.clone()));
    }
    if !config.is_tool_excluded("create_widget") {
        manager.register(widgets::CreateWidgetTool::new(client.clone()));
    }
    if !config.is_tool_excluded("update_widget") {
        manager.register(widgets::UpdateWidgetTool::new(client.clone()));
    }
    if !config.is_tool_excluded("delete_widget") {
        manager.register(widgets::DeleteWidgetTool::new(client.clone()));
    }
    if !config.is_tool_excluded("get_widget_data") {
        manager.register(widgets::GetWidgetDataTool::new(client.clone()));
    }
    if !config.is_tool_excluded("get_multi_widget_data") {
        manager.register(widgets::GetMultiWidgetDataTool::new(client.clone()));
    }
    if !config.is_tool_excluded("update_widget_layouts") {
        manager.register(widgets::UpdateWidgetLayoutsTool::new(client.clone()));
    }

    // メトリクス
    if !config.is_tool_excluded("get_metrics") {
        manager.register(metrics::GetMetricsTool::new(client.clone()));
    }
    if !config.is_tool_excluded("get_resources") {
        manager.register(metrics::GetResourcesTool::new(client.clone()));
    }
    if !config.is_tool_excluded("query") {
        manager.register(metrics::QueryTool::new(client.clone()));
    }

    // アラート
    if !config.is_tool_excluded("list_alerts") {
        manager.register(alerts::ListAlertsTool::new(client.clone()));
    }
    if !config.is_tool_excluded("create_alert") {
        manager.register(alerts::CreateAlertTool::new(client.clone()));
    }
    if !config.is_tool_excluded("get_alert_stats") {
        manager.register(alerts::GetAlertStatsTool::new(client.clone()));
    }

    // エラー・インシデント
    if !config.is_tool_excluded("list_errors") {
        manager.register(errors::ListErrorsTool::new(client.clone()));
    }
    if !config.is_tool_excluded("get_error_details") {
        manager.register(errors::GetErrorDetailsTool::new(client));
    }
}
