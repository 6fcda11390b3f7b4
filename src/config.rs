//! 環境変数からのアプリケーション設定読み込み
//!
//! 必須値が欠けている場合は起動時エラーとして扱う。

use std::collections::HashSet;
use std::env;
use std::str::FromStr;
use thiserror::Error;

/// 設定エラー
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    MissingVar(&'static str),

    #[error("invalid APP_MODE: {0} (must be stdio, http, or sse)")]
    InvalidMode(String),

    #[error("invalid APP_PORT: {0}")]
    InvalidPort(String),
}

/// 動作モード（MCPトランスポート）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Stdio,
    Http,
    Sse,
}

impl FromStr for AppMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdio" => Ok(AppMode::Stdio),
            "http" => Ok(AppMode::Http),
            "sse" => Ok(AppMode::Sse),
            other => Err(ConfigError::InvalidMode(other.to_string())),
        }
    }
}

/// アプリケーション設定
#[derive(Debug, Clone)]
pub struct Config {
    /// Middleware APIキー（ApiKeyヘッダーとして送信）
    pub api_key: String,
    /// Middleware APIベースURL
    pub base_url: String,
    /// Authorizationヘッダー値（設定時はAPIキーより優先）
    pub authorization: String,
    /// 動作モード: stdio / http / sse
    pub app_mode: AppMode,
    /// バインドホスト（http/sseモード用）
    pub app_host: String,
    /// バインドポート（http/sseモード用）
    pub app_port: u16,
    /// 除外ツール名の集合
    pub excluded_tools: HashSet<String>,
}

impl Config {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key =
            env::var("MIDDLEWARE_API_KEY").map_err(|_| ConfigError::MissingVar("MIDDLEWARE_API_KEY"))?;
        if api_key.is_empty() {
            return Err(ConfigError::MissingVar("MIDDLEWARE_API_KEY"));
        }

        let base_url =
            env::var("MIDDLEWARE_BASE_URL").map_err(|_| ConfigError::MissingVar("MIDDLEWARE_BASE_URL"))?;
        if base_url.is_empty() {
            return Err(ConfigError::MissingVar("MIDDLEWARE_BASE_URL"));
        }

        let authorization = env::var("MIDDLEWARE_AUTHORIZATION").unwrap_or_default();

        let app_mode = env_or_default("APP_MODE", "stdio").parse()?;
        let app_host = env_or_default("APP_HOST", "localhost");

        let port_str = env_or_default("APP_PORT", "8080");
        let app_port = port_str
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort(port_str.clone()))?;

        let excluded_tools = parse_excluded_tools(&env::var("EXCLUDED_TOOLS").unwrap_or_default());

        Ok(Self {
            api_key,
            base_url,
            authorization,
            app_mode,
            app_host,
            app_port,
            excluded_tools,
        })
    }

    /// ツールが除外対象かチェック
    pub fn is_tool_excluded(&self, tool_name: &str) -> bool {
        self.excluded_tools.contains(tool_name)
    }
}

fn env_or_default(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(value) if !value.is_empty() => value,
        _ => default.to_string(),
    }
}

/// カンマ区切りの除外ツールリストをパース（空白トリム、空要素は無視）
fn parse_excluded_tools(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_mode_parse() {
        assert_eq!("stdio".parse::<AppMode>().unwrap(), AppMode::Stdio);
        assert_eq!("http".parse::<AppMode>().unwrap(), AppMode::Http);
        assert_eq!("sse".parse::<AppMode>().unwrap(), AppMode::Sse);
        assert!("invalid".parse::<AppMode>().is_err());
        assert!("".parse::<AppMode>().is_err());
    }

    #[test]
    fn test_app_mode_error_message() {
        let err = "websocket".parse::<AppMode>().unwrap_err();
        assert_eq!(
            format!("{}", err),
            "invalid APP_MODE: websocket (must be stdio, http, or sse)"
        );
    }

    #[test]
    fn test_parse_excluded_tools() {
        let set = parse_excluded_tools("create_dashboard,delete_widget");
        assert_eq!(set.len(), 2);
        assert!(set.contains("create_dashboard"));
        assert!(set.contains("delete_widget"));
    }

    #[test]
    fn test_parse_excluded_tools_with_spaces() {
        let set = parse_excluded_tools(" create_dashboard , delete_widget ,, ");
        assert_eq!(set.len(), 2);
        assert!(set.contains("create_dashboard"));
        assert!(set.contains("delete_widget"));
    }

    #[test]
    fn test_parse_excluded_tools_empty() {
        assert!(parse_excluded_tools("").is_empty());
        assert!(parse_excluded_tools(" , ,").is_empty());
    }

    #[test]
    fn test_is_tool_excluded() {
        let config = Config {
            api_key: "key".to_string(),
            base_url: "https://test.middleware.io".to_string(),
            authorization: String::new(),
            app_mode: AppMode::Stdio,
            app_host: "localhost".to_string(),
            app_port: 8080,
            excluded_tools: parse_excluded_tools("query,list_errors"),
        };

        assert!(config.is_tool_excluded("query"));
        assert!(config.is_tool_excluded("list_errors"));
        assert!(!config.is_tool_excluded("list_dashboards"));
    }

    #[test]
    fn test_missing_var_message() {
        let err = ConfigError::MissingVar("MIDDLEWARE_API_KEY");
        assert_eq!(format!("{}", err), "MIDDLEWARE_API_KEY is required");
    }
}
