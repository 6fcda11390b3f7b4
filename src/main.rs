mod builder;
mod client;
mod config;
mod server;
mod tool;
mod tools;
mod types;

use std::sync::Arc;
use tracing::{error, info};

use client::MiddlewareClient;
use config::{AppMode, Config};
use server::MiddlewareServer;

#[tokio::main]
async fn main() {
    // トレーシング初期化（stdioモードではstdoutがMCPチャネルなのでstderrへ出力）
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // 環境変数から設定を読み込み
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    info!("Configuration loaded (base URL: {})", config.base_url);

    // APIクライアントを作成
    let client = match MiddlewareClient::new(&config.base_url, &config.api_key, &config.authorization)
    {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to create API client: {}", e);
            std::process::exit(1);
        }
    };

    // サーバーを組み立ててツールを登録
    let server = MiddlewareServer::new(&config, client);
    info!("Registered {} tools", server.tool_names().len());

    let result = match config.app_mode {
        AppMode::Stdio => server::run_stdio(server).await,
        AppMode::Http => server::run_http(server, &config.app_host, config.app_port).await,
        AppMode::Sse => server::run_sse(server, &config.app_host, config.app_port).await,
    };

    if let Err(e) = result {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    info!("Server stopped");
}
