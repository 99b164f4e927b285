use anyhow::Context;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

// 引入内部模块
use relay_agent::{build_backend, InferenceGateway};
use relay_core::RelayConfig;
use relay_server::{build_router, AppState};

// =========================================================================
// 1. 日志配置 (输出到控制台 + 文件)
// =========================================================================
fn init_logging(log_dir: &str) -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // 1. 文件输出器：每天生成一个新的日志文件 (logs/relay.log.2025-xx-xx)
    let file_appender = tracing_appender::rolling::daily(log_dir, "relay.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // 2. 控制台层 (Console Layer)
    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false) // 不显示模块路径，保持清爽
        .with_thread_ids(true)
        .compact(); // 紧凑模式

    // 3. 文件层 (File Layer)
    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false) // 文件里不要颜色代码
        .with_file(true)
        .with_line_number(true);

    // 4. 注册全局订阅者
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(stdout_layer)
        .with(file_layer)
        .init();

    guard // 必须返回 guard，否则日志线程会立即销毁
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    warn!("🛑 Ctrl+C received! Shutting down gracefully...");
}

// =========================================================================
// 2. 主入口 (Main Entry)
// =========================================================================
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A. 加载配置与日志
    dotenv().ok(); // 读取 .env 文件
    let config = RelayConfig::from_env().context("Failed to load RELAY_* configuration")?;
    let _log_guard = init_logging(&config.log_dir); // 初始化日志，_guard 不能丢

    info!("Starting Ollama chat relay ⚡️");

    // B. 构建后端与网关 (整个进程只构建一次)
    let backend = build_backend(&config).context("Failed to build inference backend")?;
    let gateway = InferenceGateway::new(backend, config.model_selector());
    info!(
        model = %gateway.model(),
        backend = gateway.backend_name(),
        "📦 Inference gateway initialized."
    );

    // C. 路由
    let app = build_router(AppState::new(gateway), config.max_body_bytes);

    // D. 监听并服务，Ctrl+C 优雅停机
    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("🚀 Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server exited with error")?;

    info!("👋 Relay Shutdown Complete.");
    Ok(())
}
