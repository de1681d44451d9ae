use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn default_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("octopets_agents=debug,tower_http=debug,info")
        } else {
            EnvFilter::new("octopets_agents=info,tower_http=info,warn")
        }
    })
}

/// 日誌寫到 stderr，stdout 留給指令輸出
pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

pub fn init_json_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(), // 容器環境用 JSON 方便集中收集
        )
        .init();
}

/// 依 `LOG_FORMAT` 選擇輸出格式 (`json` 或預設 compact)
pub fn init_service_logger(verbose: bool) {
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => init_json_logger(verbose),
        _ => init_cli_logger(verbose),
    }
}
