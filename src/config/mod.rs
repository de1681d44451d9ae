pub mod cli;
pub mod toml_config;

pub use cli::{CliConfig, Command, SearchArgs, ServiceArgs};
pub use toml_config::ServiceConfig;

use crate::utils::error::Result;
use crate::utils::validation::Validate;

/// 載入配置：有 `--config` 時讀 TOML，否則讀環境變數，最後套用命令列覆蓋
pub fn load_service_config(args: &ServiceArgs) -> Result<ServiceConfig> {
    let mut config = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            ServiceConfig::from_file(path)?
        }
        None => ServiceConfig::from_env()?,
    };

    if let Some(port) = args.port {
        config.server.port = Some(port);
        tracing::info!("🔧 Port overridden to: {}", port);
    }

    config.validate()?;
    Ok(config)
}
