//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `RECITAL_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `RECITAL_SERVER__PORT=8080`
/// - `RECITAL_TTS__URL=http://tts-server:8000`
/// - `RECITAL_CACHE__ROOT=/var/lib/recital/sounds`
/// - `RECITAL_PLAYLIST__VOICES__EN=Matthew`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5060)?
        .set_default("tts.url", "http://localhost:8000")?
        .set_default("tts.timeout_secs", 60)?
        .set_default("tts.max_retries", 2)?
        .set_default("tts.backoff_ms", 500)?
        .set_default("archive.url", "http://localhost:8001/recordings")?
        .set_default("archive.timeout_secs", 30)?
        .set_default("archive.max_retries", 2)?
        .set_default("archive.backoff_ms", 500)?
        .set_default("cache.root", "local/sounds")?
        .set_default("cache.ephemeral_age_secs", 900)?
        .set_default("cache.ephemeral_interval_secs", 60)?
        .set_default("cache.sweep_enabled", true)?
        .set_default("playlist.languages", vec!["pli", "en"])?
        .set_default("playlist.voices.pli", "Aditi")?
        .set_default("playlist.voices.en", "Amy")?
        .set_default("playlist.max_seconds", 0)?
        .set_default("playlist.max_concurrent", 4)?
        .set_default("playlist.break_seconds", 1.5)?
        .set_default("playlist.volume", "playlist")?
        .set_default("audio.format", "mp3")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: RECITAL_CACHE__EPHEMERAL_AGE_SECS=600
    // 注意: 环境变量名会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix("RECITAL")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.tts.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "TTS URL cannot be empty".to_string(),
        ));
    }

    if config.archive.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Archive URL cannot be empty".to_string(),
        ));
    }

    if config.cache.root.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "Cache root cannot be empty".to_string(),
        ));
    }

    if config.cache.sweep_enabled && config.cache.ephemeral_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Ephemeral sweep interval cannot be 0 when sweeping is enabled".to_string(),
        ));
    }

    if config.playlist.languages.is_empty() {
        return Err(ConfigError::ValidationError(
            "Playlist needs at least one language".to_string(),
        ));
    }

    if config.playlist.max_concurrent == 0 {
        return Err(ConfigError::ValidationError(
            "Playlist max_concurrent cannot be 0".to_string(),
        ));
    }

    let break_seconds = config.playlist.break_seconds;
    if !break_seconds.is_finite() || break_seconds <= 0.0 {
        return Err(ConfigError::ValidationError(format!(
            "Playlist break_seconds must be positive, got {}",
            break_seconds
        )));
    }

    if config.playlist.volume.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Playlist volume cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("TTS URL: {}", config.tts.url);
    tracing::info!(
        "TTS Timeout: {}s, retries: {}",
        config.tts.timeout_secs,
        config.tts.max_retries
    );
    tracing::info!("Archive URL: {}", config.archive.url);
    tracing::info!("Cache Root: {:?}", config.cache.root);
    tracing::info!("Ephemeral Age: {}s", config.cache.ephemeral_age_secs);
    tracing::info!("Ephemeral Sweep Enabled: {}", config.cache.sweep_enabled);
    if config.cache.sweep_enabled {
        tracing::info!("Ephemeral Sweep Interval: {}s", config.cache.ephemeral_interval_secs);
    }
    tracing::info!("Languages: {}", config.playlist.languages.join(","));
    tracing::info!("Output Format: {}", config.audio.format);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::voice::AudioFormat;
    use std::io::Write;

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_tts_url() {
        let mut config = AppConfig::default();
        config.tts.url = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_sweep_interval() {
        let mut config = AppConfig::default();
        config.cache.ephemeral_interval_secs = 0;
        assert!(validate_config(&config).is_err());

        config.cache.sweep_enabled = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_bad_break() {
        let mut config = AppConfig::default();
        config.playlist.break_seconds = 0.0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9090

[cache]
root = "/tmp/recital-sounds"
ephemeral_age_secs = 120

[playlist]
languages = ["en"]

[audio]
format = "ogg"
"#
        )
        .unwrap();

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.cache.ephemeral_age_secs, 120);
        assert_eq!(config.playlist.languages, vec!["en"]);
        assert_eq!(config.playlist.voices.get("pli").map(String::as_str), Some("Aditi"));
        assert_eq!(config.audio.format, AudioFormat::Ogg);
        assert_eq!(config.tts.max_retries, 2);
    }
}
