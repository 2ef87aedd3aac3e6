//! Recital - 多语言朗读音频构建服务
//!
//! - Domain: voice/, phoneme/, playlist/, 内容哈希与签名
//! - Application: synthesis, playlist, commands, queries, ports
//! - Infrastructure: http, memory, persistence, adapters

use std::sync::Arc;
use std::time::Duration;

use recital::application::{
    DownloadSettings, PlaylistAssembler, RetryPolicy, SynthesisBackendFactory,
};
use recital::config::{load_config, print_config, AppConfig};
use recital::domain::voice::VoiceCatalog;
use recital::infrastructure::adapters::{
    HttpArchiveClient, HttpArchiveClientConfig, HttpTtsClient, HttpTtsClientConfig,
    StreamConcatenator,
};
use recital::infrastructure::http::{AppState, HttpServer, ServerConfig};
use recital::infrastructure::memory::InMemoryTaskManager;
use recital::infrastructure::persistence::{EphemeralSweeper, FileAudioCache, FileCacheConfig};

fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},recital={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("Recital - 多语言朗读音频构建服务");
    print_config(&config);

    // 音频缓存
    let cache = FileAudioCache::new(FileCacheConfig {
        root: config.cache.root.clone(),
        ephemeral_age: Duration::from_secs(config.cache.ephemeral_age_secs),
    })
    .await?
    .arc();

    let sweeper = config.cache.sweep_enabled.then(|| {
        EphemeralSweeper::spawn(
            cache.clone(),
            Duration::from_secs(config.cache.ephemeral_interval_secs),
        )
    });

    // 远程合成服务与录音归档
    let synthesizer = Arc::new(HttpTtsClient::new(
        HttpTtsClientConfig::new(&config.tts.url).with_timeout(config.tts.timeout_secs),
    )?);
    let archive = Arc::new(HttpArchiveClient::new(
        HttpArchiveClientConfig::new(&config.archive.url)
            .with_timeout(config.archive.timeout_secs),
    )?);

    let factory = SynthesisBackendFactory::new(
        synthesizer,
        archive,
        cache.clone(),
        Arc::new(StreamConcatenator::new()),
    )
    .with_retry(
        RetryPolicy::new(config.tts.max_retries, config.tts.backoff_ms),
        RetryPolicy::new(config.archive.max_retries, config.archive.backoff_ms),
    );

    let assembler = PlaylistAssembler::new(factory, config.audio.format)
        .with_break_seconds(config.playlist.break_seconds)
        .with_max_concurrent(config.playlist.max_concurrent);

    let settings = DownloadSettings {
        languages: config.playlist.languages.clone(),
        voices: config.playlist.voices.clone(),
        format: config.audio.format,
        max_seconds: config.playlist.max_seconds,
        volume: config.playlist.volume.clone(),
    };

    let state = AppState::new(
        assembler,
        Arc::new(VoiceCatalog::builtin()),
        InMemoryTaskManager::new().arc(),
        cache,
        settings,
    );

    let server = HttpServer::new(
        ServerConfig::new(&config.server.host, config.server.port),
        state,
    );

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    if let Some(sweeper) = sweeper {
        sweeper.shutdown().await;
    }

    tracing::info!("Server shutdown complete");

    Ok(())
}
