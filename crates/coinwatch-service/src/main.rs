//! Coinwatch daemon CLI.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use coinwatch_core::{generate_master_key, init_logging, AppConfig};
use coinwatch_exchange::BinanceGateway;
use coinwatch_notification::{NotificationSink, WebhookSink};
use coinwatch_service::{start_monitor_engine, MonitorEngine};
use coinwatch_store::MonitorRegistry;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "coinwatch")]
#[command(about = "Coinwatch price monitor daemon", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 설정 파일 경로
    #[arg(long, default_value = "config/default.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// 모니터 엔진 데몬 실행
    Daemon,

    /// 볼트용 마스터 키 생성 (base64, 32바이트)
    GenerateKey,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::GenerateKey => {
            // 로깅 초기화 전에 실행: 키가 로그에 남지 않도록 stdout으로만 출력
            println!("{}", generate_master_key());
            Ok(())
        }
        Commands::Daemon => run_daemon(&cli.config).await,
    }
}

async fn run_daemon(config_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load(config_path)?;
    init_logging(&config.logging)?;

    tracing::info!("Coinwatch daemon 시작");

    // DB 연결 및 스키마 초기화
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    coinwatch_store::init_schema(&pool).await?;
    tracing::info!("데이터베이스 연결 성공");

    // 엔진 구성
    let registry = Arc::new(MonitorRegistry::new(pool.clone()));
    let gateway = Arc::new(BinanceGateway::new(config.markets.clone())?);
    let sink: Arc<dyn NotificationSink> = Arc::new(WebhookSink::new(config.notification.clone())?);

    let engine = MonitorEngine::new(registry, gateway, sink, config.monitor.clone());

    let shutdown = CancellationToken::new();
    let handle = start_monitor_engine(engine, shutdown.clone());

    // 종료 신호 대기
    tokio::signal::ctrl_c().await?;
    tracing::info!("종료 신호 수신, 데몬 종료 중...");

    shutdown.cancel();
    handle.await?;
    pool.close().await;

    tracing::info!("Coinwatch daemon 종료");
    Ok(())
}
