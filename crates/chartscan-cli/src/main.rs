//! 차트 스캐너 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 스크린샷 픽셀 분석
//! chartscan pixels -i capture.rgba -W 1280 -H 720
//!
//! # 분석 결과로 매매 결정 (1분봉 기준)
//! chartscan decide -i analysis.json -t 1m
//!
//! # 스냅샷 시퀀스 변화 감지
//! chartscan changes -i snapshots.json --sensitivity high
//!
//! # 유효 설정 확인
//! chartscan --config config/chartscan.toml config
//! ```

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};

use chartscan_core::logging::{init_logging, init_logging_from_env, LogConfig, LogFormat};
use chartscan_core::{AppConfig, Sensitivity, Timeframe};
use chartscan_decision::{ChangeDetectionOptions, DecisionCriteria};

use chartscan_cli::commands::changes::{replay_changes, ChangesConfig};
use chartscan_cli::commands::decide::{run_decision, DecideConfig};
use chartscan_cli::commands::pixels::{analyze_pixels, PixelsConfig};

#[derive(Parser)]
#[command(name = "chartscan")]
#[command(about = "Chart screenshot scanner - 차트 유효성 분석 및 매매 결정", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 로그 형식 (pretty, json, compact)
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 원시 RGBA 파일의 차트 픽셀 분석
    Pixels {
        /// RGBA 파일 경로 (행 우선, 픽셀당 4바이트)
        #[arg(short, long)]
        input: PathBuf,

        /// 이미지 너비
        #[arg(short = 'W', long)]
        width: usize,

        /// 이미지 높이
        #[arg(short = 'H', long)]
        height: usize,
    },

    /// 분석 결과 JSON으로 매매 결정 생성
    Decide {
        /// 분석 결과 JSON 경로
        #[arg(short, long)]
        input: PathBuf,

        /// 타임프레임 (1m, 5m, 15m, 1h, ...; 기본: 설정 파일)
        #[arg(short, long)]
        timeframe: Option<String>,
    },

    /// 스냅샷 배열 JSON을 재생하여 변화 감지
    Changes {
        /// 스냅샷 배열 JSON 경로
        #[arg(short, long)]
        input: PathBuf,

        /// 감도 (low, medium, high; 기본: 설정 파일)
        #[arg(short, long)]
        sensitivity: Option<String>,
    },

    /// 유효 설정을 TOML로 출력
    Config,
}

fn main() -> Result<()> {
    // .env 파일 로드 (없으면 무시)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            init_logging_from_env().ok();
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let mut log_config = LogConfig::from_settings(&config.logging);
    if let Some(format) = &cli.log_format {
        log_config = log_config.with_format(format.parse::<LogFormat>().map_err(|e| anyhow!(e))?);
    }
    init_logging(log_config).map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    match cli.command {
        Commands::Pixels {
            input,
            width,
            height,
        } => {
            let analysis = analyze_pixels(&PixelsConfig {
                input,
                width,
                height,
            })?;
            print_json(&analysis)?;
        }

        Commands::Decide { input, timeframe } => {
            let mut settings = config.decision.clone();
            if let Some(tf) = timeframe {
                settings.timeframe = tf.parse::<Timeframe>().map_err(|e| anyhow!(e))?;
            }

            let decision = run_decision(&DecideConfig {
                input,
                criteria: DecisionCriteria::from_settings(&settings),
            })?;
            info!(action = ?decision.action, confidence = decision.confidence, "Decision ready");
            print_json(&decision)?;
        }

        Commands::Changes { input, sensitivity } => {
            let mut options = ChangeDetectionOptions::from_settings(&config.change_detection);
            if let Some(s) = sensitivity {
                options.sensitivity = s.parse::<Sensitivity>().map_err(|e| anyhow!(e))?;
            }

            let report = replay_changes(&ChangesConfig { input, options })?;
            print_json(&report)?;
        }

        Commands::Config => {
            let rendered =
                toml::to_string_pretty(&config).context("Failed to render configuration")?;
            println!("{}", rendered);
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
