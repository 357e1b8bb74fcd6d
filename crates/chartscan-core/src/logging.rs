//! 로깅 초기화.
//!
//! 라이브러리 크레이트는 `tracing` 이벤트만 남깁니다. 구독자는 `chartscan`
//! 바이너리가 `[logging]` 설정 섹션이나 `RUST_LOG`/`LOG_FORMAT`으로 설치합니다.

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LoggingConfig;

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 터미널용 여러 줄 형식
    #[default]
    Pretty,
    /// 줄 단위 JSON
    Json,
    /// 한 줄 형식
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// 구독자 설치 옵션.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// `EnvFilter` 지시문 (예: "chartscan_vision=debug,info")
    pub level: String,
    pub format: LogFormat,
    /// 분석 span의 시작/종료를 이벤트로 출력
    pub with_span_events: bool,
    pub with_file: bool,
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            with_span_events: false,
            with_file: false,
            with_target: true,
        }
    }
}

impl LogConfig {
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.with_span_events = enabled;
        self
    }

    /// `[logging]` 섹션에서 생성합니다. 알 수 없는 형식 문자열은 pretty가 됩니다.
    pub fn from_settings(settings: &LoggingConfig) -> Self {
        let config = Self {
            level: settings.level.clone(),
            format: settings.format.parse().unwrap_or_default(),
            with_file: settings.file_locations,
            ..Default::default()
        };
        config.with_span_events(settings.span_events)
    }

    /// `RUST_LOG`, `LOG_FORMAT` 환경 변수에서 생성합니다.
    ///
    /// 설정 파일을 읽지 못했을 때 에러를 보고하기 위한 대체 경로입니다.
    pub fn from_env() -> Self {
        let level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let format = std::env::var("LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        Self {
            level,
            format,
            ..Default::default()
        }
    }
}

/// stderr로 출력하는 전역 구독자를 설치합니다.
///
/// `RUST_LOG`가 있으면 `config.level`보다 우선합니다. 두 번째 호출은 에러입니다.
///
/// ```no_run
/// use chartscan_core::logging::{init_logging, LogConfig, LogFormat};
///
/// init_logging(LogConfig::new("chartscan_decision=debug").with_format(LogFormat::Json)).unwrap();
/// ```
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    let span_events = if config.with_span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let base = fmt::layer()
        .with_writer(std::io::stderr)
        .with_file(config.with_file)
        .with_line_number(config.with_file)
        .with_target(config.with_target)
        .with_span_events(span_events);

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.format {
        LogFormat::Pretty => registry.with(base.pretty()).try_init()?,
        LogFormat::Json => registry.with(base.json()).try_init()?,
        LogFormat::Compact => registry.with(base.compact()).try_init()?,
    }

    tracing::debug!(
        format = ?config.format,
        level = %config.level,
        span_events = config.with_span_events,
        "Logging initialized"
    );

    Ok(())
}

pub fn init_logging_from_env() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LogConfig::from_env())
}

/// 분석 단위(이미지 크기 또는 타임프레임)를 필드로 가지는 debug span.
#[macro_export]
macro_rules! analysis_span {
    ($name:expr, width = $width:expr, height = $height:expr) => {
        tracing::debug_span!($name, width = $width, height = $height)
    };
    ($name:expr, timeframe = $timeframe:expr) => {
        tracing::debug_span!($name, timeframe = %$timeframe)
    };
}
