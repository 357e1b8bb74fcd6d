//! 설정 관리.
//!
//! 파일(TOML)과 `CHARTSCAN__` 접두사 환경 변수에서 애플리케이션 설정을 로드합니다.
//! 모든 섹션은 기본값을 가지므로 설정 파일 없이도 동작합니다.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::Sensitivity;
use crate::error::{ChartScanError, ChartScanResult};
use crate::types::Timeframe;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 매매 결정 엔진 설정
    #[serde(default)]
    pub decision: DecisionSettings,
    /// 변화 감지 엔진 설정
    #[serde(default)]
    pub change_detection: ChangeDetectionSettings,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
    /// 분석 span 시작/종료 이벤트 출력
    #[serde(default)]
    pub span_events: bool,
    /// 파일명과 줄 번호 출력
    #[serde(default)]
    pub file_locations: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            span_events: false,
            file_locations: false,
        }
    }
}

/// 매매 결정 엔진 설정.
///
/// 타임프레임으로 프리셋을 고르고, 개별 값이 지정되면 프리셋을 재정의합니다.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DecisionSettings {
    /// 분석 타임프레임 (프리셋 선택용)
    #[serde(default = "default_timeframe")]
    pub timeframe: Timeframe,
    /// 최소 신뢰도 재정의 (0.0 ~ 1.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_confidence: Option<f64>,
    /// 필요 컨플루언스 수 재정의
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_confluences: Option<u32>,
    /// 기본 손익비 재정의
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_reward_ratio: Option<f64>,
    /// 거래당 최대 리스크(%) 재정의
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_risk_percent: Option<f64>,
}

impl Default for DecisionSettings {
    fn default() -> Self {
        Self {
            timeframe: default_timeframe(),
            min_confidence: None,
            required_confluences: None,
            risk_reward_ratio: None,
            max_risk_percent: None,
        }
    }
}

/// 변화 감지 엔진 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChangeDetectionSettings {
    /// 감도 (low, medium, high)
    #[serde(default)]
    pub sensitivity: Sensitivity,
    /// 결과에 표시할 타임프레임
    #[serde(default = "default_timeframe")]
    pub timeframe: Timeframe,
}

impl Default for ChangeDetectionSettings {
    fn default() -> Self {
        Self {
            sensitivity: Sensitivity::default(),
            timeframe: default_timeframe(),
        }
    }
}

fn default_timeframe() -> Timeframe {
    Timeframe::M1
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// `path`가 `None`이면 기본값과 환경 변수만 사용합니다.
    pub fn load(path: Option<&Path>) -> ChartScanResult<Self> {
        let mut builder = config::Config::builder()
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?;

        if let Some(path) = path {
            if !path.exists() {
                return Err(ChartScanError::Config(format!(
                    "설정 파일을 찾을 수 없음: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(config::File::from(path));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("CHARTSCAN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn from_toml_str(contents: &str) -> ChartScanResult<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}
