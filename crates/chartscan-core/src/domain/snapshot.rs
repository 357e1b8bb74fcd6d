//! 변화 감지 엔진이 보관하는 분석 스냅샷.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PatternAction;

/// 한 시점의 분석 요약.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSnapshot {
    /// 분석 시각
    pub timestamp: DateTime<Utc>,
    /// 종합 신호
    pub signal: PatternAction,
    /// 신호 신뢰도 (0.0 ~ 1.0)
    pub confidence: f64,
    /// 감지된 패턴 이름
    #[serde(default)]
    pub patterns: Vec<String>,
    /// 컨플루언스 점수 (0 ~ 100)
    pub confluence: f64,
    /// 프라이스 액션 요약
    #[serde(default)]
    pub price_action: String,
    /// 시장 국면
    #[serde(default)]
    pub market_phase: String,
    /// 추세
    #[serde(default)]
    pub trend: String,
    /// 거래량 (선택)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    /// 변동성 (선택)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volatility: Option<f64>,
}

impl AnalysisSnapshot {
    /// 현재 시각으로 스냅샷을 생성합니다.
    pub fn new(signal: PatternAction, confidence: f64, confluence: f64) -> Self {
        Self::at(Utc::now(), signal, confidence, confluence)
    }

    /// 지정한 시각으로 스냅샷을 생성합니다.
    pub fn at(
        timestamp: DateTime<Utc>,
        signal: PatternAction,
        confidence: f64,
        confluence: f64,
    ) -> Self {
        Self {
            timestamp,
            signal,
            confidence,
            patterns: Vec::new(),
            confluence,
            price_action: String::new(),
            market_phase: String::new(),
            trend: String::new(),
            volume: None,
            volatility: None,
        }
    }

    /// 패턴 이름 목록을 설정합니다.
    pub fn with_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patterns = patterns.into_iter().map(Into::into).collect();
        self
    }
}

/// 변화 감지 감도.
///
/// 변화 강도에 곱해지는 배율을 결정합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    /// 둔감 (x0.8)
    Low,
    /// 기본 (x1.0)
    #[default]
    Medium,
    /// 민감 (x1.2)
    High,
}

impl Sensitivity {
    /// 변화 강도 배율.
    pub fn multiplier(&self) -> f64 {
        match self {
            Sensitivity::Low => 0.8,
            Sensitivity::Medium => 1.0,
            Sensitivity::High => 1.2,
        }
    }
}

impl std::str::FromStr for Sensitivity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("Unknown sensitivity: {}", s)),
        }
    }
}
