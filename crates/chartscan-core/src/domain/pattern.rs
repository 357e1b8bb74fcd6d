//! 외부 패턴 인식 단계가 전달하는 입력 타입.
//!
//! 이 모듈의 타입은 분석 주기마다 새로 만들어지며 엔진은 이를 수정하지 않습니다:
//! - `PatternAction` - 패턴이 제안하는 방향 (compra / venda / neutro)
//! - `DetectedPattern` - 이름이 붙은 캔들/차트 패턴
//! - `PriceActionSignal` - 캔들 형태에서 유도된 방향성 신호
//! - `EntryRecommendation` - 진입/손절/목표가 제안
//! - `AnalysisInput` - 매매 결정 엔진에 들어가는 묶음

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 패턴이 제안하는 매매 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternAction {
    /// 매수
    Compra,
    /// 매도
    Venda,
    /// 중립
    #[default]
    Neutro,
}

impl PatternAction {
    /// 방향성이 있는 신호인지 확인합니다.
    pub fn is_directional(&self) -> bool {
        !matches!(self, PatternAction::Neutro)
    }

    /// 와이어 표기 문자열.
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternAction::Compra => "compra",
            PatternAction::Venda => "venda",
            PatternAction::Neutro => "neutro",
        }
    }
}

impl fmt::Display for PatternAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 외부 감지기가 찾은 패턴.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedPattern {
    /// 패턴 이름 (예: "Pin Bar", "Engolfo de Alta")
    #[serde(rename = "type")]
    pub pattern_type: String,
    /// 신뢰도 (0.0 ~ 1.0)
    pub confidence: f64,
    /// 제안 방향
    pub action: PatternAction,
    /// 설명
    #[serde(default)]
    pub description: String,
    /// 권장 사항
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl DetectedPattern {
    /// 새 패턴을 생성합니다. 신뢰도는 0..=1로 제한됩니다.
    pub fn new(pattern_type: impl Into<String>, confidence: f64, action: PatternAction) -> Self {
        Self {
            pattern_type: pattern_type.into(),
            confidence: confidence.clamp(0.0, 1.0),
            action,
            description: String::new(),
            recommendation: None,
        }
    }
}

/// 프라이스 액션 신호의 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceDirection {
    /// 상승
    Alta,
    /// 하락
    Baixa,
    /// 횡보
    Lateral,
}

/// 프라이스 액션 신호 강도.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalStrength {
    /// 강함
    Forte,
    /// 보통
    #[default]
    Moderada,
    /// 약함
    Fraca,
}

/// 캔들 형태에서 유도된 방향성 신호.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceActionSignal {
    /// 신호 이름
    #[serde(rename = "type")]
    pub signal_type: String,
    /// 방향
    pub direction: PriceDirection,
    /// 신뢰도 (0.0 ~ 1.0)
    pub confidence: f64,
    /// 강도
    #[serde(default)]
    pub strength: SignalStrength,
    /// 손익비
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_reward: Option<f64>,
    /// 설명
    #[serde(default)]
    pub description: String,
}

impl PriceActionSignal {
    /// 새 신호를 생성합니다.
    pub fn new(signal_type: impl Into<String>, direction: PriceDirection, confidence: f64) -> Self {
        Self {
            signal_type: signal_type.into(),
            direction,
            confidence: confidence.clamp(0.0, 1.0),
            strength: SignalStrength::default(),
            risk_reward: None,
            description: String::new(),
        }
    }

    /// 강도를 설정합니다.
    pub fn with_strength(mut self, strength: SignalStrength) -> Self {
        self.strength = strength;
        self
    }

    /// 손익비를 설정합니다.
    pub fn with_risk_reward(mut self, risk_reward: f64) -> Self {
        self.risk_reward = Some(risk_reward);
        self
    }
}

/// 외부 진입 추천 (가격 수준 포함).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRecommendation {
    /// 추천 방향
    pub action: PatternAction,
    /// 진입가
    pub entry_price: Decimal,
    /// 손절가
    pub stop_loss: Decimal,
    /// 목표가
    pub take_profit: Decimal,
    /// 손익비
    pub risk_reward: f64,
    /// 추천 신뢰도 (0.0 ~ 1.0)
    #[serde(default)]
    pub confidence: f64,
}

/// 매매 결정 엔진 입력 묶음.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisInput {
    /// 감지된 패턴
    #[serde(default)]
    pub patterns: Vec<DetectedPattern>,
    /// 프라이스 액션 신호
    #[serde(default)]
    pub price_action_signals: Vec<PriceActionSignal>,
    /// 컨플루언스 점수 (0 ~ 100)
    #[serde(default)]
    pub confluence_score: f64,
    /// 진입 추천
    #[serde(default)]
    pub entry_recommendations: Vec<EntryRecommendation>,
}

impl AnalysisInput {
    /// 패턴과 컨플루언스 점수로 입력을 생성합니다.
    pub fn new(patterns: Vec<DetectedPattern>, confluence_score: f64) -> Self {
        Self {
            patterns,
            confluence_score,
            ..Default::default()
        }
    }

    /// 프라이스 액션 신호를 설정합니다.
    pub fn with_price_action(mut self, signals: Vec<PriceActionSignal>) -> Self {
        self.price_action_signals = signals;
        self
    }

    /// 진입 추천을 추가합니다.
    pub fn with_entry(mut self, entry: EntryRecommendation) -> Self {
        self.entry_recommendations.push(entry);
        self
    }

    /// 패턴도 프라이스 액션 신호도 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty() && self.price_action_signals.is_empty()
    }
}
