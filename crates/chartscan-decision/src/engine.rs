//! 매매 결정 엔진.
//!
//! 외부 패턴 인식 단계의 결과(패턴, 프라이스 액션 신호, 컨플루언스 점수,
//! 진입 추천)를 하나의 [`TradingDecision`]으로 합성합니다.
//!
//! # 신뢰도 구성
//!
//! | 요소 | 가중치 |
//! |------|--------|
//! | 신호 강도 (패턴 0.6 + 프라이스 액션 0.4) | 0.4 |
//! | 컨플루언스 점수 / 100 | 0.3 |
//! | 방향 일관성 | 0.2 |
//! | 데이터 품질 | 0.1 |

use std::collections::HashSet;
use std::hash::Hash;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use chartscan_core::{
    analysis_span, AnalysisInput, DetectedPattern, EntryRecommendation, PatternAction,
    PriceActionSignal, PriceDirection, SignalStrength, Timeframe,
};

use crate::criteria::DecisionCriteria;

/// 결정 유효 기간 (분).
const DECISION_TTL_MINUTES: i64 = 5;
/// 방향 판정에 필요한 매수/매도 점수 차이.
const DIRECTION_THRESHOLD: f64 = 0.3;
/// 포지션 크기 상한 (계좌 대비 비율).
const MAX_POSITION_SIZE: f64 = 0.05;
const BASE_POSITION_SIZE: f64 = 0.01;

/// 매매 행동.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradingAction {
    Buy,
    Sell,
    Hold,
    Wait,
}

impl TradingAction {
    /// 진입 행동인지 확인합니다.
    pub fn is_entry(&self) -> bool {
        matches!(self, TradingAction::Buy | TradingAction::Sell)
    }

    fn entry_side(&self) -> Option<PatternAction> {
        match self {
            TradingAction::Buy => Some(PatternAction::Compra),
            TradingAction::Sell => Some(PatternAction::Venda),
            _ => None,
        }
    }
}

/// 결정 긴급도.
///
/// 신뢰도 0.8 / 0.6 경계는 기준과 무관한 고정 정책입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Urgency {
    High,
    Medium,
    Low,
}

impl Urgency {
    fn from_confidence(confidence: f64) -> Self {
        if confidence > 0.8 {
            Urgency::High
        } else if confidence > 0.6 {
            Urgency::Medium
        } else {
            Urgency::Low
        }
    }
}

/// 결정에 사용된 개별 신호 점수.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionSignals {
    /// 가중 합산 신호 강도 (0.0 ~ 1.0)
    pub technical: f64,
    /// 컨플루언스 점수 / 100
    pub confluence: f64,
    /// 프라이스 액션 강도 (0.0 ~ 1.0)
    pub price_action: f64,
}

/// 매매 결정.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingDecision {
    pub action: TradingAction,
    /// 종합 신뢰도 (0.0 ~ 1.0)
    pub confidence: f64,
    /// 결정 근거
    pub reasoning: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_reward: Option<f64>,
    /// 계좌 대비 포지션 크기 (0.0 ~ 0.05)
    pub position_size: f64,
    pub urgency: Urgency,
    /// 결정 만료 시각
    pub valid_until: DateTime<Utc>,
    pub signals: DecisionSignals,
}

/// 매수/매도 점수로 판정한 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Buy,
    Sell,
    Neutral,
}

impl Direction {
    fn label(&self) -> &'static str {
        match self {
            Direction::Buy => "compra",
            Direction::Sell => "venda",
            Direction::Neutral => "neutra",
        }
    }
}

/// 신호 강도 구성 요소.
#[derive(Debug, Clone, Copy)]
struct Strength {
    patterns: f64,
    price_action: f64,
    combined: f64,
}

/// 매매 결정 엔진.
///
/// 생성 후 불변이며 여러 스레드에서 공유해 사용할 수 있습니다.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    criteria: DecisionCriteria,
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new(DecisionCriteria::default())
    }
}

impl DecisionEngine {
    /// 주어진 기준으로 엔진을 생성합니다.
    pub fn new(criteria: DecisionCriteria) -> Self {
        Self { criteria }
    }

    /// 타임프레임 프리셋으로 엔진을 생성합니다.
    pub fn for_timeframe(timeframe: Timeframe) -> Self {
        Self::new(DecisionCriteria::for_timeframe(timeframe))
    }

    /// 현재 기준.
    pub fn criteria(&self) -> &DecisionCriteria {
        &self.criteria
    }

    /// 현재 시각 기준으로 결정을 생성합니다.
    pub fn make_decision(&self, input: &AnalysisInput) -> TradingDecision {
        self.make_decision_at(input, Utc::now())
    }

    /// 지정한 시각 기준으로 결정을 생성합니다.
    ///
    /// 시각은 `valid_until`에만 영향을 주며, 나머지 필드는 입력에 대해 결정적입니다.
    pub fn make_decision_at(&self, input: &AnalysisInput, now: DateTime<Utc>) -> TradingDecision {
        let span = analysis_span!("make_decision", timeframe = self.criteria.timeframe.as_str());
        let _guard = span.enter();

        let strength = signal_strength(&input.patterns, &input.price_action_signals);
        let direction = direction(&input.patterns, &input.price_action_signals);
        let confidence = total_confidence(strength.combined, input);

        let confidence_ok = confidence >= self.criteria.min_confidence;
        let confluence_ok = input.confluence_score >= self.criteria.min_confluence_score();

        let action = match (confidence_ok && confluence_ok, direction) {
            (true, Direction::Buy) => TradingAction::Buy,
            (true, Direction::Sell) => TradingAction::Sell,
            (true, Direction::Neutral) => TradingAction::Hold,
            (false, _) => TradingAction::Wait,
        };

        let urgency = if action.is_entry() {
            Urgency::from_confidence(confidence)
        } else {
            Urgency::Low
        };

        let entry = action
            .entry_side()
            .and_then(|side| best_entry(&input.entry_recommendations, side));

        let risk_reward = if action.is_entry() {
            Some(
                entry
                    .map(|e| e.risk_reward)
                    .unwrap_or(self.criteria.risk_reward_ratio),
            )
        } else {
            None
        };

        let position_size = if action.is_entry() {
            (BASE_POSITION_SIZE + confidence * 0.04).min(MAX_POSITION_SIZE)
        } else {
            0.0
        };

        let reasoning = self.reasoning(
            input,
            &strength,
            direction,
            confidence,
            action,
            (confidence_ok, confluence_ok),
        );

        debug!(
            action = ?action,
            confidence,
            strength = strength.combined,
            confluence = input.confluence_score,
            direction = direction.label(),
            "Decision computed"
        );
        if action.is_entry() {
            info!(action = ?action, confidence, urgency = ?urgency, position_size, "Entry decision");
        }

        TradingDecision {
            action,
            confidence,
            reasoning,
            entry_price: entry.map(|e| e.entry_price),
            stop_loss: entry.map(|e| e.stop_loss),
            take_profit: entry.map(|e| e.take_profit),
            risk_reward,
            position_size,
            urgency,
            valid_until: now + Duration::minutes(DECISION_TTL_MINUTES),
            signals: DecisionSignals {
                technical: strength.combined,
                confluence: (input.confluence_score / 100.0).clamp(0.0, 1.0),
                price_action: strength.price_action,
            },
        }
    }

    fn reasoning(
        &self,
        input: &AnalysisInput,
        strength: &Strength,
        direction: Direction,
        confidence: f64,
        action: TradingAction,
        (confidence_ok, confluence_ok): (bool, bool),
    ) -> Vec<String> {
        let mut lines = Vec::new();

        if input.is_empty() {
            lines.push("Nenhum padrão ou sinal de price action disponível".to_string());
        }

        lines.push(format!(
            "Força do sinal: {:.0}% (padrões {:.0}%, price action {:.0}%)",
            strength.combined * 100.0,
            strength.patterns * 100.0,
            strength.price_action * 100.0
        ));
        lines.push(format!(
            "Confluência: {:.0}/100 (mínimo {:.0})",
            input.confluence_score,
            self.criteria.min_confluence_score()
        ));
        lines.push(format!("Direção predominante: {}", direction.label()));

        match action {
            TradingAction::Buy | TradingAction::Sell => {
                lines.push(format!(
                    "Entrada de {} com confiança de {:.0}%",
                    direction.label(),
                    confidence * 100.0
                ));
                lines.push(format!(
                    "Risco máximo por operação: {:.1}%",
                    self.criteria.max_risk_percent
                ));
            }
            TradingAction::Hold => {
                lines.push("Sinais sem direção definida - manter posição atual".to_string());
            }
            TradingAction::Wait => {
                if !confidence_ok {
                    lines.push(format!(
                        "Confiança baixa: {:.0}% (mínimo {:.0}%)",
                        confidence * 100.0,
                        self.criteria.min_confidence * 100.0
                    ));
                }
                if !confluence_ok {
                    lines.push(format!(
                        "Confluência insuficiente: {:.0} (mínimo {:.0})",
                        input.confluence_score,
                        self.criteria.min_confluence_score()
                    ));
                }
                lines.push("Aguardar melhores condições de entrada".to_string());
            }
        }

        lines
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn pattern_score(pattern: &DetectedPattern) -> f64 {
    let c = pattern.confidence;
    let mut score = c;
    if c > 0.8 {
        score += 0.1;
    }
    if c > 0.9 {
        score += 0.1;
    }
    if pattern.pattern_type.contains("Engolfo") || pattern.pattern_type.contains("Pin Bar") {
        score += 0.05;
    }
    score.min(1.0)
}

fn price_action_score(signal: &PriceActionSignal) -> f64 {
    let mut score = signal.confidence;
    if signal.strength == SignalStrength::Forte {
        score += 0.15;
    }
    if signal.risk_reward.is_some_and(|rr| rr > 2.0) {
        score += 0.1;
    }
    score.min(1.0)
}

fn signal_strength(patterns: &[DetectedPattern], signals: &[PriceActionSignal]) -> Strength {
    let patterns = mean(patterns.iter().map(pattern_score));
    let price_action = mean(signals.iter().map(price_action_score));
    Strength {
        patterns,
        price_action,
        combined: patterns * 0.6 + price_action * 0.4,
    }
}

fn direction(patterns: &[DetectedPattern], signals: &[PriceActionSignal]) -> Direction {
    let mut buy: f64 = 0.0;
    let mut sell: f64 = 0.0;

    for pattern in patterns {
        match pattern.action {
            PatternAction::Compra => buy += pattern.confidence,
            PatternAction::Venda => sell += pattern.confidence,
            PatternAction::Neutro => {}
        }
    }
    for signal in signals {
        match signal.direction {
            PriceDirection::Alta => buy += signal.confidence,
            PriceDirection::Baixa => sell += signal.confidence,
            PriceDirection::Lateral => {}
        }
    }

    if (buy - sell).abs() < DIRECTION_THRESHOLD {
        Direction::Neutral
    } else if buy > sell {
        Direction::Buy
    } else {
        Direction::Sell
    }
}

/// 고유 값이 하나 이하이면 1.0, 아니면 0.5.
fn unanimity<T: Eq + Hash>(values: impl Iterator<Item = T>) -> f64 {
    if values.collect::<HashSet<_>>().len() <= 1 {
        1.0
    } else {
        0.5
    }
}

fn consistency(patterns: &[DetectedPattern], signals: &[PriceActionSignal]) -> f64 {
    let actions = unanimity(patterns.iter().map(|p| p.action));
    let directions = unanimity(signals.iter().map(|s| s.direction));
    (actions + directions) / 2.0
}

fn data_quality(patterns: &[DetectedPattern], signals: &[PriceActionSignal]) -> f64 {
    let mut quality: f64 = 0.5;
    if patterns.len() >= 2 {
        quality += 0.2;
    }
    if !signals.is_empty() {
        quality += 0.2;
    }
    if mean(patterns.iter().map(|p| p.confidence)) > 0.7 {
        quality += 0.1;
    }
    quality.min(1.0)
}

fn total_confidence(strength: f64, input: &AnalysisInput) -> f64 {
    let patterns = &input.patterns;
    let signals = &input.price_action_signals;

    let total = strength * 0.4
        + (input.confluence_score / 100.0) * 0.3
        + consistency(patterns, signals) * 0.2
        + data_quality(patterns, signals) * 0.1;
    total.clamp(0.0, 1.0)
}

/// 방향이 일치하는 추천 중 신뢰도가 가장 높은 것 (동률이면 먼저 나온 것).
fn best_entry(
    entries: &[EntryRecommendation],
    side: PatternAction,
) -> Option<&EntryRecommendation> {
    entries
        .iter()
        .filter(|e| e.action == side)
        .fold(None, |best: Option<&EntryRecommendation>, e| match best {
            Some(b) if b.confidence >= e.confidence => Some(b),
            _ => Some(e),
        })
}
