//! 스마트 변화 감지.
//!
//! 연속된 분석 스냅샷을 최대 [`HISTORY_CAPACITY`]개까지 보관하고, 새 스냅샷을
//! 직전 스냅샷과 비교하여 변화의 유형, 강도, 신뢰도, 시장 영향을 판정합니다.
//!
//! # 판정 순서
//!
//! 1. 변화 강도: 신호 전환, 신뢰도/컨플루언스 변화량, 새 패턴 수를 합산 후 감도 배율 적용
//! 2. 변화 유형: breakout → reversal → momentum_shift → continuation → consolidation
//! 3. 감지 신뢰도: 신호 전환과 강도 가산, 최근 일관성 보너스, 잦은 전환 감점
//! 4. 시장 영향과 매매 권장 문구

use std::collections::{HashSet, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use chartscan_core::{
    AnalysisSnapshot, ChangeDetectionSettings, PatternAction, Sensitivity, Timeframe,
};

/// 보관하는 스냅샷 최대 개수.
pub const HISTORY_CAPACITY: usize = 10;

/// 일관성 보너스에 사용하는 최근 스냅샷 수.
const CONSISTENCY_WINDOW: usize = 3;
/// 잦은 전환 감점에 사용하는 최근 스냅샷 수.
const NOISE_WINDOW: usize = 5;
const NOISE_FLIPS: usize = 3;
const NOISE_PENALTY: f64 = 0.7;

const DEFAULT_CONFIDENCE: f64 = 0.3;

const REC_INSUFFICIENT_HISTORY: &str = "Histórico insuficiente - aguardando mais dados";
const REC_LOW_CONFIDENCE: &str = "Aguardar confirmação - sinal de baixa confiança";

/// 변화 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// 중립에서 방향성 신호로 전환
    Breakout,
    /// 매수/매도 간 전환
    Reversal,
    /// 신호 유지, 추세 지속
    Continuation,
    /// 중립 유지
    Consolidation,
    /// 신호 유지, 신뢰도 급변
    MomentumShift,
}

/// 시장 영향도.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketImpact {
    High,
    Medium,
    Low,
}

/// 변화 감지 옵션.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeDetectionOptions {
    #[serde(default)]
    pub sensitivity: Sensitivity,
    #[serde(default = "default_timeframe")]
    pub timeframe: Timeframe,
}

fn default_timeframe() -> Timeframe {
    Timeframe::M1
}

impl Default for ChangeDetectionOptions {
    fn default() -> Self {
        Self {
            sensitivity: Sensitivity::default(),
            timeframe: default_timeframe(),
        }
    }
}

impl ChangeDetectionOptions {
    /// 설정 파일의 변화 감지 섹션에서 옵션을 만듭니다.
    pub fn from_settings(settings: &ChangeDetectionSettings) -> Self {
        Self {
            sensitivity: settings.sensitivity,
            timeframe: settings.timeframe,
        }
    }

    /// 감도를 설정합니다.
    pub fn with_sensitivity(mut self, sensitivity: Sensitivity) -> Self {
        self.sensitivity = sensitivity;
        self
    }
}

/// 변화 감지 결과.
///
/// `significant_change`는 `change_strength > 0.5`이고 `confidence > 0.6`일 때만 참입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeDetectionResult {
    pub significant_change: bool,
    pub change_type: ChangeType,
    /// 변화 강도 (0.0 ~ 1.0)
    pub change_strength: f64,
    /// 감지 신뢰도 (0.0 ~ 1.0)
    pub confidence: f64,
    pub timeframe: Timeframe,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_signal: Option<PatternAction>,
    pub current_signal: PatternAction,
    pub market_impact: MarketImpact,
    pub trading_recommendation: String,
}

impl ChangeDetectionResult {
    /// 비교할 이력이 부족할 때의 기본 결과.
    fn insufficient_history(current: PatternAction, timeframe: Timeframe) -> Self {
        Self {
            significant_change: false,
            change_type: ChangeType::Consolidation,
            change_strength: 0.0,
            confidence: DEFAULT_CONFIDENCE,
            timeframe,
            previous_signal: None,
            current_signal: current,
            market_impact: MarketImpact::Low,
            trading_recommendation: REC_INSUFFICIENT_HISTORY.to_string(),
        }
    }
}

/// 보관 중인 이력의 집계.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub total_snapshots: usize,
    /// 인접 스냅샷 간 신호 전환 횟수
    pub signal_changes: usize,
    pub buy_signals: usize,
    pub sell_signals: usize,
    pub neutral_signals: usize,
    pub average_confidence: f64,
    pub average_confluence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oldest: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub newest: Option<DateTime<Utc>>,
}

/// 스냅샷 이력을 소유하는 변화 감지기.
///
/// `&mut self`로만 변경되므로 여러 스레드에서 공유하려면 호출자가 `Mutex` 등으로 감싸야 합니다.
#[derive(Debug, Clone, Default)]
pub struct SmartChangeDetector {
    history: VecDeque<AnalysisSnapshot>,
}

impl SmartChangeDetector {
    /// 빈 이력으로 감지기를 생성합니다.
    pub fn new() -> Self {
        Self {
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// 새 스냅샷을 이력에 추가하고 직전 스냅샷과 비교합니다.
    pub fn detect_smart_changes(
        &mut self,
        current: AnalysisSnapshot,
        options: &ChangeDetectionOptions,
    ) -> ChangeDetectionResult {
        self.push(current);

        let len = self.history.len();
        if len < 2 {
            let signal = self.history.back().map(|s| s.signal).unwrap_or_default();
            debug!(history = len, "Insufficient history for change detection");
            return ChangeDetectionResult::insufficient_history(signal, options.timeframe);
        }

        let current = &self.history[len - 1];
        let previous = &self.history[len - 2];

        let signal_changed = current.signal != previous.signal;
        let confidence_delta = (current.confidence - previous.confidence).abs();

        let strength = change_strength(previous, current, options.sensitivity);
        let change_type = classify_change(previous.signal, current.signal, confidence_delta);
        let confidence = self.detection_confidence(signal_changed, strength);
        let impact = market_impact(change_type, strength, confidence);
        let significant_change = strength > 0.5 && confidence > 0.6;

        let trading_recommendation = if confidence < 0.5 {
            REC_LOW_CONFIDENCE
        } else {
            recommendation(change_type, impact)
        };

        if significant_change {
            info!(
                change_type = ?change_type,
                strength,
                confidence,
                impact = ?impact,
                from = previous.signal.as_str(),
                to = current.signal.as_str(),
                "Significant market change detected"
            );
        } else {
            debug!(change_type = ?change_type, strength, confidence, "No significant change");
        }

        ChangeDetectionResult {
            significant_change,
            change_type,
            change_strength: strength,
            confidence,
            timeframe: options.timeframe,
            previous_signal: Some(previous.signal),
            current_signal: current.signal,
            market_impact: impact,
            trading_recommendation: trading_recommendation.to_string(),
        }
    }

    /// 이력을 비웁니다.
    pub fn clear_analysis_history(&mut self) {
        self.history.clear();
    }

    /// 이력 집계를 계산합니다. 상태를 변경하지 않습니다.
    pub fn history_stats(&self) -> HistoryStats {
        let total = self.history.len();
        if total == 0 {
            return HistoryStats::default();
        }

        let count = |signal: PatternAction| {
            self.history
                .iter()
                .filter(|s| s.signal == signal)
                .count()
        };

        HistoryStats {
            total_snapshots: total,
            signal_changes: flips(self.history.iter()),
            buy_signals: count(PatternAction::Compra),
            sell_signals: count(PatternAction::Venda),
            neutral_signals: count(PatternAction::Neutro),
            average_confidence: self.history.iter().map(|s| s.confidence).sum::<f64>()
                / total as f64,
            average_confluence: self.history.iter().map(|s| s.confluence).sum::<f64>()
                / total as f64,
            oldest: self.history.front().map(|s| s.timestamp),
            newest: self.history.back().map(|s| s.timestamp),
        }
    }

    /// 보관 중인 스냅샷 수.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// 이력이 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// 오래된 순서의 스냅샷 이력.
    pub fn history(&self) -> impl Iterator<Item = &AnalysisSnapshot> {
        self.history.iter()
    }

    fn push(&mut self, snapshot: AnalysisSnapshot) {
        if self.history.len() == HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(snapshot);
    }

    fn detection_confidence(&self, signal_changed: bool, strength: f64) -> f64 {
        let mut confidence: f64 = 0.5;
        if signal_changed {
            confidence += 0.3;
        }
        if strength > 0.7 {
            confidence += 0.2;
        }

        if self.history.len() >= CONSISTENCY_WINDOW {
            if let Some(current) = self.history.back() {
                let agreeing = self
                    .history
                    .iter()
                    .rev()
                    .take(CONSISTENCY_WINDOW)
                    .filter(|s| s.signal == current.signal)
                    .count();
                confidence += 0.15 * agreeing as f64 / CONSISTENCY_WINDOW as f64;
            }
        }

        let skip = self.history.len().saturating_sub(NOISE_WINDOW);
        if flips(self.history.iter().skip(skip)) >= NOISE_FLIPS {
            confidence *= NOISE_PENALTY;
        }

        confidence.clamp(0.1, 1.0)
    }
}

/// 인접 스냅샷 간 신호 전환 횟수.
fn flips<'a>(snapshots: impl Iterator<Item = &'a AnalysisSnapshot>) -> usize {
    let mut previous: Option<PatternAction> = None;
    let mut count = 0;
    for snapshot in snapshots {
        if previous.is_some_and(|p| p != snapshot.signal) {
            count += 1;
        }
        previous = Some(snapshot.signal);
    }
    count
}

fn change_strength(
    previous: &AnalysisSnapshot,
    current: &AnalysisSnapshot,
    sensitivity: Sensitivity,
) -> f64 {
    let mut strength: f64 = 0.0;

    if current.signal != previous.signal {
        strength += 0.4;
    }
    strength += ((current.confidence - previous.confidence).abs() * 0.5).min(0.25);
    strength += ((current.confluence - previous.confluence).abs() / 100.0 * 0.4).min(0.2);

    let known: HashSet<&str> = previous.patterns.iter().map(String::as_str).collect();
    let new_patterns = current
        .patterns
        .iter()
        .filter(|p| !known.contains(p.as_str()))
        .count();
    strength += (new_patterns as f64 * 0.05).min(0.15);

    (strength * sensitivity.multiplier()).min(1.0)
}

fn classify_change(
    previous: PatternAction,
    current: PatternAction,
    confidence_delta: f64,
) -> ChangeType {
    let changed = previous != current;

    if previous == PatternAction::Neutro && current.is_directional() {
        ChangeType::Breakout
    } else if changed && previous.is_directional() && current.is_directional() {
        ChangeType::Reversal
    } else if !changed && confidence_delta > 0.3 {
        ChangeType::MomentumShift
    } else if !changed && current.is_directional() {
        ChangeType::Continuation
    } else {
        ChangeType::Consolidation
    }
}

fn market_impact(change_type: ChangeType, strength: f64, confidence: f64) -> MarketImpact {
    let decisive = matches!(change_type, ChangeType::Breakout | ChangeType::Reversal);

    if (decisive && strength > 0.7)
        || (change_type == ChangeType::MomentumShift && confidence > 0.8)
    {
        MarketImpact::High
    } else if strength > 0.5 && confidence > 0.6 {
        MarketImpact::Medium
    } else {
        MarketImpact::Low
    }
}

fn recommendation(change_type: ChangeType, impact: MarketImpact) -> &'static str {
    use ChangeType::*;
    use MarketImpact::*;

    match (change_type, impact) {
        (Breakout, High) => "ENTRADA FORTE - rompimento confirmado",
        (Breakout, Medium) => "Entrada moderada - rompimento em formação",
        (Breakout, Low) => "Observar - possível rompimento",
        (Reversal, High) => "REVERSÃO FORTE - considerar inverter a posição",
        (Reversal, Medium) => "Possível reversão - reduzir exposição",
        (Reversal, Low) => "Sinal de reversão fraco - monitorar",
        (MomentumShift, High) => "Mudança forte de momentum - ajustar stops",
        (MomentumShift, Medium) => "Momentum alterado - acompanhar de perto",
        (MomentumShift, Low) => "Leve mudança de momentum",
        (Continuation, High | Medium) => "Tendência mantida - manter posição",
        (Continuation, Low) => "Continuação fraca - manter com cautela",
        (Consolidation, _) => "Mercado em consolidação - aguardar definição",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(signal: PatternAction, confidence: f64, confluence: f64) -> AnalysisSnapshot {
        AnalysisSnapshot::new(signal, confidence, confluence)
    }

    #[test]
    fn test_first_snapshot_returns_default() {
        let mut detector = SmartChangeDetector::new();
        let result = detector.detect_smart_changes(
            snap(PatternAction::Compra, 0.8, 70.0),
            &ChangeDetectionOptions::default(),
        );

        assert!(!result.significant_change);
        assert_eq!(result.change_type, ChangeType::Consolidation);
        assert_eq!(result.change_strength, 0.0);
        assert_eq!(result.confidence, 0.3);
        assert_eq!(result.market_impact, MarketImpact::Low);
        assert_eq!(result.previous_signal, None);
        assert_eq!(result.trading_recommendation, REC_INSUFFICIENT_HISTORY);
        assert_eq!(detector.len(), 1);
    }

    #[test]
    fn test_classify_change_priority() {
        use PatternAction::*;
        assert_eq!(classify_change(Neutro, Compra, 0.0), ChangeType::Breakout);
        assert_eq!(classify_change(Compra, Venda, 0.5), ChangeType::Reversal);
        assert_eq!(classify_change(Venda, Venda, 0.4), ChangeType::MomentumShift);
        assert_eq!(classify_change(Venda, Venda, 0.1), ChangeType::Continuation);
        assert_eq!(classify_change(Neutro, Neutro, 0.5), ChangeType::MomentumShift);
        assert_eq!(classify_change(Neutro, Neutro, 0.1), ChangeType::Consolidation);
        assert_eq!(classify_change(Compra, Neutro, 0.1), ChangeType::Consolidation);
    }

    #[test]
    fn test_strength_counts_new_patterns() {
        let previous = snap(PatternAction::Compra, 0.7, 60.0).with_patterns(["Martelo"]);
        let current = snap(PatternAction::Compra, 0.7, 60.0)
            .with_patterns(["Martelo", "Pin Bar", "Engolfo de Alta"]);

        let strength = change_strength(&previous, &current, Sensitivity::Medium);
        assert!((strength - 0.10).abs() < 1e-9);
    }

    #[test]
    fn test_strength_scales_with_sensitivity() {
        let previous = snap(PatternAction::Neutro, 0.4, 30.0);
        let current = snap(PatternAction::Compra, 0.5, 40.0);

        let low = change_strength(&previous, &current, Sensitivity::Low);
        let medium = change_strength(&previous, &current, Sensitivity::Medium);
        let high = change_strength(&previous, &current, Sensitivity::High);

        // 0.4 + 0.05 + 0.04
        assert!((medium - 0.49).abs() < 1e-9);
        assert!((low - 0.49 * 0.8).abs() < 1e-9);
        assert!((high - 0.49 * 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_strength_is_capped() {
        let previous = snap(PatternAction::Venda, 0.1, 0.0);
        let current = snap(PatternAction::Compra, 1.0, 100.0).with_patterns(["A", "B", "C", "D"]);
        assert_eq!(change_strength(&previous, &current, Sensitivity::High), 1.0);
    }

    #[test]
    fn test_noise_penalty_on_frequent_flips() {
        let mut detector = SmartChangeDetector::new();
        let options = ChangeDetectionOptions::default();
        let signals = [
            PatternAction::Compra,
            PatternAction::Venda,
            PatternAction::Compra,
            PatternAction::Venda,
        ];
        let mut last = None;
        for signal in signals {
            last = Some(detector.detect_smart_changes(snap(signal, 0.6, 50.0), &options));
        }
        let result = last.unwrap();

        // (0.5 + 0.3 + 0.15 * 2/3) * 0.7
        assert_eq!(result.change_type, ChangeType::Reversal);
        assert!((result.confidence - 0.63).abs() < 1e-9);
        assert_eq!(result.market_impact, MarketImpact::Low);
        assert!(!result.significant_change);
    }

    #[test]
    fn test_recommendation_override_below_half() {
        let mut detector = SmartChangeDetector::new();
        let options = ChangeDetectionOptions::default();
        let mut last = None;
        for signal in [
            PatternAction::Compra,
            PatternAction::Venda,
            PatternAction::Compra,
            PatternAction::Venda,
            PatternAction::Venda,
        ] {
            last = Some(detector.detect_smart_changes(snap(signal, 0.6, 50.0), &options));
        }
        let result = last.unwrap();
        assert_eq!(detector.history_stats().signal_changes, 3);

        // 신호 유지, 최근 3개 중 2개 일치, 3회 전환: (0.5 + 0.1) * 0.7
        assert_eq!(result.change_type, ChangeType::Continuation);
        assert!((result.confidence - 0.42).abs() < 1e-9);
        assert_eq!(result.trading_recommendation, REC_LOW_CONFIDENCE);
    }

    #[test]
    fn test_history_stats_is_pure() {
        let mut detector = SmartChangeDetector::new();
        let options = ChangeDetectionOptions::default();
        detector.detect_smart_changes(snap(PatternAction::Compra, 0.6, 40.0), &options);
        detector.detect_smart_changes(snap(PatternAction::Neutro, 0.4, 60.0), &options);

        let first = detector.history_stats();
        let second = detector.history_stats();
        assert_eq!(first, second);
        assert_eq!(first.total_snapshots, 2);
        assert_eq!(first.buy_signals, 1);
        assert_eq!(first.neutral_signals, 1);
        assert_eq!(first.sell_signals, 0);
        assert_eq!(first.signal_changes, 1);
        assert!((first.average_confidence - 0.5).abs() < 1e-9);
        assert!((first.average_confluence - 50.0).abs() < 1e-9);
        assert_eq!(detector.len(), 2);
    }

    #[test]
    fn test_empty_stats() {
        let detector = SmartChangeDetector::new();
        let stats = detector.history_stats();
        assert_eq!(stats, HistoryStats::default());
        assert!(detector.is_empty());
    }

    #[test]
    fn test_wire_format() {
        let mut detector = SmartChangeDetector::new();
        let options = ChangeDetectionOptions::default();
        detector.detect_smart_changes(snap(PatternAction::Neutro, 0.4, 30.0), &options);
        let result =
            detector.detect_smart_changes(snap(PatternAction::Compra, 0.8, 75.0), &options);
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["changeType"], "breakout");
        assert_eq!(value["marketImpact"], "high");
        assert_eq!(value["previousSignal"], "neutro");
        assert_eq!(value["currentSignal"], "compra");
        assert_eq!(value["timeframe"], "1m");
    }
}
