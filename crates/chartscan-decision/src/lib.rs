//! 매매 결정과 스마트 변화 감지.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 패턴/프라이스 액션/컨플루언스 입력으로부터 매매 결정 생성
//! - 타임프레임별 결정 기준 프리셋
//! - 연속 분석 스냅샷 사이의 의미 있는 신호 변화 감지
//!
//! # 예제
//!
//! ```rust,ignore
//! use chartscan_decision::{DecisionEngine, SmartChangeDetector};
//! use chartscan_core::Timeframe;
//!
//! let engine = DecisionEngine::for_timeframe(Timeframe::M1);
//! let decision = engine.make_decision(&input);
//!
//! let mut detector = SmartChangeDetector::new();
//! let change = detector.detect_smart_changes(snapshot, &options);
//! ```

pub mod change_detection;
pub mod criteria;
pub mod engine;

// 주요 타입 재내보내기
pub use change_detection::{
    ChangeDetectionOptions, ChangeDetectionResult, ChangeType, HistoryStats, MarketImpact,
    SmartChangeDetector, HISTORY_CAPACITY,
};
pub use criteria::{CriteriaValidationError, DecisionCriteria};
pub use engine::{DecisionEngine, DecisionSignals, TradingAction, TradingDecision, Urgency};
