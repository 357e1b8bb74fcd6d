//! 매매 결정 명령어.
//!
//! 외부 패턴 인식 결과(JSON)를 읽어 매매 결정을 출력합니다.
//!
//! # 사용 예시
//!
//! ```bash
//! # 설정 파일의 타임프레임 사용
//! chartscan decide -i analysis.json
//!
//! # 5분봉 기준으로 결정
//! chartscan decide -i analysis.json -t 5m
//! ```

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use tracing::info;

use chartscan_core::AnalysisInput;
use chartscan_decision::{DecisionCriteria, DecisionEngine, TradingDecision};

use super::read_json;

/// 매매 결정 CLI 설정
#[derive(Debug, Clone)]
pub struct DecideConfig {
    /// 분석 결과 JSON 경로
    pub input: PathBuf,
    /// 결정 기준
    pub criteria: DecisionCriteria,
}

/// 분석 결과 파일로 매매 결정을 생성합니다.
pub fn run_decision(config: &DecideConfig) -> Result<TradingDecision> {
    config
        .criteria
        .validate()
        .map_err(|e| anyhow!("Invalid decision criteria: {}", e))?;

    let input: AnalysisInput = read_json(&config.input)?;
    info!(
        patterns = input.patterns.len(),
        signals = input.price_action_signals.len(),
        confluence = input.confluence_score,
        timeframe = %config.criteria.timeframe,
        "Running decision engine"
    );

    let engine = DecisionEngine::new(config.criteria.clone());
    Ok(engine.make_decision(&input))
}
