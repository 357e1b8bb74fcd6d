//! 변화 감지 명령어.
//!
//! 스냅샷 배열(JSON)을 하나의 감지기로 순서대로 재생하고 각 결과와 최종 이력 집계를 출력합니다.
//!
//! # 사용 예시
//!
//! ```bash
//! chartscan changes -i snapshots.json --sensitivity high
//! ```

use std::path::PathBuf;

use anyhow::{bail, Result};
use serde::Serialize;
use tracing::info;

use chartscan_core::AnalysisSnapshot;
use chartscan_decision::{
    ChangeDetectionOptions, ChangeDetectionResult, HistoryStats, SmartChangeDetector,
};

use super::read_json;

/// 변화 감지 CLI 설정
#[derive(Debug, Clone)]
pub struct ChangesConfig {
    /// 스냅샷 배열 JSON 경로
    pub input: PathBuf,
    /// 감지 옵션
    pub options: ChangeDetectionOptions,
}

/// 재생 결과
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeReport {
    /// 스냅샷별 감지 결과
    pub results: Vec<ChangeDetectionResult>,
    /// 최종 이력 집계
    pub history: HistoryStats,
}

impl ChangeReport {
    /// 유의미한 변화 수.
    pub fn significant_count(&self) -> usize {
        self.results.iter().filter(|r| r.significant_change).count()
    }
}

/// 스냅샷 파일을 재생합니다.
pub fn replay_changes(config: &ChangesConfig) -> Result<ChangeReport> {
    let snapshots: Vec<AnalysisSnapshot> = read_json(&config.input)?;
    if snapshots.is_empty() {
        bail!("No snapshots in {}", config.input.display());
    }

    let mut detector = SmartChangeDetector::new();
    let results: Vec<_> = snapshots
        .into_iter()
        .map(|snapshot| detector.detect_smart_changes(snapshot, &config.options))
        .collect();

    let report = ChangeReport {
        results,
        history: detector.history_stats(),
    };

    info!(
        snapshots = report.results.len(),
        significant = report.significant_count(),
        sensitivity = ?config.options.sensitivity,
        "Change replay finished"
    );

    Ok(report)
}
