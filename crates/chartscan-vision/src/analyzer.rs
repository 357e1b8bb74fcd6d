//! 픽셀 기반 차트 유효성 분석.
//!
//! 스캐너, 캔들 감지기, 품질 점수를 묶어 [`ChartPixelAnalysis`]를 만듭니다.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use chartscan_core::analysis_span;

use crate::buffer::PixelBuffer;
use crate::candles::{detect_candles, CandleDetection};
use crate::quality::{self, ChartQuality, QualityInputs};
use crate::scanner::{
    analyze_colors, classify_background, detect_grid, detect_price_axis, detect_time_axis,
    AxisDetection, ColorAnalysis, GridDetection,
};

/// 픽셀 분석 결과.
///
/// `has_valid_chart`는 `confidence > 60`이고 캔들과 그리드가 모두 감지된 경우에만 참입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPixelAnalysis {
    pub has_valid_chart: bool,
    pub chart_quality: ChartQuality,
    /// 신뢰도 (0 ~ 100)
    pub confidence: u32,
    pub candle_detection: CandleDetection,
    pub grid_detection: GridDetection,
    pub price_axis_detection: AxisDetection,
    pub time_axis_detection: AxisDetection,
    pub color_analysis: ColorAnalysis,
    pub recommendations: Vec<String>,
}

impl ChartPixelAnalysis {
    /// 픽셀을 읽을 수 없을 때의 결과: 모든 값이 0이고 진단 문구 하나를 가집니다.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            has_valid_chart: false,
            chart_quality: ChartQuality::NaoDetectado,
            confidence: 0,
            candle_detection: CandleDetection::default(),
            grid_detection: GridDetection::default(),
            price_axis_detection: AxisDetection::default(),
            time_axis_detection: AxisDetection::default(),
            color_analysis: ColorAnalysis::default(),
            recommendations: vec![reason.into()],
        }
    }

    /// 감지된 캔들 수.
    pub fn candle_count(&self) -> usize {
        self.candle_detection.count
    }
}

/// 버퍼 전체에 대해 픽셀 분석 파이프라인을 실행합니다.
pub fn analyze_chart_pixels(buffer: &PixelBuffer<'_>) -> ChartPixelAnalysis {
    let span = analysis_span!(
        "analyze_chart_pixels",
        width = buffer.width(),
        height = buffer.height()
    );
    let _guard = span.enter();

    let background = classify_background(buffer);
    let grid = detect_grid(buffer, &background);
    let price_axis = detect_price_axis(buffer);
    let time_axis = detect_time_axis(buffer);
    let colors = analyze_colors(buffer, &background);
    let candles = detect_candles(buffer);

    let inputs = QualityInputs {
        candles: &candles,
        grid: &grid,
        price_axis: &price_axis,
        time_axis: &time_axis,
        colors: &colors,
    };
    let confidence = quality::score(&inputs);
    let has_valid_chart = quality::is_valid_chart(confidence, candles.detected, grid.detected);
    let chart_quality =
        quality::classify(confidence, candles.quality, candles.detected, grid.detected);
    let recommendations = quality::recommendations(has_valid_chart, confidence, &inputs);

    debug!(
        confidence,
        quality = ?chart_quality,
        candles = candles.count,
        grid_h = grid.horizontal_lines,
        grid_v = grid.vertical_lines,
        background = ?background.background_type,
        "Chart pixel analysis complete"
    );

    ChartPixelAnalysis {
        has_valid_chart,
        chart_quality,
        confidence,
        candle_detection: candles,
        grid_detection: grid,
        price_axis_detection: price_axis,
        time_axis_detection: time_axis,
        color_analysis: colors,
        recommendations,
    }
}

/// 원시 RGBA 바이트를 분석합니다.
///
/// 버퍼가 잘못되었으면 에러 대신 [`ChartPixelAnalysis::unavailable`]을 반환합니다.
pub fn analyze_rgba(width: usize, height: usize, data: &[u8]) -> ChartPixelAnalysis {
    match PixelBuffer::new(width, height, data) {
        Ok(buffer) => analyze_chart_pixels(&buffer),
        Err(err) => {
            warn!(width, height, len = data.len(), error = %err, "Pixel buffer unavailable");
            ChartPixelAnalysis::unavailable(format!(
                "Não foi possível ler os pixels da imagem: {}",
                err
            ))
        }
    }
}
