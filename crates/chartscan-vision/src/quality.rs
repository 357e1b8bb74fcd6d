//! 차트 품질 점수.
//!
//! 캔들/그리드/축/색상 감지 결과를 0~100 신뢰도로 합산하고 품질 등급과
//! 사용자 권장 사항을 만듭니다.
//!
//! # 배점 (최대 100)
//!
//! | 항목 | 점수 |
//! |------|------|
//! | 캔들 감지 | +30 (alta +10, media +5) |
//! | 그리드 감지 | +20 (수평 5개 이상 +3, 수직 5개 이상 +2) |
//! | 가격 축 / 시간 축 | 각 +10 |
//! | 캔들 색상 | 녹/적 모두 +15, 하나만 +8 |

use serde::{Deserialize, Serialize};

use crate::candles::{CandleDetection, CandleQuality};
use crate::scanner::{AxisDetection, ColorAnalysis, GridDetection};

/// 차트 품질 등급.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartQuality {
    Excelente,
    Boa,
    Regular,
    Ruim,
    #[default]
    NaoDetectado,
}

/// 점수 계산에 필요한 감지 결과 묶음.
#[derive(Debug, Clone, Copy)]
pub struct QualityInputs<'a> {
    pub candles: &'a CandleDetection,
    pub grid: &'a GridDetection,
    pub price_axis: &'a AxisDetection,
    pub time_axis: &'a AxisDetection,
    pub colors: &'a ColorAnalysis,
}

/// 감지 결과를 0~100 신뢰도로 합산합니다.
pub fn score(inputs: &QualityInputs<'_>) -> u32 {
    let mut points = 0u32;

    if inputs.candles.detected {
        points += 30;
        points += match inputs.candles.quality {
            CandleQuality::Alta => 10,
            CandleQuality::Media => 5,
            CandleQuality::Baixa => 0,
        };
    }

    if inputs.grid.detected {
        points += 20;
        if inputs.grid.horizontal_lines >= 5 {
            points += 3;
        }
        if inputs.grid.vertical_lines >= 5 {
            points += 2;
        }
    }

    if inputs.price_axis.detected {
        points += 10;
    }
    if inputs.time_axis.detected {
        points += 10;
    }

    points += match (inputs.colors.has_green_candles, inputs.colors.has_red_candles) {
        (true, true) => 15,
        (true, false) | (false, true) => 8,
        (false, false) => 0,
    };

    points.min(100)
}

/// 신뢰도와 캔들/그리드 상태로 품질 등급을 정합니다 (첫 일치 우선).
pub fn classify(
    confidence: u32,
    candle_quality: CandleQuality,
    candles_detected: bool,
    grid_detected: bool,
) -> ChartQuality {
    if confidence >= 85 && candle_quality == CandleQuality::Alta && grid_detected {
        ChartQuality::Excelente
    } else if confidence >= 70 && candles_detected && grid_detected {
        ChartQuality::Boa
    } else if confidence >= 50 && candles_detected {
        ChartQuality::Regular
    } else if confidence >= 30 {
        ChartQuality::Ruim
    } else {
        ChartQuality::NaoDetectado
    }
}

/// 유효 차트 판정: 신뢰도 > 60, 캔들과 그리드 모두 감지.
pub fn is_valid_chart(confidence: u32, candles_detected: bool, grid_detected: bool) -> bool {
    confidence > 60 && candles_detected && grid_detected
}

pub const REC_INVALID_CHART: &str =
    "Gráfico não detectado com confiança suficiente. Capture a tela do gráfico de forma mais nítida.";
pub const REC_LOW_CONFIDENCE: &str =
    "Confiança baixa na detecção. Verifique se a imagem contém um gráfico de candles.";
pub const REC_NO_CANDLES: &str = "Nenhum candle identificado. Aproxime o zoom do gráfico.";
pub const REC_FEW_CANDLES: &str = "Poucos candles detectados. Inclua mais períodos na captura.";
pub const REC_NO_GRID: &str =
    "Grade do gráfico não identificada. Ative as linhas de grade na plataforma.";
pub const REC_MISSING_COLORS: &str =
    "Cores dos candles não identificadas claramente. Use o esquema verde/vermelho.";
pub const REC_EXCELLENT: &str = "Gráfico detectado com excelente qualidade para análise.";

/// 실패한 세부 조건에 따라 고정 문구 권장 사항을 순서대로 만듭니다.
pub fn recommendations(
    has_valid_chart: bool,
    confidence: u32,
    inputs: &QualityInputs<'_>,
) -> Vec<String> {
    let mut out = Vec::new();

    if !has_valid_chart {
        out.push(REC_INVALID_CHART);
    }
    if confidence < 50 {
        out.push(REC_LOW_CONFIDENCE);
    }
    if !inputs.candles.detected {
        out.push(REC_NO_CANDLES);
    } else if inputs.candles.quality == CandleQuality::Baixa {
        out.push(REC_FEW_CANDLES);
    }
    if !inputs.grid.detected {
        out.push(REC_NO_GRID);
    }
    if !inputs.colors.has_green_candles || !inputs.colors.has_red_candles {
        out.push(REC_MISSING_COLORS);
    }
    if confidence > 80 {
        out.push(REC_EXCELLENT);
    }

    out.into_iter().map(String::from).collect()
}
