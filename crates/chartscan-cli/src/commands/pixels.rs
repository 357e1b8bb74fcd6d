//! 픽셀 분석 명령어.
//!
//! 원시 RGBA 바이트 파일(행 우선, 픽셀당 4바이트)을 분석합니다.
//!
//! # 사용 예시
//!
//! ```bash
//! # 1280x720 스크린샷 분석
//! chartscan pixels -i capture.rgba -W 1280 -H 720
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use chartscan_vision::{analyze_rgba, ChartPixelAnalysis};

/// 픽셀 분석 CLI 설정
#[derive(Debug, Clone)]
pub struct PixelsConfig {
    /// RGBA 파일 경로
    pub input: PathBuf,
    /// 이미지 너비 (픽셀)
    pub width: usize,
    /// 이미지 높이 (픽셀)
    pub height: usize,
}

/// 파일을 읽어 픽셀 분석을 실행합니다.
///
/// 파일 크기가 `width * height * 4`와 다르면 분석 불가 결과를 반환합니다.
pub fn analyze_pixels(config: &PixelsConfig) -> Result<ChartPixelAnalysis> {
    let data = fs::read(&config.input)
        .with_context(|| format!("Failed to read pixel file: {}", config.input.display()))?;

    info!(
        path = %config.input.display(),
        width = config.width,
        height = config.height,
        bytes = data.len(),
        "Analyzing chart pixels"
    );

    let analysis = analyze_rgba(config.width, config.height, &data);

    info!(
        valid = analysis.has_valid_chart,
        confidence = analysis.confidence,
        candles = analysis.candle_count(),
        "Pixel analysis finished"
    );

    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartscan_vision::ChartQuality;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("chartscan-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_missing_file_is_error() {
        let config = PixelsConfig {
            input: temp_path("missing.rgba"),
            width: 10,
            height: 10,
        };
        let err = analyze_pixels(&config).unwrap_err();
        assert!(err.to_string().contains("Failed to read pixel file"));
    }

    #[test]
    fn test_solid_image_is_not_a_chart() {
        let path = temp_path("gray.rgba");
        fs::write(&path, [128u8, 128, 128, 255].repeat(32 * 32)).unwrap();

        let config = PixelsConfig {
            input: path.clone(),
            width: 32,
            height: 32,
        };
        let analysis = analyze_pixels(&config).unwrap();
        fs::remove_file(&path).ok();

        assert!(!analysis.has_valid_chart);
        assert_eq!(analysis.chart_quality, ChartQuality::NaoDetectado);
    }

    #[test]
    fn test_size_mismatch_degrades() {
        let path = temp_path("short.rgba");
        fs::write(&path, [0u8; 16]).unwrap();

        let config = PixelsConfig {
            input: path.clone(),
            width: 32,
            height: 32,
        };
        let analysis = analyze_pixels(&config).unwrap();
        fs::remove_file(&path).ok();

        assert!(!analysis.has_valid_chart);
        assert_eq!(analysis.recommendations.len(), 1);
    }
}
