//! 픽셀 스캐너.
//!
//! 샘플링된 픽셀에서 차트의 구조적 요소를 추정합니다:
//! - 배경 유형 (어두움 / 밝음 / 혼합)
//! - 그리드 라인
//! - 가격 축 / 시간 축 텍스트 영역
//! - 녹색/적색 캔들 색상 분포

use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;

/// 배경/색상 분석의 샘플링 간격 (픽셀).
pub const SAMPLE_STRIDE: usize = 4;
/// 그리드 스캔라인 위의 샘플링 간격 (픽셀).
const GRID_LINE_STRIDE: usize = 2;
/// 축 여백 스캔 간격 (픽셀).
const AXIS_STRIDE: usize = 5;

const DARK_LUMINANCE: f64 = 80.0;
const LIGHT_LUMINANCE: f64 = 200.0;
const BACKGROUND_RATIO: f64 = 0.6;

/// 스캔라인이 그리드로 인정되는 최소 일치 비율.
const GRID_LINE_MATCH_RATIO: f64 = 0.4;
/// 그리드 픽셀이 배경 평균 휘도와 달라야 하는 최소 차이.
const GRID_MIN_CONTRAST: f64 = 12.0;
/// 축당 필요한 그리드 라인 수.
const GRID_MIN_LINES: usize = 3;

const AXIS_TEXT_LUMINANCE: f64 = 100.0;
const AXIS_DARK_RATIO: f64 = 0.1;

/// 색상 존재 판정 비율 (샘플의 0.1%).
const COLOR_PRESENCE_RATIO: f64 = 0.001;
/// 색상 분석의 밝기 하한.
const COLOR_BRIGHTNESS_FLOOR: u8 = 100;

/// 배경 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundType {
    Dark,
    Light,
    #[default]
    Mixed,
}

/// 배경 분류 결과.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundStats {
    pub background_type: BackgroundType,
    /// 샘플 평균 휘도
    pub mean_luminance: f64,
}

impl BackgroundStats {
    /// 그리드 라인으로 간주할 휘도 구간.
    ///
    /// 혼합 배경은 평균 휘도에 따라 어두운/밝은 구간 중 하나를 사용합니다.
    pub fn grid_band(&self) -> (f64, f64) {
        match self.background_type {
            BackgroundType::Dark => (60.0, 120.0),
            BackgroundType::Light => (100.0, 180.0),
            BackgroundType::Mixed if self.mean_luminance < 128.0 => (60.0, 120.0),
            BackgroundType::Mixed => (100.0, 180.0),
        }
    }

    fn is_grid_luminance(&self, luminance: f64) -> bool {
        let (low, high) = self.grid_band();
        (low..=high).contains(&luminance)
            && (luminance - self.mean_luminance).abs() >= GRID_MIN_CONTRAST
    }
}

/// 그리드 감지 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridDetection {
    pub detected: bool,
    pub horizontal_lines: usize,
    pub vertical_lines: usize,
}

/// 축 위치.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisPosition {
    Left,
    Right,
    Top,
    Bottom,
    Both,
    #[default]
    None,
}

/// 축 감지 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AxisDetection {
    pub detected: bool,
    pub position: AxisPosition,
}

impl AxisDetection {
    fn from_sides(
        first: bool,
        second: bool,
        first_pos: AxisPosition,
        second_pos: AxisPosition,
    ) -> Self {
        let position = match (first, second) {
            (true, true) => AxisPosition::Both,
            (true, false) => first_pos,
            (false, true) => second_pos,
            (false, false) => AxisPosition::None,
        };
        Self {
            detected: first || second,
            position,
        }
    }
}

/// 캔들 색상 분석 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorAnalysis {
    pub has_green_candles: bool,
    pub has_red_candles: bool,
    pub background_type: BackgroundType,
}

/// 샘플 평균 휘도와 어두운/밝은 픽셀 비율로 배경을 분류합니다.
pub fn classify_background(buffer: &PixelBuffer<'_>) -> BackgroundStats {
    let mut total = 0usize;
    let mut dark = 0usize;
    let mut light = 0usize;
    let mut luminance_sum: f64 = 0.0;

    for pixel in buffer.sampled(SAMPLE_STRIDE) {
        let lum = pixel.luminance();
        luminance_sum += lum;
        total += 1;
        if lum < DARK_LUMINANCE {
            dark += 1;
        } else if lum > LIGHT_LUMINANCE {
            light += 1;
        }
    }

    if total == 0 {
        return BackgroundStats {
            background_type: BackgroundType::Mixed,
            mean_luminance: 0.0,
        };
    }

    let dark_ratio = dark as f64 / total as f64;
    let light_ratio = light as f64 / total as f64;
    let background_type = if dark_ratio > BACKGROUND_RATIO {
        BackgroundType::Dark
    } else if light_ratio > BACKGROUND_RATIO {
        BackgroundType::Light
    } else {
        BackgroundType::Mixed
    };

    BackgroundStats {
        background_type,
        mean_luminance: luminance_sum / total as f64,
    }
}

/// 그리드 스캔라인 위치: 길이의 10% ~ 90%, 5% 간격.
pub fn scan_line_positions(length: usize) -> Vec<usize> {
    let mut positions: Vec<usize> = (2..=18)
        .map(|step| length * step * 5 / 100)
        .filter(|&p| p < length)
        .collect();
    positions.dedup();
    positions
}

/// 수평/수직 스캔라인에서 그리드 라인을 셉니다.
pub fn detect_grid(buffer: &PixelBuffer<'_>, background: &BackgroundStats) -> GridDetection {
    let (width, height) = (buffer.width(), buffer.height());

    let horizontal_lines = scan_line_positions(height)
        .into_iter()
        .filter(|&y| {
            line_matches(
                (0..width).step_by(GRID_LINE_STRIDE).map(|x| buffer.luminance(x, y)),
                background,
            )
        })
        .count();

    let vertical_lines = scan_line_positions(width)
        .into_iter()
        .filter(|&x| {
            line_matches(
                (0..height).step_by(GRID_LINE_STRIDE).map(|y| buffer.luminance(x, y)),
                background,
            )
        })
        .count();

    GridDetection {
        detected: horizontal_lines >= GRID_MIN_LINES && vertical_lines >= GRID_MIN_LINES,
        horizontal_lines,
        vertical_lines,
    }
}

fn line_matches(samples: impl Iterator<Item = f64>, background: &BackgroundStats) -> bool {
    let (mut total, mut matched) = (0usize, 0usize);
    for lum in samples {
        total += 1;
        if background.is_grid_luminance(lum) {
            matched += 1;
        }
    }
    total > 0 && matched as f64 >= total as f64 * GRID_LINE_MATCH_RATIO
}

/// 좌/우 5% 여백에서 가격 축 텍스트를 찾습니다.
pub fn detect_price_axis(buffer: &PixelBuffer<'_>) -> AxisDetection {
    let (width, height) = (buffer.width(), buffer.height());
    let margin = margin_size(width);
    let left = margin_has_text(buffer, 0..margin, 0..height);
    let right = margin_has_text(buffer, width - margin..width, 0..height);
    AxisDetection::from_sides(left, right, AxisPosition::Left, AxisPosition::Right)
}

/// 상/하 5% 여백에서 시간 축 텍스트를 찾습니다.
pub fn detect_time_axis(buffer: &PixelBuffer<'_>) -> AxisDetection {
    let (width, height) = (buffer.width(), buffer.height());
    let margin = margin_size(height);
    let top = margin_has_text(buffer, 0..width, 0..margin);
    let bottom = margin_has_text(buffer, 0..width, height - margin..height);
    AxisDetection::from_sides(top, bottom, AxisPosition::Top, AxisPosition::Bottom)
}

fn margin_size(length: usize) -> usize {
    (length * 5 / 100).clamp(1, length)
}

fn margin_has_text(
    buffer: &PixelBuffer<'_>,
    xs: std::ops::Range<usize>,
    ys: std::ops::Range<usize>,
) -> bool {
    let (mut scanned, mut dark) = (0usize, 0usize);
    for y in ys.step_by(AXIS_STRIDE) {
        for x in xs.clone().step_by(AXIS_STRIDE) {
            scanned += 1;
            if buffer.luminance(x, y) < AXIS_TEXT_LUMINANCE {
                dark += 1;
            }
        }
    }
    scanned > 0 && dark as f64 > scanned as f64 * AXIS_DARK_RATIO
}

/// 녹색/적색 캔들 색상의 존재 여부를 판정합니다.
pub fn analyze_colors(buffer: &PixelBuffer<'_>, background: &BackgroundStats) -> ColorAnalysis {
    let (mut total, mut green, mut red) = (0usize, 0usize, 0usize);
    for pixel in buffer.sampled(SAMPLE_STRIDE) {
        total += 1;
        if pixel.is_green_tint(COLOR_BRIGHTNESS_FLOOR) {
            green += 1;
        } else if pixel.is_red_tint(COLOR_BRIGHTNESS_FLOOR) {
            red += 1;
        }
    }

    let threshold = total as f64 * COLOR_PRESENCE_RATIO;
    ColorAnalysis {
        has_green_candles: green as f64 > threshold,
        has_red_candles: red as f64 > threshold,
        background_type: background.background_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: usize, height: usize, rgb: [u8; 3]) -> Vec<u8> {
        let mut data = Vec::with_capacity(width * height * 4);
        for _ in 0..width * height {
            data.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
        }
        data
    }

    fn paint(data: &mut [u8], width: usize, x: usize, y: usize, rgb: [u8; 3]) {
        let i = (y * width + x) * 4;
        data[i..i + 3].copy_from_slice(&rgb);
    }

    #[test]
    fn test_background_classification() {
        let dark = solid(40, 40, [15, 15, 20]);
        let stats = classify_background(&PixelBuffer::new(40, 40, &dark).unwrap());
        assert_eq!(stats.background_type, BackgroundType::Dark);

        let light = solid(40, 40, [250, 250, 250]);
        let stats = classify_background(&PixelBuffer::new(40, 40, &light).unwrap());
        assert_eq!(stats.background_type, BackgroundType::Light);

        let gray = solid(40, 40, [128, 128, 128]);
        let stats = classify_background(&PixelBuffer::new(40, 40, &gray).unwrap());
        assert_eq!(stats.background_type, BackgroundType::Mixed);
        assert!((stats.mean_luminance - 128.0).abs() < 1e-6);
    }

    #[test]
    fn test_scan_line_positions() {
        let positions = scan_line_positions(100);
        assert_eq!(positions.len(), 17);
        assert_eq!(positions.first(), Some(&10));
        assert_eq!(positions.last(), Some(&90));
    }

    /// 100x100 배경에 수평 4개, 수직 3개 그리드 라인을 그립니다.
    fn grid_image(background: [u8; 3], line: [u8; 3]) -> Vec<u8> {
        let (w, h) = (100, 100);
        let mut data = solid(w, h, background);
        for y in [20, 40, 60, 80] {
            for x in 0..w {
                paint(&mut data, w, x, y, line);
            }
        }
        for x in [25, 50, 75] {
            for y in 0..h {
                paint(&mut data, w, x, y, line);
            }
        }
        data
    }

    #[test]
    fn test_grid_band_by_background() {
        let stats = |background_type, mean_luminance| BackgroundStats {
            background_type,
            mean_luminance,
        };
        assert_eq!(stats(BackgroundType::Dark, 20.0).grid_band(), (60.0, 120.0));
        assert_eq!(stats(BackgroundType::Light, 240.0).grid_band(), (100.0, 180.0));
        assert_eq!(stats(BackgroundType::Mixed, 127.9).grid_band(), (60.0, 120.0));
        assert_eq!(stats(BackgroundType::Mixed, 128.0).grid_band(), (100.0, 180.0));
    }

    #[test]
    fn test_grid_detected_on_light_theme() {
        let data = grid_image([250, 250, 250], [150, 150, 150]);
        let buffer = PixelBuffer::new(100, 100, &data).unwrap();
        let background = classify_background(&buffer);
        assert_eq!(background.background_type, BackgroundType::Light);

        let grid = detect_grid(&buffer, &background);
        assert!(grid.detected);
        assert_eq!(grid.horizontal_lines, 4);
        assert_eq!(grid.vertical_lines, 3);
    }

    #[test]
    fn test_grid_on_mixed_background_below_midpoint() {
        // 평균 휘도 약 98: 어두운 구간(60~120) 사용
        let data = grid_image([100, 100, 100], [70, 70, 70]);
        let buffer = PixelBuffer::new(100, 100, &data).unwrap();
        let background = classify_background(&buffer);
        assert_eq!(background.background_type, BackgroundType::Mixed);
        assert!(background.mean_luminance < 128.0);

        let grid = detect_grid(&buffer, &background);
        assert!(grid.detected);
        assert_eq!(grid.horizontal_lines, 4);
        assert_eq!(grid.vertical_lines, 3);
    }

    #[test]
    fn test_grid_on_mixed_background_above_midpoint() {
        // 평균 휘도 약 142: 밝은 구간(100~180) 사용
        let data = grid_image([140, 140, 140], [170, 170, 170]);
        let buffer = PixelBuffer::new(100, 100, &data).unwrap();
        let background = classify_background(&buffer);
        assert_eq!(background.background_type, BackgroundType::Mixed);
        assert!(background.mean_luminance >= 128.0);

        let grid = detect_grid(&buffer, &background);
        assert!(grid.detected);
        assert_eq!(grid.horizontal_lines, 4);
        assert_eq!(grid.vertical_lines, 3);

        // 같은 라인도 어두운 구간 기준이면 그리드가 아님
        let dark_band = BackgroundStats {
            background_type: BackgroundType::Mixed,
            mean_luminance: 100.0,
        };
        assert!(!detect_grid(&buffer, &dark_band).detected);
    }

    #[test]
    fn test_grid_detected_on_scan_lines() {
        let (w, h) = (100, 100);
        let data = grid_image([15, 15, 20], [90, 90, 90]);

        let buffer = PixelBuffer::new(w, h, &data).unwrap();
        let background = classify_background(&buffer);
        let grid = detect_grid(&buffer, &background);
        assert!(grid.detected);
        assert_eq!(grid.horizontal_lines, 4);
        assert_eq!(grid.vertical_lines, 3);
    }

    #[test]
    fn test_flat_image_has_no_grid() {
        // 회색 구간 안의 단색이라도 배경과 대비가 없으면 그리드가 아님
        let data = solid(60, 60, [100, 100, 100]);
        let buffer = PixelBuffer::new(60, 60, &data).unwrap();
        let grid = detect_grid(&buffer, &classify_background(&buffer));
        assert!(!grid.detected);
        assert_eq!(grid.horizontal_lines, 0);
    }

    #[test]
    fn test_axis_detection_sides() {
        let (w, h) = (100, 100);
        let mut data = solid(w, h, [240, 240, 240]);
        // 오른쪽 여백과 하단 여백을 어둡게 칠함
        for y in 0..h {
            for x in 95..w {
                paint(&mut data, w, x, y, [20, 20, 20]);
            }
        }
        for y in 95..h {
            for x in 0..w {
                paint(&mut data, w, x, y, [20, 20, 20]);
            }
        }
        let buffer = PixelBuffer::new(w, h, &data).unwrap();

        let price = detect_price_axis(&buffer);
        assert!(price.detected);
        assert_eq!(price.position, AxisPosition::Right);

        let time = detect_time_axis(&buffer);
        assert!(time.detected);
        assert_eq!(time.position, AxisPosition::Bottom);
    }

    #[test]
    fn test_color_presence() {
        let (w, h) = (50, 50);
        let mut data = solid(w, h, [20, 20, 20]);
        for y in 10..30 {
            for x in 10..14 {
                paint(&mut data, w, x, y, [30, 200, 80]);
            }
        }
        let buffer = PixelBuffer::new(w, h, &data).unwrap();
        let colors = analyze_colors(&buffer, &classify_background(&buffer));
        assert!(colors.has_green_candles);
        assert!(!colors.has_red_candles);
        assert_eq!(colors.background_type, BackgroundType::Dark);
    }
}
