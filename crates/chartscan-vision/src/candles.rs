//! 캔들 감지기.
//!
//! 캔들 색상 픽셀 비율과 색상 균일도가 높은 세로 직사각형 영역을 찾습니다.
//!
//! # 분류 기준
//!
//! 창(window)이 캔들로 분류되려면:
//! - 캔들 색상 픽셀 비율 > 0.3
//! - 중심 픽셀과 맨해튼 거리 50 이내인 픽셀 비율 > 0.5
//! - 캔들 색상 픽셀 수 > 5
//!
//! # 탐색
//!
//! y, x를 3픽셀 간격으로 훑고, 각 위치에서 가장 큰 창부터 시도해 처음 통과한
//! 창을 후보로 삼습니다. 색상 픽셀 수는 누적 합 테이블로 O(1)에 구하고,
//! 균일도는 색상 조건을 통과한 창에 대해서만 계산합니다.
//!
//! 후보는 스캔 순서대로 탐욕적으로 받아들이며, 이미 채택된 영역과 한 영역
//! 크기 이내로 겹치면 버립니다 (점수 정렬 없음, 먼저 찾은 영역 우선).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::buffer::{PixelBuffer, Rgb};

const WINDOW_STRIDE: usize = 3;
const CANDLE_BRIGHTNESS_FLOOR: u8 = 80;
const MIN_COLOR_RATIO: f64 = 0.3;
const MIN_UNIFORMITY_RATIO: f64 = 0.5;
const MIN_COLORED_PIXELS: u32 = 5;
const UNIFORMITY_DISTANCE: u32 = 50;
/// 균일도 누적 합 테이블을 캐시할 최대 중심 색상 수.
const UNIFORMITY_CACHE_COLORS: usize = 8;

/// 캔들 주 색상.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandleColor {
    Green,
    Red,
}

/// 버퍼 좌표계의 캔들 영역.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandleRegion {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
    pub color: CandleColor,
}

impl CandleRegion {
    /// 다른 영역과 한 영역 크기 이내로 가까운지 확인합니다.
    pub fn is_near(&self, other: &CandleRegion) -> bool {
        self.x.abs_diff(other.x) < self.width.max(other.width)
            && self.y.abs_diff(other.y) < self.height.max(other.height)
    }

    /// 점 (px, py)가 영역 안에 있는지 확인합니다.
    pub fn contains(&self, px: usize, py: usize) -> bool {
        (self.x..self.x + self.width).contains(&px) && (self.y..self.y + self.height).contains(&py)
    }
}

/// 감지된 캔들 수에 따른 품질.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandleQuality {
    Alta,
    Media,
    #[default]
    Baixa,
}

impl CandleQuality {
    pub fn from_count(count: usize) -> Self {
        if count > 20 {
            CandleQuality::Alta
        } else if count > 10 {
            CandleQuality::Media
        } else {
            CandleQuality::Baixa
        }
    }
}

/// 캔들 감지 결과.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CandleDetection {
    pub detected: bool,
    pub count: usize,
    pub quality: CandleQuality,
    /// 채택된 영역 (직렬화 대상 아님)
    #[serde(skip)]
    pub regions: Vec<CandleRegion>,
}

impl CandleDetection {
    pub fn from_regions(regions: Vec<CandleRegion>) -> Self {
        let count = regions.len();
        Self {
            detected: count > 5,
            count,
            quality: CandleQuality::from_count(count),
            regions,
        }
    }
}

/// 이미지 크기에서 유도한 창 크기 범위.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBounds {
    pub min_width: usize,
    pub max_width: usize,
    pub min_height: usize,
    pub max_height: usize,
}

impl WindowBounds {
    /// 너비 `[max(2, 0.5%W), max(20, 2%W)]`, 높이 `[max(10, 2%H), 20%H]`.
    pub fn for_size(width: usize, height: usize) -> Self {
        let min_width = (width * 5 / 1000).max(2);
        let max_width = (width * 2 / 100).max(20).min(width);
        let min_height = (height * 2 / 100).max(10);
        let max_height = (height * 20 / 100).max(min_height).min(height);
        Self {
            min_width,
            max_width,
            min_height,
            max_height,
        }
    }

    fn is_searchable(&self) -> bool {
        self.min_width <= self.max_width && self.min_height <= self.max_height
    }
}

/// 픽셀 조건에 대한 누적 합 테이블 (integral image).
struct SummedArea {
    stride: usize,
    sums: Vec<u32>,
}

impl SummedArea {
    fn build(buffer: &PixelBuffer<'_>, predicate: impl Fn(Rgb) -> bool) -> Self {
        let (width, height) = (buffer.width(), buffer.height());
        let stride = width + 1;
        let mut sums = vec![0u32; stride * (height + 1)];
        for y in 0..height {
            let mut row = 0u32;
            for x in 0..width {
                row += predicate(buffer.pixel(x, y)) as u32;
                sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row;
            }
        }
        Self { stride, sums }
    }

    fn sum(&self, x: usize, y: usize, width: usize, height: usize) -> u32 {
        let s = self.stride;
        let (x2, y2) = (x + width, y + height);
        self.sums[y2 * s + x2] + self.sums[y * s + x] - self.sums[y * s + x2] - self.sums[y2 * s + x]
    }
}

struct CandleSearch<'b, 'a> {
    buffer: &'b PixelBuffer<'a>,
    bounds: WindowBounds,
    green: SummedArea,
    red: SummedArea,
    uniformity_cache: HashMap<Rgb, SummedArea>,
}

impl<'b, 'a> CandleSearch<'b, 'a> {
    fn new(buffer: &'b PixelBuffer<'a>, bounds: WindowBounds) -> Self {
        Self {
            buffer,
            bounds,
            green: SummedArea::build(buffer, |p| p.is_green_tint(CANDLE_BRIGHTNESS_FLOOR)),
            red: SummedArea::build(buffer, |p| p.is_red_tint(CANDLE_BRIGHTNESS_FLOOR)),
            uniformity_cache: HashMap::new(),
        }
    }

    /// (x, y)에서 시작하는 가장 큰 캔들 창을 찾습니다.
    fn find_at(&mut self, x: usize, y: usize) -> Option<CandleRegion> {
        let (width, height) = (self.buffer.width(), self.buffer.height());
        let b = self.bounds;

        for w in (b.min_width..=b.max_width).rev() {
            if x + w > width {
                continue;
            }
            for h in (b.min_height..=b.max_height).rev() {
                if y + h > height {
                    continue;
                }
                if let Some(color) = self.classify(x, y, w, h) {
                    return Some(CandleRegion {
                        x,
                        y,
                        width: w,
                        height: h,
                        color,
                    });
                }
            }
        }
        None
    }

    fn classify(&mut self, x: usize, y: usize, w: usize, h: usize) -> Option<CandleColor> {
        let green = self.green.sum(x, y, w, h);
        let red = self.red.sum(x, y, w, h);
        let colored = green + red;
        let area = (w * h) as f64;

        if colored <= MIN_COLORED_PIXELS || (colored as f64 / area) <= MIN_COLOR_RATIO {
            return None;
        }

        let center = self.buffer.pixel(x + w / 2, y + h / 2);
        if (self.uniform_count(center, x, y, w, h) as f64 / area) <= MIN_UNIFORMITY_RATIO {
            return None;
        }

        Some(if green > red {
            CandleColor::Green
        } else {
            CandleColor::Red
        })
    }

    /// 창 안에서 `center`와 비슷한 색의 픽셀 수.
    fn uniform_count(&mut self, center: Rgb, x: usize, y: usize, w: usize, h: usize) -> u32 {
        if let Some(table) = self.uniformity_cache.get(&center) {
            return table.sum(x, y, w, h);
        }

        if self.uniformity_cache.len() < UNIFORMITY_CACHE_COLORS {
            let table = SummedArea::build(self.buffer, |p| {
                p.manhattan_distance(&center) <= UNIFORMITY_DISTANCE
            });
            let count = table.sum(x, y, w, h);
            self.uniformity_cache.insert(center, table);
            return count;
        }

        let mut count = 0;
        for py in y..y + h {
            for px in x..x + w {
                if self.buffer.pixel(px, py).manhattan_distance(&center) <= UNIFORMITY_DISTANCE {
                    count += 1;
                }
            }
        }
        count
    }
}

/// 버퍼에서 캔들 영역을 감지합니다.
pub fn detect_candles(buffer: &PixelBuffer<'_>) -> CandleDetection {
    let bounds = WindowBounds::for_size(buffer.width(), buffer.height());
    if !bounds.is_searchable() {
        tracing::debug!(
            width = buffer.width(),
            height = buffer.height(),
            "Image too small for candle search"
        );
        return CandleDetection::default();
    }

    let mut search = CandleSearch::new(buffer, bounds);
    let mut accepted: Vec<CandleRegion> = Vec::new();

    for y in (0..buffer.height()).step_by(WINDOW_STRIDE) {
        for x in (0..buffer.width()).step_by(WINDOW_STRIDE) {
            // 이 위치의 어떤 후보도 기존 영역에 가려짐
            let shadowed = accepted
                .iter()
                .any(|a| x.abs_diff(a.x) < a.width && y.abs_diff(a.y) < a.height);
            if shadowed {
                continue;
            }

            if let Some(candidate) = search.find_at(x, y) {
                if !accepted.iter().any(|a| a.is_near(&candidate)) {
                    accepted.push(candidate);
                }
            }
        }
    }

    tracing::trace!(count = accepted.len(), ?bounds, "Candle search finished");
    CandleDetection::from_regions(accepted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_bounds() {
        let bounds = WindowBounds::for_size(800, 600);
        assert_eq!(bounds.min_width, 4);
        assert_eq!(bounds.max_width, 20);
        assert_eq!(bounds.min_height, 12);
        assert_eq!(bounds.max_height, 120);

        let small = WindowBounds::for_size(64, 64);
        assert_eq!((small.min_width, small.max_width), (2, 20));
        assert_eq!((small.min_height, small.max_height), (10, 12));

        assert!(!WindowBounds::for_size(8, 8).is_searchable());
    }

    #[test]
    fn test_quality_from_count() {
        assert_eq!(CandleQuality::from_count(21), CandleQuality::Alta);
        assert_eq!(CandleQuality::from_count(20), CandleQuality::Media);
        assert_eq!(CandleQuality::from_count(10), CandleQuality::Baixa);

        let detection = CandleDetection::from_regions(Vec::new());
        assert!(!detection.detected);
        assert_eq!(detection.quality, CandleQuality::Baixa);
    }

    #[test]
    fn test_region_nearness() {
        let a = CandleRegion {
            x: 10,
            y: 10,
            width: 6,
            height: 20,
            color: CandleColor::Green,
        };
        let mut b = a;
        b.x = 15;
        assert!(a.is_near(&b));
        b.x = 16;
        assert!(!a.is_near(&b));
        assert!(a.contains(15, 29));
        assert!(!a.contains(16, 10));
    }

    #[test]
    fn test_summed_area_matches_direct_count() {
        let (w, h) = (7, 5);
        let mut data = vec![0u8; w * h * 4];
        for (i, px) in data.chunks_mut(4).enumerate() {
            if i % 3 == 0 {
                px.copy_from_slice(&[20, 200, 40, 255]);
            }
        }
        let buffer = PixelBuffer::new(w, h, &data).unwrap();
        let table = SummedArea::build(&buffer, |p| p.is_green_tint(80));

        let direct = (1..4)
            .flat_map(|y| (2..6).map(move |x| (x, y)))
            .filter(|&(x, y)| buffer.pixel(x, y).is_green_tint(80))
            .count() as u32;
        assert_eq!(table.sum(2, 1, 4, 3), direct);
        assert_eq!(table.sum(0, 0, w, h), (w * h).div_ceil(3) as u32);
    }

    #[test]
    fn test_single_candle_block() {
        // 어두운 배경에 녹색 몸통 하나
        let (w, h) = (64, 64);
        let mut data = Vec::with_capacity(w * h * 4);
        for y in 0..h {
            for x in 0..w {
                if (20..28).contains(&x) && (20..44).contains(&y) {
                    data.extend_from_slice(&[30, 200, 80, 255]);
                } else {
                    data.extend_from_slice(&[18, 18, 24, 255]);
                }
            }
        }
        let buffer = PixelBuffer::new(w, h, &data).unwrap();
        let detection = detect_candles(&buffer);

        assert!(detection.count >= 1);
        assert!(detection.regions.iter().all(|r| r.color == CandleColor::Green));
    }
}
