//! RGBA 픽셀 버퍼 뷰.
//!
//! 캔버스 계층이 넘겨주는 `width × height × 4` 바이트(R, G, B, A, 행 우선)를
//! 빌려서 읽기 전용으로 다룹니다.

use chartscan_core::{ChartScanError, ChartScanResult};

/// 한 픽셀의 RGB 값 (알파는 무시).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// ITU-R BT.601 휘도.
    pub fn luminance(&self) -> f64 {
        0.299 * self.r as f64 + 0.587 * self.g as f64 + 0.114 * self.b as f64
    }

    /// 녹색 캔들 색상인지 확인합니다.
    ///
    /// G 채널이 R, B 채널의 1.4배를 넘고 `floor`보다 밝아야 합니다.
    pub fn is_green_tint(&self, floor: u8) -> bool {
        let (r, g, b) = (self.r as f64, self.g as f64, self.b as f64);
        g > r * 1.4 && g > b * 1.4 && self.g > floor
    }

    /// 적색 캔들 색상인지 확인합니다.
    pub fn is_red_tint(&self, floor: u8) -> bool {
        let (r, g, b) = (self.r as f64, self.g as f64, self.b as f64);
        r > g * 1.4 && r > b * 1.4 && self.r > floor
    }

    /// 채널별 차이의 합 (맨해튼 거리).
    pub fn manhattan_distance(&self, other: &Rgb) -> u32 {
        self.r.abs_diff(other.r) as u32
            + self.g.abs_diff(other.g) as u32
            + self.b.abs_diff(other.b) as u32
    }
}

/// 빌린 RGBA 픽셀 버퍼.
#[derive(Debug, Clone, Copy)]
pub struct PixelBuffer<'a> {
    width: usize,
    height: usize,
    data: &'a [u8],
}

impl<'a> PixelBuffer<'a> {
    /// 바이트 길이를 검증하고 버퍼 뷰를 생성합니다.
    pub fn new(width: usize, height: usize, data: &'a [u8]) -> ChartScanResult<Self> {
        if width == 0 || height == 0 {
            return Err(ChartScanError::InvalidBuffer(format!(
                "크기가 0인 이미지: {}x{}",
                width, height
            )));
        }

        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| {
                ChartScanError::InvalidBuffer(format!("이미지가 너무 큼: {}x{}", width, height))
            })?;

        if data.len() != expected {
            return Err(ChartScanError::InvalidBuffer(format!(
                "{}x{} 이미지에는 {}바이트가 필요하지만 {}바이트가 제공됨",
                width,
                height,
                expected,
                data.len()
            )));
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// 전체 픽셀 수.
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// (x, y) 위치의 픽셀. 범위 검사는 호출자 책임입니다.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        self.pixel_at(y * self.width + x)
    }

    /// 선형 인덱스 위치의 픽셀.
    #[inline]
    pub fn pixel_at(&self, index: usize) -> Rgb {
        let i = index * 4;
        Rgb::new(self.data[i], self.data[i + 1], self.data[i + 2])
    }

    #[inline]
    pub fn luminance(&self, x: usize, y: usize) -> f64 {
        self.pixel(x, y).luminance()
    }

    /// `stride` 픽셀 간격으로 샘플링한 픽셀 반복자.
    pub fn sampled(&self, stride: usize) -> impl Iterator<Item = Rgb> + '_ {
        (0..self.pixel_count())
            .step_by(stride.max(1))
            .map(move |i| self.pixel_at(i))
    }
}
