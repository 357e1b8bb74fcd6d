//! 차트 스크린샷 픽셀 분석.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - RGBA 픽셀 버퍼 뷰 ([`PixelBuffer`])
//! - 픽셀 스캐너: 배경, 그리드, 축, 캔들 색상
//! - 캔들 감지기: 색상 비율/균일도 기반 영역 탐색
//! - 차트 품질 점수와 권장 사항
//!
//! 모든 함수는 동기식이며 공유 가변 상태가 없으므로 여러 스레드에서 동시에
//! 호출해도 안전합니다.
//!
//! # 예제
//!
//! ```rust,ignore
//! use chartscan_vision::{analyze_rgba, ChartQuality};
//!
//! let analysis = analyze_rgba(width, height, &rgba_bytes);
//! if analysis.has_valid_chart {
//!     // 분석 진행
//! }
//! ```

pub mod analyzer;
pub mod buffer;
pub mod candles;
pub mod quality;
pub mod scanner;

pub use analyzer::{analyze_chart_pixels, analyze_rgba, ChartPixelAnalysis};
pub use buffer::{PixelBuffer, Rgb};
pub use candles::{
    detect_candles, CandleColor, CandleDetection, CandleQuality, CandleRegion, WindowBounds,
};
pub use quality::ChartQuality;
pub use scanner::{
    AxisDetection, AxisPosition, BackgroundStats, BackgroundType, ColorAnalysis, GridDetection,
};
