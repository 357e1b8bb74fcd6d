//! 차트 분석을 위한 도메인 모델.

mod pattern;
mod snapshot;

pub use pattern::*;
pub use snapshot::*;
