//! # Chartscan Core
//!
//! 차트 스크린샷 분석기의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 분석 파이프라인 전반에서 사용되는 기본 타입을 제공합니다:
//! - 외부 패턴 인식 단계가 전달하는 패턴/프라이스 액션 입력 타입
//! - 변화 감지 엔진이 보관하는 분석 스냅샷
//! - 타임프레임 정의
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
