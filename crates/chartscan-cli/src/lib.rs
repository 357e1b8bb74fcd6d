//! 차트 스캐너 CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 원시 RGBA 파일의 픽셀 분석
//! - 분석 결과 JSON으로부터 매매 결정
//! - 스냅샷 시퀀스 재생을 통한 변화 감지
//! - 유효 설정 출력

pub mod commands;
