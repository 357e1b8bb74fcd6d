//! 차트 분석 시스템의 에러 타입.
//!
//! 분석 엔진 자체는 에러 대신 기본값으로 강등(degrade)하므로,
//! 여기의 에러는 입력 경계(버퍼 생성, 설정 로드)에서만 발생합니다.

use thiserror::Error;

/// 핵심 차트 분석 에러.
#[derive(Debug, Error)]
pub enum ChartScanError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 픽셀 버퍼 크기/형식 불일치
    #[error("잘못된 픽셀 버퍼: {0}")]
    InvalidBuffer(String),
}

/// 차트 분석 작업을 위한 Result 타입.
pub type ChartScanResult<T> = Result<T, ChartScanError>;

impl From<config::ConfigError> for ChartScanError {
    fn from(err: config::ConfigError) -> Self {
        ChartScanError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ChartScanError::InvalidBuffer("0x0".to_string());
        assert_eq!(err.to_string(), "잘못된 픽셀 버퍼: 0x0");
    }

    #[test]
    fn test_error_from_config() {
        let err: ChartScanError = config::Config::builder()
            .add_source(config::File::from_str("not = [toml", config::FileFormat::Toml))
            .build()
            .unwrap_err()
            .into();
        assert!(matches!(err, ChartScanError::Config(_)));
        assert!(err.to_string().starts_with("설정 에러"));
    }
}
