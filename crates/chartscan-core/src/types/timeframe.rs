//! 차트 타임프레임 정의.
//!
//! 스크린샷에 찍힌 차트의 캔들 간격을 나타냅니다. 매매 결정 엔진은
//! 타임프레임에 따라 기준 프리셋(최소 신뢰도, 필요 컨플루언스)을 고릅니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 차트 타임프레임.
///
/// 직렬화 형식은 차트 플랫폼 표기("1m", "15m", "4h", "1d", "1M")를 따릅니다.
/// 월봉 "1M"과 1분봉 "1m"은 대소문자로 구분됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Timeframe {
    /// 1분봉
    M1,
    /// 3분봉
    M3,
    /// 5분봉
    M5,
    /// 15분봉
    M15,
    /// 30분봉
    M30,
    /// 1시간봉
    H1,
    /// 2시간봉
    H2,
    /// 4시간봉
    H4,
    /// 6시간봉
    H6,
    /// 8시간봉
    H8,
    /// 12시간봉
    H12,
    /// 일봉
    D1,
    /// 3일봉
    D3,
    /// 주봉
    W1,
    /// 월봉
    MN1,
}

impl Timeframe {
    /// 플랫폼 표기 문자열을 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M3 => "3m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::M30 => "30m",
            Timeframe::H1 => "1h",
            Timeframe::H2 => "2h",
            Timeframe::H4 => "4h",
            Timeframe::H6 => "6h",
            Timeframe::H8 => "8h",
            Timeframe::H12 => "12h",
            Timeframe::D1 => "1d",
            Timeframe::D3 => "3d",
            Timeframe::W1 => "1w",
            Timeframe::MN1 => "1M",
        }
    }

    /// 스캘핑 프리셋(1분봉)을 쓰는 타임프레임인지 확인합니다.
    pub fn is_scalping(&self) -> bool {
        matches!(self, Timeframe::M1)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1m" => Ok(Timeframe::M1),
            "3m" => Ok(Timeframe::M3),
            "5m" => Ok(Timeframe::M5),
            "15m" => Ok(Timeframe::M15),
            "30m" => Ok(Timeframe::M30),
            "1h" => Ok(Timeframe::H1),
            "2h" => Ok(Timeframe::H2),
            "4h" => Ok(Timeframe::H4),
            "6h" => Ok(Timeframe::H6),
            "8h" => Ok(Timeframe::H8),
            "12h" => Ok(Timeframe::H12),
            "1d" => Ok(Timeframe::D1),
            "3d" => Ok(Timeframe::D3),
            "1w" => Ok(Timeframe::W1),
            "1M" => Ok(Timeframe::MN1),
            other => Err(format!("Invalid timeframe: {}", other)),
        }
    }
}

impl TryFrom<String> for Timeframe {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timeframe> for String {
    fn from(value: Timeframe) -> Self {
        value.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframe_parse_and_display() {
        assert_eq!("15m".parse::<Timeframe>(), Ok(Timeframe::M15));
        assert_eq!(Timeframe::D1.to_string(), "1d");
        assert_eq!("2h".parse::<Timeframe>(), Ok(Timeframe::H2));
        assert_eq!("1M".parse::<Timeframe>(), Ok(Timeframe::MN1));
        assert_eq!(Timeframe::MN1.to_string(), "1M");
        assert!("7m".parse::<Timeframe>().is_err());
    }

    #[test]
    fn test_only_one_minute_is_scalping() {
        assert!(Timeframe::M1.is_scalping());
        assert!(!Timeframe::MN1.is_scalping());
        assert!(!Timeframe::H6.is_scalping());
    }

    #[test]
    fn test_timeframe_serde_uses_platform_notation() {
        let json = serde_json::to_string(&Timeframe::M5).unwrap();
        assert_eq!(json, "\"5m\"");
        let parsed: Timeframe = serde_json::from_str("\"1h\"").unwrap();
        assert_eq!(parsed, Timeframe::H1);
        assert!(serde_json::from_str::<Timeframe>("\"m5\"").is_err());
    }
}
