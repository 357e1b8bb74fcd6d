//! 매매 결정 기준.
//!
//! 타임프레임별 프리셋과 설정 파일 재정의를 제공합니다.

use serde::{Deserialize, Serialize};

use chartscan_core::{DecisionSettings, Timeframe};

/// 결정 엔진이 사용하는 기준.
///
/// 엔진 생성 이후에는 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionCriteria {
    /// 진입에 필요한 최소 신뢰도 (0.0 ~ 1.0)
    pub min_confidence: f64,
    /// 필요한 컨플루언스 수 (컨플루언스 점수 기준 x10)
    pub required_confluences: u32,
    /// 진입 추천이 없을 때 사용할 손익비
    pub risk_reward_ratio: f64,
    /// 거래당 최대 리스크 비율 (%)
    pub max_risk_percent: f64,
    /// 분석 타임프레임
    pub timeframe: Timeframe,
}

impl Default for DecisionCriteria {
    fn default() -> Self {
        Self::for_timeframe(Timeframe::M1)
    }
}

impl DecisionCriteria {
    /// 타임프레임 프리셋.
    ///
    /// 1분봉은 `0.65 / 6`, 그 외는 `0.70 / 7`을 사용합니다.
    pub fn for_timeframe(timeframe: Timeframe) -> Self {
        let (min_confidence, required_confluences) = if timeframe.is_scalping() {
            (0.65, 6)
        } else {
            (0.70, 7)
        };

        Self {
            min_confidence,
            required_confluences,
            risk_reward_ratio: 2.0,
            max_risk_percent: 2.0,
            timeframe,
        }
    }

    /// 설정 파일의 결정 섹션에서 기준을 만듭니다.
    ///
    /// 타임프레임 프리셋에서 시작하여 지정된 값만 재정의합니다.
    pub fn from_settings(settings: &DecisionSettings) -> Self {
        let preset = Self::for_timeframe(settings.timeframe);
        Self {
            min_confidence: settings.min_confidence.unwrap_or(preset.min_confidence),
            required_confluences: settings
                .required_confluences
                .unwrap_or(preset.required_confluences),
            risk_reward_ratio: settings
                .risk_reward_ratio
                .unwrap_or(preset.risk_reward_ratio),
            max_risk_percent: settings.max_risk_percent.unwrap_or(preset.max_risk_percent),
            timeframe: preset.timeframe,
        }
    }

    /// 진입에 필요한 최소 컨플루언스 점수.
    pub fn min_confluence_score(&self) -> f64 {
        f64::from(self.required_confluences) * 10.0
    }

    /// 설정 값을 검증합니다.
    pub fn validate(&self) -> Result<(), CriteriaValidationError> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(CriteriaValidationError::InvalidValue(
                "min_confidence must be between 0 and 1".into(),
            ));
        }

        if self.required_confluences > 10 {
            return Err(CriteriaValidationError::InvalidValue(
                "required_confluences must be at most 10".into(),
            ));
        }

        if self.risk_reward_ratio <= 0.0 {
            return Err(CriteriaValidationError::InvalidValue(
                "risk_reward_ratio must be greater than 0".into(),
            ));
        }

        if self.max_risk_percent <= 0.0 || self.max_risk_percent > 100.0 {
            return Err(CriteriaValidationError::InvalidValue(
                "max_risk_percent must be between 0 and 100".into(),
            ));
        }

        Ok(())
    }
}

/// 기준 검증 오류.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CriteriaValidationError {
    #[error("Invalid decision criteria: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalping_preset() {
        let criteria = DecisionCriteria::for_timeframe(Timeframe::M1);

        assert_eq!(criteria.min_confidence, 0.65);
        assert_eq!(criteria.required_confluences, 6);
        assert_eq!(criteria.risk_reward_ratio, 2.0);
        assert_eq!(criteria.max_risk_percent, 2.0);
        assert_eq!(criteria.min_confluence_score(), 60.0);
    }

    #[test]
    fn test_other_timeframes_are_stricter() {
        for tf in [
            Timeframe::M5,
            Timeframe::M15,
            Timeframe::H1,
            Timeframe::H6,
            Timeframe::D1,
            Timeframe::MN1,
        ] {
            let criteria = DecisionCriteria::for_timeframe(tf);
            assert_eq!(criteria.min_confidence, 0.70);
            assert_eq!(criteria.required_confluences, 7);
            assert_eq!(criteria.timeframe, tf);
        }
    }

    #[test]
    fn test_settings_override_preset() {
        let settings = DecisionSettings {
            timeframe: Timeframe::M5,
            min_confidence: Some(0.8),
            required_confluences: None,
            risk_reward_ratio: Some(3.0),
            max_risk_percent: None,
        };
        let criteria = DecisionCriteria::from_settings(&settings);

        assert_eq!(criteria.min_confidence, 0.8);
        assert_eq!(criteria.required_confluences, 7);
        assert_eq!(criteria.risk_reward_ratio, 3.0);
        assert_eq!(criteria.max_risk_percent, 2.0);
        assert_eq!(criteria.timeframe, Timeframe::M5);
    }

    #[test]
    fn test_validate() {
        assert!(DecisionCriteria::default().validate().is_ok());

        let mut criteria = DecisionCriteria::default();
        criteria.min_confidence = 1.5;
        assert!(criteria.validate().is_err());

        let mut criteria = DecisionCriteria::default();
        criteria.risk_reward_ratio = 0.0;
        assert!(criteria.validate().is_err());
    }
}
