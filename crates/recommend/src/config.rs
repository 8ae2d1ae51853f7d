//! Typed engine configuration.
//!
//! Every tunable of the selection engine lives here: score weights, the
//! per-meal-type cooking time breakpoints, rush hour windows, preference
//! learning thresholds and the reference timezone. All fields have serde
//! defaults so an empty configuration section yields the stock behaviour.
//! Call [`EngineConfig::validate`] once at startup.

use serde::Deserialize;
use time_tz::{Tz, timezones};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("score weights must sum to 1.0, got {0}")]
    WeightSum(f64),

    #[error("score weight `{0}` must be a finite, non-negative number")]
    InvalidWeight(&'static str),

    #[error("time schedule `{0}`: {1}")]
    InvalidSchedule(&'static str, String),

    #[error("rush hour window `{0}` must satisfy start < end <= 24")]
    InvalidHourWindow(&'static str),

    #[error("preference settings: {0}")]
    InvalidPreference(String),

    #[error("unknown timezone `{0}`")]
    UnknownTimezone(String),

    #[error("plan shortlist size must be at least 1")]
    InvalidShortlist,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoreWeights {
    pub quality: f64,
    pub variety: f64,
    pub time_fit: f64,
    pub nutrition_fit: f64,
    pub preference_fit: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            quality: 0.30,
            variety: 0.25,
            time_fit: 0.20,
            nutrition_fit: 0.15,
            preference_fit: 0.10,
        }
    }
}

impl ScoreWeights {
    pub fn sum(&self) -> f64 {
        self.quality + self.variety + self.time_fit + self.nutrition_fit + self.preference_fit
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let named = [
            ("quality", self.quality),
            ("variety", self.variety),
            ("time_fit", self.time_fit),
            ("nutrition_fit", self.nutrition_fit),
            ("preference_fit", self.preference_fit),
        ];

        for (name, weight) in named {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::InvalidWeight(name));
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightSum(sum));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct TimeStep {
    pub max_minutes: u32,
    pub score: f64,
}

/// Step function from total cooking time to a 0-1 fit score.
///
/// The first step whose `max_minutes` is greater than or equal to the
/// recipe's total time wins; past the last step the `beyond` score applies.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TimeSchedule {
    pub steps: Vec<TimeStep>,
    pub beyond: f64,
}

impl TimeSchedule {
    pub fn new(steps: &[(u32, f64)], beyond: f64) -> Self {
        Self {
            steps: steps
                .iter()
                .map(|&(max_minutes, score)| TimeStep { max_minutes, score })
                .collect(),
            beyond,
        }
    }

    pub fn score(&self, total_minutes: u32) -> f64 {
        self.steps
            .iter()
            .find(|step| total_minutes <= step.max_minutes)
            .map(|step| step.score)
            .unwrap_or(self.beyond)
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        let in_range = |score: f64| score.is_finite() && (0.0..=1.0).contains(&score);

        if !in_range(self.beyond) {
            return Err(ConfigError::InvalidSchedule(
                name,
                format!("beyond score {} is outside 0..=1", self.beyond),
            ));
        }

        let mut previous: Option<u32> = None;
        for step in &self.steps {
            if !in_range(step.score) {
                return Err(ConfigError::InvalidSchedule(
                    name,
                    format!("score {} is outside 0..=1", step.score),
                ));
            }

            if previous.is_some_and(|p| step.max_minutes <= p) {
                return Err(ConfigError::InvalidSchedule(
                    name,
                    format!("breakpoint {}min is not ascending", step.max_minutes),
                ));
            }

            previous = Some(step.max_minutes);
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimeFitSchedules {
    pub breakfast_rush: TimeSchedule,
    pub breakfast_relaxed: TimeSchedule,
    pub lunch_rush: TimeSchedule,
    pub lunch_normal: TimeSchedule,
    pub dinner_weekend: TimeSchedule,
    pub dinner_weekday: TimeSchedule,
    pub snack: TimeSchedule,
    pub generic: TimeSchedule,
}

impl Default for TimeFitSchedules {
    fn default() -> Self {
        Self {
            breakfast_rush: TimeSchedule::new(&[(10, 1.0), (20, 0.7), (30, 0.4), (45, 0.1)], 0.0),
            breakfast_relaxed: TimeSchedule::new(&[(45, 1.0), (60, 0.7), (90, 0.5)], 0.3),
            lunch_rush: TimeSchedule::new(&[(20, 1.0), (30, 0.7), (45, 0.4)], 0.2),
            lunch_normal: TimeSchedule::new(&[(45, 1.0), (60, 0.8), (90, 0.5)], 0.3),
            dinner_weekend: TimeSchedule::new(&[(120, 1.0), (180, 0.7)], 0.4),
            dinner_weekday: TimeSchedule::new(&[(60, 1.0), (90, 0.7), (120, 0.4)], 0.2),
            snack: TimeSchedule::new(&[(5, 1.0), (15, 0.7), (30, 0.4)], 0.1),
            generic: TimeSchedule::new(&[(30, 1.0), (60, 0.7), (90, 0.4)], 0.2),
        }
    }
}

impl TimeFitSchedules {
    fn validate(&self) -> Result<(), ConfigError> {
        self.breakfast_rush.validate("breakfast_rush")?;
        self.breakfast_relaxed.validate("breakfast_relaxed")?;
        self.lunch_rush.validate("lunch_rush")?;
        self.lunch_normal.validate("lunch_normal")?;
        self.dinner_weekend.validate("dinner_weekend")?;
        self.dinner_weekday.validate("dinner_weekday")?;
        self.snack.validate("snack")?;
        self.generic.validate("generic")
    }
}

/// Half-open local hour range `[start, end)`.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
pub struct HourWindow {
    pub start: u8,
    pub end: u8,
}

impl HourWindow {
    pub fn contains(&self, hour: u8) -> bool {
        (self.start..self.end).contains(&hour)
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        if self.start >= self.end || self.end > 24 {
            return Err(ConfigError::InvalidHourWindow(name));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RushHours {
    pub morning: HourWindow,
    pub midday: HourWindow,
}

impl Default for RushHours {
    fn default() -> Self {
        Self {
            morning: HourWindow { start: 7, end: 9 },
            midday: HourWindow { start: 11, end: 13 },
        }
    }
}

impl RushHours {
    pub fn contains(&self, hour: u8) -> bool {
        self.morning.contains(hour) || self.midday.contains(hour)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PreferenceConfig {
    /// Lookback for the variety signal.
    pub recent_days: u16,
    /// Lookback for cuisine, favorite and completion statistics.
    pub analysis_days: u16,
    pub favorite_min_uses: u32,
    pub favorite_min_completion: f64,
    pub completion_min_attempts: u32,
}

impl Default for PreferenceConfig {
    fn default() -> Self {
        Self {
            recent_days: 14,
            analysis_days: 90,
            favorite_min_uses: 2,
            favorite_min_completion: 0.8,
            completion_min_attempts: 2,
        }
    }
}

impl PreferenceConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.recent_days == 0 {
            return Err(ConfigError::InvalidPreference(
                "recent_days must be at least 1".to_owned(),
            ));
        }

        if self.analysis_days < self.recent_days {
            return Err(ConfigError::InvalidPreference(format!(
                "analysis_days ({}) must cover recent_days ({})",
                self.analysis_days, self.recent_days
            )));
        }

        if !(0.0..=1.0).contains(&self.favorite_min_completion) {
            return Err(ConfigError::InvalidPreference(format!(
                "favorite_min_completion {} is outside 0..=1",
                self.favorite_min_completion
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlanConfig {
    /// Number of top ranked recipes a plan slot draws from.
    pub shortlist_size: usize,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self { shortlist_size: 5 }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub weights: ScoreWeights,
    pub time_fit: TimeFitSchedules,
    pub rush_hours: RushHours,
    pub preference: PreferenceConfig,
    pub plan: PlanConfig,
    /// IANA name of the wall clock used for rush hour detection.
    pub timezone: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            time_fit: TimeFitSchedules::default(),
            rush_hours: RushHours::default(),
            preference: PreferenceConfig::default(),
            plan: PlanConfig::default(),
            timezone: "Europe/Paris".to_owned(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        self.time_fit.validate()?;
        self.rush_hours.morning.validate("morning")?;
        self.rush_hours.midday.validate("midday")?;
        self.preference.validate()?;

        if self.plan.shortlist_size == 0 {
            return Err(ConfigError::InvalidShortlist);
        }

        if self.tz().is_none() {
            return Err(ConfigError::UnknownTimezone(self.timezone.to_owned()));
        }

        Ok(())
    }

    pub fn tz(&self) -> Option<&'static Tz> {
        timezones::get_by_name(&self.timezone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let weights = ScoreWeights::default();

        assert!((weights.sum() - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_weights_not_summing_to_one_rejected() {
        let config = EngineConfig {
            weights: ScoreWeights {
                quality: 0.5,
                ..Default::default()
            },
            ..Default::default()
        };

        assert!(matches!(config.validate(), Err(ConfigError::WeightSum(_))));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let config = EngineConfig {
            weights: ScoreWeights {
                quality: 0.45,
                variety: 0.25,
                time_fit: 0.20,
                nutrition_fit: 0.15,
                preference_fit: -0.05,
            },
            ..Default::default()
        };

        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidWeight("preference_fit"))
        );
    }

    #[test]
    fn test_schedule_must_ascend() {
        let mut config = EngineConfig::default();
        config.time_fit.snack = TimeSchedule::new(&[(15, 1.0), (5, 0.5)], 0.1);

        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSchedule("snack", _))
        ));
    }

    #[test]
    fn test_schedule_step_lookup() {
        let schedule = TimeSchedule::new(&[(30, 1.0), (60, 0.7), (90, 0.4)], 0.2);

        assert_eq!(schedule.score(0), 1.0);
        assert_eq!(schedule.score(30), 1.0);
        assert_eq!(schedule.score(31), 0.7);
        assert_eq!(schedule.score(90), 0.4);
        assert_eq!(schedule.score(91), 0.2);
    }

    #[test]
    fn test_unknown_timezone_rejected() {
        let config = EngineConfig {
            timezone: "Mars/Olympus_Mons".to_owned(),
            ..Default::default()
        };

        assert_eq!(
            config.validate(),
            Err(ConfigError::UnknownTimezone("Mars/Olympus_Mons".to_owned()))
        );
    }

    #[test]
    fn test_hour_window_is_half_open() {
        let window = HourWindow { start: 7, end: 9 };

        assert!(!window.contains(6));
        assert!(window.contains(7));
        assert!(window.contains(8));
        assert!(!window.contains(9));
    }
}
