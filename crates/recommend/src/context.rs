use mealpick_shared::mealplan::MealType;
use time::{Date, OffsetDateTime, Weekday};
use time_tz::ToTimezone;

use crate::config::EngineConfig;

/// Source of "now". Tests inject a [`FixedClock`] instead of reading the system clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

/// Ephemeral per-request facts the scorer needs about the slot being filled.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringContext {
    pub meal_type: MealType,
    pub target_date: Date,
    /// Request time in the reference timezone.
    pub now: OffsetDateTime,
    pub is_weekend: bool,
    pub is_rush_hour: bool,
    pub lookback_days: u16,
}

impl ScoringContext {
    /// Builds the context for a meal slot.
    ///
    /// `is_weekend` looks at the target date, `is_rush_hour` at the local
    /// wall clock: a weekday whose hour falls in one of the configured rush
    /// windows.
    pub fn build(
        now: OffsetDateTime,
        target_date: Date,
        meal_type: MealType,
        config: &EngineConfig,
    ) -> Self {
        let now = match config.tz() {
            Some(tz) => now.to_timezone(tz),
            None => {
                tracing::warn!(
                    timezone = %config.timezone,
                    "unknown reference timezone, using request offset"
                );
                now
            }
        };

        let is_rush_hour = !is_weekend(now.date()) && config.rush_hours.contains(now.hour());

        Self {
            meal_type,
            target_date,
            now,
            is_weekend: is_weekend(target_date),
            is_rush_hour,
            lookback_days: config.preference.recent_days,
        }
    }
}

/// Calendar date of `now` in the reference timezone, falling back to the
/// offset `now` already carries.
pub fn local_date(now: OffsetDateTime, config: &EngineConfig) -> Date {
    match config.tz() {
        Some(tz) => now.to_timezone(tz).date(),
        None => now.date(),
    }
}

pub fn is_weekend(date: Date) -> bool {
    matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday)
}
