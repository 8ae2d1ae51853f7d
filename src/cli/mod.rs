mod allergens;
mod migrate;
mod plan;
mod recommend;

pub use allergens::resolve;
pub use migrate::migrate;
pub use plan::{PlanArgs, plan};
pub use recommend::{RecommendArgs, recommend};

use mealpick::config::Config;
use mealpick_db::SqliteRepository;
use mealpick_recommend::{DegradationReport, Recommender};
use mealpick_shared::mealplan::parse_day;
use time::Date;

/// `YYYY-MM-DD` argument parser.
pub fn parse_date(value: &str) -> Result<Date, String> {
    parse_day(value).map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

async fn recommender(config: &Config) -> anyhow::Result<Recommender<SqliteRepository>> {
    let pool =
        mealpick::create_read_pool(&config.database.url, config.database.max_connections).await?;

    Ok(Recommender::new(
        SqliteRepository::new(pool),
        config.engine.clone(),
    )?)
}

fn log_degradations(report: DegradationReport) {
    if report == DegradationReport::default() {
        return;
    }

    tracing::warn!(
        scoring_failures = report.scoring_failures,
        fallback_selections = report.fallback_selections,
        snapshot_failures = report.snapshot_failures,
        safety_rejections = report.safety_rejections,
        "completed with degradations"
    );
}
