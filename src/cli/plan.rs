use clap::Args;
use mealpick::config::Config;
use mealpick_recommend::{PlanRequest, PlannedMeal, RecipeFilters, local_date};
use mealpick_shared::Error;
use mealpick_shared::mealplan::MealType;
use time::{Date, OffsetDateTime};

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// User to plan for
    #[arg(long)]
    pub user: String,

    /// First planned day, defaults to today in the engine timezone
    #[arg(long, value_parser = super::parse_date)]
    pub start: Option<Date>,

    /// Number of consecutive days
    #[arg(long, default_value_t = 7)]
    pub days: u16,

    /// Meal slot filled each day, repeat for several
    #[arg(long = "meal-type", default_values = ["breakfast", "lunch", "dinner"])]
    pub meal_types: Vec<MealType>,

    /// Maximum prep + cook time in minutes
    #[arg(long)]
    pub max_time: Option<u32>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

pub async fn plan(config: Config, args: PlanArgs) -> anyhow::Result<()> {
    let recommender = super::recommender(&config).await?;
    let start = args
        .start
        .unwrap_or_else(|| local_date(OffsetDateTime::now_utc(), &config.engine));

    let meals = recommender
        .fill_plan(PlanRequest {
            user_id: args.user,
            start,
            days: args.days,
            meal_types: args.meal_types,
            filters: RecipeFilters {
                max_total_time: args.max_time,
                ..Default::default()
            },
        })
        .await
        .map_err(Error::from)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&meals)?);
    } else {
        for meal in &meals {
            println!("{}", format_meal(meal));
        }
    }

    let empty = meals.iter().filter(|m| m.is_empty()).count();
    if empty > 0 {
        tracing::warn!(empty_slots = empty, "some slots have no safe recipe");
    }

    super::log_degradations(recommender.monitor().report());

    Ok(())
}

fn format_meal(meal: &PlannedMeal) -> String {
    match (&meal.recipe_id, &meal.source) {
        (Some(recipe_id), Some(source)) => {
            format!("{} {:<10} {recipe_id} ({source:?})", meal.date, meal.meal_type.as_str())
        }
        (Some(recipe_id), None) => format!("{} {:<10} {recipe_id}", meal.date, meal.meal_type.as_str()),
        _ => format!("{} {:<10} -", meal.date, meal.meal_type.as_str()),
    }
}
