use clap::Args;
use mealpick::config::Config;
use mealpick_recommend::{
    CandidatePool, RecipeFilters, RecommendRequest, Selection, local_date,
};
use mealpick_shared::Error;
use mealpick_shared::mealplan::MealType;
use mealpick_shared::recipe::CuisineType;
use time::{Date, OffsetDateTime};

#[derive(Args, Debug)]
pub struct RecommendArgs {
    /// User to recommend for
    #[arg(long)]
    pub user: String,

    /// Meal slot (breakfast, lunch, dinner, snack or any other name)
    #[arg(long, default_value = "dinner")]
    pub meal_type: MealType,

    /// Target date, defaults to today in the engine timezone
    #[arg(long, value_parser = super::parse_date)]
    pub date: Option<Date>,

    /// Number of ranked recipes to return
    #[arg(long, default_value_t = 1)]
    pub top: usize,

    /// Only consider recipes of this cuisine
    #[arg(long)]
    pub cuisine: Option<CuisineType>,

    /// Maximum prep + cook time in minutes
    #[arg(long)]
    pub max_time: Option<u32>,

    /// Skip user-created recipes
    #[arg(long)]
    pub curated_only: bool,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

pub async fn recommend(config: Config, args: RecommendArgs) -> anyhow::Result<()> {
    let recommender = super::recommender(&config).await?;
    let target_date = args
        .date
        .unwrap_or_else(|| local_date(OffsetDateTime::now_utc(), &config.engine));

    let request = RecommendRequest {
        user_id: args.user,
        meal_type: args.meal_type,
        target_date,
        pool: CandidatePool::Query(RecipeFilters {
            cuisine: args.cuisine,
            max_total_time: args.max_time,
            include_custom: !args.curated_only,
            limit: None,
        }),
    };

    let selections = if args.top == 1 {
        vec![recommender.recommend(request).await.map_err(Error::from)?]
    } else {
        recommender
            .recommend_ranked(request, args.top)
            .await
            .map_err(Error::from)?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&selections)?);
    } else {
        for (rank, selection) in selections.iter().enumerate() {
            println!("{}", format_selection(rank + 1, selection));
        }
    }

    super::log_degradations(recommender.monitor().report());

    Ok(())
}

fn format_selection(rank: usize, selection: &Selection) -> String {
    match &selection.score {
        Some(score) => format!(
            "{rank}. {} ({:?}, {:.3}: {})",
            selection.recipe_id, selection.source, score.total, score.breakdown
        ),
        None => format!("{rank}. {} ({:?})", selection.recipe_id, selection.source),
    }
}
