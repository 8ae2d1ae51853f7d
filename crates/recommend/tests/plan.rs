use mealpick_recommend::{
    EngineConfig, PlanRequest, RecipeFilters, RecommendError, Recommender, SelectionSource,
};
use mealpick_shared::mealplan::MealType;
use time::macros::date;

use crate::helpers::{MemoryRepository, PEANUT, evening_clock, ingredient, recipe, recommender};

mod helpers;

fn plan_request(days: u16, meal_types: Vec<MealType>) -> PlanRequest {
    PlanRequest {
        user_id: "john".to_owned(),
        start: date!(2025 - 01 - 22),
        days,
        meal_types,
        filters: RecipeFilters::default(),
    }
}

#[tokio::test]
async fn test_fill_plan_only_safe_recipes() -> anyhow::Result<()> {
    let repository = MemoryRepository::with_recipes(vec![
        recipe("porridge", MealType::Breakfast, vec![ingredient("Oats", &[])]),
        recipe("eggs", MealType::Breakfast, vec![ingredient("Egg", &[])]),
        recipe("toast", MealType::Breakfast, vec![ingredient("Bread", &[])]),
        recipe("pb-toast", MealType::Breakfast, vec![ingredient("Peanut butter", &[PEANUT])]),
        recipe("curry", MealType::Dinner, vec![ingredient("Lentils", &[])]),
        recipe("risotto", MealType::Dinner, vec![ingredient("Rice", &[])]),
        recipe("tacos", MealType::Dinner, vec![ingredient("Beans", &[])]),
        recipe("ramen", MealType::Dinner, vec![ingredient("Noodles", &[])]),
        recipe("satay", MealType::Dinner, vec![ingredient("Peanut", &[PEANUT])]),
    ])
    .allergic("john", PEANUT);

    let recommender = recommender(repository)?;
    let meals = recommender
        .fill_plan(plan_request(7, vec![MealType::Breakfast, MealType::Dinner]))
        .await?;

    assert_eq!(meals.len(), 14);
    assert!(meals.iter().all(|m| !m.is_empty()));
    assert!(
        meals
            .iter()
            .all(|m| !matches!(m.recipe_id.as_deref(), Some("pb-toast") | Some("satay")))
    );
    assert_eq!(meals[0].date, date!(2025 - 01 - 22));
    assert_eq!(meals[0].meal_type, MealType::Breakfast);
    assert_eq!(meals[13].date, date!(2025 - 01 - 28));
    assert_eq!(meals[13].meal_type, MealType::Dinner);

    // One read per collaborator, one candidate query per meal type.
    assert_eq!(recommender.repository().reads(), (2, 1, 1));

    Ok(())
}

#[tokio::test]
async fn test_fill_plan_rotates_recently_planned_recipes() -> anyhow::Result<()> {
    let repository = MemoryRepository::with_recipes(vec![
        recipe("a", MealType::Dinner, vec![]),
        recipe("b", MealType::Dinner, vec![]),
        recipe("c", MealType::Dinner, vec![]),
    ]);

    let mut config = EngineConfig::default();
    config.plan.shortlist_size = 1;
    let recommender = Recommender::new(repository, config)?.with_clock(evening_clock());

    let meals = recommender
        .fill_plan(plan_request(3, vec![MealType::Dinner]))
        .await?;

    let ids: Vec<_> = meals.iter().filter_map(|m| m.recipe_id.as_deref()).collect();
    assert_eq!(ids, ["a", "b", "c"]);
    assert!(meals.iter().all(|m| m.source == Some(SelectionSource::Ranked)));

    Ok(())
}

#[tokio::test]
async fn test_fill_plan_leaves_unfillable_slots_empty() -> anyhow::Result<()> {
    let repository = MemoryRepository::with_recipes(vec![
        recipe("curry", MealType::Dinner, vec![]),
        recipe("nuts", MealType::Snack, vec![ingredient("Peanut", &[PEANUT])]),
    ])
    .allergic("john", PEANUT);

    let recommender = recommender(repository)?;
    let meals = recommender
        .fill_plan(plan_request(2, vec![MealType::Snack, MealType::Dinner]))
        .await?;

    assert_eq!(meals.len(), 4);
    for meal in &meals {
        match meal.meal_type {
            MealType::Snack => assert!(meal.is_empty()),
            _ => {
                assert_eq!(meal.recipe_id.as_deref(), Some("curry"));
                assert_eq!(meal.source, Some(SelectionSource::Only));
            }
        }
    }

    Ok(())
}

#[tokio::test]
async fn test_fill_plan_rejects_invalid_length() -> anyhow::Result<()> {
    let recommender = recommender(MemoryRepository::default())?;

    let none = recommender.fill_plan(plan_request(0, vec![MealType::Dinner])).await;
    let too_long = recommender.fill_plan(plan_request(36, vec![MealType::Dinner])).await;
    let no_meals = recommender.fill_plan(plan_request(7, vec![])).await;

    assert!(matches!(none, Err(RecommendError::InvalidRequest(_))));
    assert!(matches!(too_long, Err(RecommendError::InvalidRequest(_))));
    assert!(matches!(no_meals, Err(RecommendError::InvalidRequest(_))));
    assert_eq!(recommender.repository().reads(), (0, 0, 0));

    Ok(())
}
