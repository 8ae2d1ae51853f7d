use sea_query::{
    ColumnDef, Index, IndexCreateStatement, IndexDropStatement, Table, TableCreateStatement,
    TableDropStatement,
};

use crate::table::Recipe;

pub struct CreateTable;

fn create_table() -> TableCreateStatement {
    Table::create()
        .table(Recipe::Table)
        .col(
            ColumnDef::new(Recipe::Id)
                .string()
                .not_null()
                .string_len(40)
                .primary_key(),
        )
        .col(
            ColumnDef::new(Recipe::Name)
                .string()
                .not_null()
                .string_len(120),
        )
        .col(ColumnDef::new(Recipe::CuisineType).string().string_len(25).null())
        .col(
            ColumnDef::new(Recipe::MealType)
                .string()
                .not_null()
                .string_len(25),
        )
        .col(ColumnDef::new(Recipe::PrepTime).integer().null())
        .col(ColumnDef::new(Recipe::CookTime).integer().null())
        .col(ColumnDef::new(Recipe::Servings).integer().null())
        .col(ColumnDef::new(Recipe::AverageRating).double().null())
        .col(ColumnDef::new(Recipe::Likes).integer().null())
        .col(
            ColumnDef::new(Recipe::IsCustom)
                .boolean()
                .not_null()
                .default(false),
        )
        .col(ColumnDef::new(Recipe::CaloriesKcal).double().null())
        .col(ColumnDef::new(Recipe::ProteinG).double().null())
        .col(ColumnDef::new(Recipe::FatG).double().null())
        .col(ColumnDef::new(Recipe::CarbsG).double().null())
        .col(ColumnDef::new(Recipe::SodiumMg).double().null())
        .to_owned()
}

fn drop_table() -> TableDropStatement {
    Table::drop().table(Recipe::Table).to_owned()
}

#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Sqlite> for CreateTable {
    async fn up(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = create_table().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }

    async fn down(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = drop_table().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }
}

pub struct CreateIdx1;

fn create_idx_1() -> IndexCreateStatement {
    Index::create()
        .name("idx_recipe_meal_type_cuisine")
        .table(Recipe::Table)
        .col(Recipe::MealType)
        .col(Recipe::CuisineType)
        .to_owned()
}

fn drop_idx_1() -> IndexDropStatement {
    Index::drop()
        .name("idx_recipe_meal_type_cuisine")
        .table(Recipe::Table)
        .to_owned()
}

#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Sqlite> for CreateIdx1 {
    async fn up(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = create_idx_1().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }

    async fn down(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = drop_idx_1().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }
}
