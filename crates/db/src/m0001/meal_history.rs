use sea_query::{ColumnDef, Index, Table, TableCreateStatement, TableDropStatement};

use crate::table::MealHistory;

pub struct CreateTable;

/// `day` is the unix timestamp of the meal's date at UTC midnight.
fn create_table() -> TableCreateStatement {
    Table::create()
        .table(MealHistory::Table)
        .col(
            ColumnDef::new(MealHistory::UserId)
                .string()
                .not_null()
                .string_len(40),
        )
        .col(ColumnDef::new(MealHistory::Day).big_integer().not_null())
        .col(
            ColumnDef::new(MealHistory::MealType)
                .string()
                .not_null()
                .string_len(25),
        )
        .col(
            ColumnDef::new(MealHistory::RecipeId)
                .string()
                .not_null()
                .string_len(40),
        )
        .col(
            ColumnDef::new(MealHistory::Completed)
                .boolean()
                .not_null()
                .default(false),
        )
        .primary_key(
            Index::create()
                .col(MealHistory::UserId)
                .col(MealHistory::Day)
                .col(MealHistory::MealType),
        )
        .to_owned()
}

fn drop_table() -> TableDropStatement {
    Table::drop().table(MealHistory::Table).to_owned()
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
