use sea_query::{ColumnDef, Index, Table, TableCreateStatement, TableDropStatement};

use crate::table::RecipeAllergen;

pub struct CreateTable;

fn create_table() -> TableCreateStatement {
    Table::create()
        .table(RecipeAllergen::Table)
        .col(
            ColumnDef::new(RecipeAllergen::RecipeId)
                .string()
                .not_null()
                .string_len(40),
        )
        .col(ColumnDef::new(RecipeAllergen::AllergenId).integer().not_null())
        .primary_key(Index::create().col(RecipeAllergen::RecipeId).col(RecipeAllergen::AllergenId))
        .to_owned()
}

fn drop_table() -> TableDropStatement {
    Table::drop().table(RecipeAllergen::Table).to_owned()
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
