use sea_query::{ColumnDef, Index, Table, TableCreateStatement, TableDropStatement};

use crate::table::IngredientAllergen;

pub struct CreateTable;

fn create_table() -> TableCreateStatement {
    Table::create()
        .table(IngredientAllergen::Table)
        .col(
            ColumnDef::new(IngredientAllergen::IngredientId)
                .string()
                .not_null()
                .string_len(40),
        )
        .col(ColumnDef::new(IngredientAllergen::AllergenId).integer().not_null())
        .primary_key(Index::create().col(IngredientAllergen::IngredientId).col(IngredientAllergen::AllergenId))
        .to_owned()
}

fn drop_table() -> TableDropStatement {
    Table::drop().table(IngredientAllergen::Table).to_owned()
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
