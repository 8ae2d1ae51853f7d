use sqlx_migrator::{Info, Migrator};

mod m0001;
mod repository;
pub mod table;

pub use repository::{SqliteRepository, date_from_day, day_timestamp};

pub fn migrator() -> Result<Migrator<sqlx::Sqlite>, sqlx_migrator::Error> {
    let mut migrator = Migrator::default();
    migrator.add_migrations(vec![Box::new(m0001::Migration)])?;

    Ok(migrator)
}
