use mealpick::config::Config;
use sqlx_migrator::{Migrate, Plan};

pub async fn migrate(config: Config) -> anyhow::Result<()> {
    tracing::info!(url = %config.database.url, "running migrations");

    let pool = mealpick::create_write_pool(&config.database.url).await?;
    let mut conn = pool.acquire().await?;

    mealpick_db::migrator()?
        .run(&mut conn, &Plan::apply_all())
        .await?;

    drop(conn);
    pool.close().await;

    tracing::info!("migrations applied");

    Ok(())
}
