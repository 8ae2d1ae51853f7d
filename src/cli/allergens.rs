use mealpick::config::Config;
use mealpick_db::SqliteRepository;
use mealpick_recommend::resolve_allergen_names;

/// Maps free-text allergen names to catalog ids.
pub async fn resolve(config: Config, names: Vec<String>, json: bool) -> anyhow::Result<()> {
    let pool =
        mealpick::create_read_pool(&config.database.url, config.database.max_connections).await?;
    let repository = SqliteRepository::new(pool);

    let resolution = resolve_allergen_names(&repository, &names).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
        return Ok(());
    }

    for id in &resolution.ids {
        println!("{}", id.0);
    }

    if !resolution.unresolved.is_empty() {
        tracing::warn!(unresolved = ?resolution.unresolved, "unknown allergen names");
    }

    Ok(())
}
