use std::time::Duration;

use configs::DatabaseConfig;
use mongodb::{bson::doc, options::ClientOptions, Client, Database};
use tracing::info;

use crate::errors::ModelError;

/// Database used when neither the config nor the URI names one.
pub const FALLBACK_DATABASE: &str = "test";

/// Build the shared client from config, select the database and verify it answers `ping`.
///
/// The driver connects lazily, so the ping is what makes an unreachable server
/// fail here rather than on the first request.
pub async fn connect_with_config(cfg: &DatabaseConfig) -> Result<Database, ModelError> {
    let mut options = ClientOptions::parse(cfg.uri.trim()).await?;
    options.app_name = Some("resident-store".to_string());
    options.connect_timeout = Some(Duration::from_secs(cfg.connect_timeout_secs));
    options.server_selection_timeout = Some(Duration::from_secs(cfg.server_selection_timeout_secs));
    if let Some(max) = cfg.max_pool_size {
        options.max_pool_size = Some(max);
    }
    if let Some(min) = cfg.min_pool_size {
        options.min_pool_size = Some(min);
    }

    let name = database_name(cfg.name.as_deref(), options.default_database.as_deref())?;
    let client = Client::with_options(options)?;
    let db = client.database(&name);

    ping(&db).await?;
    info!(database = %name, "connected to mongodb");
    Ok(db)
}

pub async fn ping(db: &Database) -> Result<(), ModelError> {
    db.run_command(doc! { "ping": 1 }).await?;
    Ok(())
}

/// Explicit name first, then the URI's default database, then [`FALLBACK_DATABASE`].
pub fn database_name(configured: Option<&str>, from_uri: Option<&str>) -> Result<String, ModelError> {
    let name = configured
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .or(from_uri)
        .unwrap_or(FALLBACK_DATABASE);
    if name.contains(['/', '\\', '.', ' ', '"', '$']) {
        return Err(ModelError::Config(format!("invalid database name {name:?}")));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_name_wins_over_uri_default() {
        assert_eq!(database_name(Some("community"), Some("admin")).unwrap(), "community");
        assert_eq!(database_name(Some("  "), Some("admin")).unwrap(), "admin");
        assert_eq!(database_name(None, None).unwrap(), FALLBACK_DATABASE);
    }

    #[test]
    fn names_with_forbidden_characters_are_rejected() {
        assert!(matches!(database_name(Some("a.b"), None), Err(ModelError::Config(_))));
    }

    #[tokio::test]
    async fn connect_and_ping_when_mongodb_is_available() {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return;
        }
        let Ok(uri) = std::env::var("MONGODB_URI") else {
            eprintln!("skip: MONGODB_URI not set");
            return;
        };
        let cfg = DatabaseConfig { uri, ..DatabaseConfig::default() };
        let db = connect_with_config(&cfg).await.expect("connect");
        ping(&db).await.expect("ping");
    }
}
