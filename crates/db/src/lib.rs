pub mod chapters;
pub mod indexes;
pub mod models;

use mongodb::{Client, Database};
use recita_config::DatabaseSettings;
use tracing::info;

/// Connects to MongoDB and returns the configured database handle.
pub async fn connect(settings: &DatabaseSettings) -> Result<Database, mongodb::error::Error> {
    let client = Client::with_uri_str(&settings.url).await?;
    info!(db = %settings.name, "Connected to MongoDB");
    Ok(client.database(&settings.name))
}
