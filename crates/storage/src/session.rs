use bson::doc;
use eyre::{Context as _, Error};
use log::info;
use mongodb::{options::ClientOptions, Client, Database};

const APP_NAME: &str = "konfi-badges";

/// Opens the badge database and checks that the server answers.
pub(crate) async fn connect(uri: &str, db_name: &str) -> Result<Database, Error> {
    let mut options = ClientOptions::parse(uri)
        .await
        .context("Invalid MongoDB connection string")?;
    options.app_name = Some(APP_NAME.to_owned());
    let client = Client::with_options(options).context("Failed to create MongoDB client")?;

    let db = client.database(db_name);
    db.run_command(doc! { "ping": 1 })
        .await
        .context("Failed to ping MongoDB")?;
    info!("Connected to database {}", db_name);
    Ok(db)
}
