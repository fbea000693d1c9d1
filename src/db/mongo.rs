use std::fs;
use tracing::{debug, info};
use crate::db::prelude::*;
use mongodb::error::ErrorKind;
use crate::utils::config::Configuration;
use crate::utils::errors::{ErrorCode, AgriError};
use mongodb::{Client, Database, bson::{Document, doc}, options::ClientOptions};

///
/// Run any schema-like updates against MongoDB that haven't been run yet.
///
pub async fn update_mongo(db: &Database) -> Result<(), AgriError> {
    create_init_indexes(db).await?;
    Ok(())
}

async fn create_init_indexes(db: &Database) -> Result<(), AgriError> {
    // Note: the dbcommand is used so all the indexes for a collection are declared in one place.
    // https://docs.mongodb.com/manual/reference/command/createIndexes/#createindexes

    db.run_command(doc! { "createIndexes": USERS, "indexes": [
        { "key": { EMAIL: 1 }, "name": "idx_email", "unique": true },
        { "key": { USER_ID: 1 }, "name": "idx_user_id", "unique": true },
        { "key": { GOOGLE_ID: 1 }, "name": "idx_google_id", "unique": true, "sparse": true }] }, None).await?;

    // The TTL indexes let MongoDB reap expired codes and lapsed blocks - reads never rely on it.
    db.run_command(doc! { "createIndexes": OTPS, "indexes": [
        { "key": { USER_ID: 1 }, "name": "idx_user_id", "unique": true },
        { "key": { EXPIRES_AT: 1 }, "name": "ttl_expires_at", "expireAfterSeconds": 0 }] }, None).await?;

    db.run_command(doc! { "createIndexes": LEDGER, "indexes": [
        { "key": { USER_ID: 1 }, "name": "idx_user_id", "unique": true },
        { "key": { BLOCKED_UNTIL: 1 }, "name": "ttl_blocked_until", "expireAfterSeconds": 0 }] }, None).await?;

    db.run_command(doc! { "createIndexes": CONTACTS, "indexes": [
        { "key": { EMAIL: 1, CREATED_AT: -1 }, "name": "idx_email_created_at", "unique": false }] }, None).await?;

    Ok(())
}

///
/// Indicates if the MongoDB error is from a duplicate key violation.
///
pub fn is_duplicate_err(err: &mongodb::error::Error) -> bool {
    match &*err.kind {
        ErrorKind::Write(mongodb::error::WriteFailure::WriteError(we)) => we.code == 11000 /* Duplicate insert */,
        _ => false
    }
}

pub async fn get_mongo_db(app_name: &str, config: &Configuration) -> Result<Database, AgriError> {

    let uri = match &config.mongo_credentials {
        Some(filename) => {
            debug!("Loading MongoDB credentials from secrets file {}", filename);

            // Read username and password from a secrets file.
            let credentials = fs::read_to_string(filename)
                .map_err(|err| ErrorCode::UnableToReadCredentials.with_msg(&format!("Unable to read credentials from {}: {}", filename, err)))?;
            let mut credentials = credentials.lines();
            let uri = config.mongo_uri.replace("$USERNAME", credentials.next().unwrap_or_default());
            uri.replace("$PASSWORD", credentials.next().unwrap_or_default())
        },
        None => config.mongo_uri.clone(),
    };

    // Parse the uri now.
    let mut client_options = ClientOptions::parse(&uri).await?;

    // Manually set an option.
    client_options.app_name = Some(app_name.to_string());

    // Get a handle to the deployment.
    let client = Client::with_options(client_options)?;

    info!("Connecting to MongoDB...");

    let db = client.database(&config.db_name);
    ping(&db).await?;

    info!("Connected to MongoDB");
    Ok(db)
}

pub async fn ping(db: &Database) -> Result<Document, AgriError> {
    Ok(db.run_command(doc! { "ping": 1 }, None).await?)
}
