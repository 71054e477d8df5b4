use std::sync::Arc;

use clap::Parser;
use pixelpin_auth_seaorm::cleanup::CleanupTask;
use pixelpin_auth_seaorm::cli::{Cli, Command};
use pixelpin_auth_seaorm::db::initialize_database;
use pixelpin_auth_seaorm::schema::SchemaBuilder;
use pixelpin_auth_seaorm::storage::PixelpinStorage;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pixelpin_auth_seaorm=info,sea_orm=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let db = initialize_database(&cli.resolve_database_url().await?).await?;

    match cli.command {
        Command::Migrate(args) => {
            let schema = SchemaBuilder::default()
                .uid_length(args.uid_length)
                .user_model(args.user_model())
                .build()?;
            PixelpinStorage::new(schema).migrate(&db).await?;
        }
        Command::Cleanup(args) => {
            let task = CleanupTask::new(
                Arc::new(db),
                args.interval.unwrap_or_default(),
                chrono::Duration::hours(args.code_max_age_hours),
                chrono::Duration::hours(args.partial_max_age_hours),
            );
            match args.interval {
                Some(interval) => {
                    info!(interval, "Starting periodic cleanup");
                    task.run().await;
                }
                None => {
                    task.run_cleanup().await?;
                }
            }
        }
    }
    Ok(())
}
