//! fundtrack main entry point

use anyhow::Context;
use clap::Parser;
use fundtrack_api::start_server;
use fundtrack_config::{Config, StoreBackend};
use fundtrack_core::{
    DonationAlert, LogNotifier, MemoryStore, MongoStore, Notifier, RecordStore, SmtpNotifier,
    Treasury,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "fundtrack")]
#[command(version = "0.1.0")]
#[command(about = "Donation and expense tracking backend", long_about = None)]
struct Args {
    /// Configuration file path (optional; environment variables override it)
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print a default configuration file and exit
    #[arg(long)]
    print_default_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    dotenv::dotenv().ok();

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.to_details());
            return Err(e.into());
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();
    log::info!(
        "Config loaded: store={}, port={}",
        config.store.backend,
        config.server.port
    );

    let store = build_store(&config).await?;
    let notifier = build_notifier(&config)?;
    let alert = DonationAlert {
        recipient: config.mail.admin_address.clone().unwrap_or_default(),
        subject: config.mail.subject.clone(),
    };

    let treasury = Treasury::new(store, notifier, alert);
    start_server(config, treasury).await?;
    Ok(())
}

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn RecordStore>> {
    match config.store.backend {
        StoreBackend::Memory => {
            log::warn!("Using in-memory store, records will not survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Mongo => {
            // validate() guarantees a URI for the mongo backend
            let uri = config.store.uri.as_deref().unwrap_or_default();
            let store = MongoStore::connect(uri, &config.store.database)
                .await
                .map_err(|e| {
                    log::error!("MongoDB Connection Error: {}", e);
                    e
                })
                .context("connecting to MongoDB")?;
            Ok(Arc::new(store))
        }
    }
}

fn build_notifier(config: &Config) -> anyhow::Result<Arc<dyn Notifier>> {
    if !config.mail.is_deliverable() {
        log::warn!("EMAIL, EMAIL_PASS or ADMIN_EMAIL not set, donation emails will only be logged");
        return Ok(Arc::new(LogNotifier));
    }
    let notifier = SmtpNotifier::from_config(&config.mail).context("configuring SMTP")?;
    Ok(Arc::new(notifier))
}
