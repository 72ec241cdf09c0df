mod archivers;
mod cache;
mod config;
mod db;
mod error;
mod event;
mod listing;
mod logging;
mod offline;
mod remote;
mod response;
mod types;
mod ui;

use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use std::sync::Arc;

use crate::cache::{CacheLayer, CacheSource, ListingStorage};
use crate::config::Config;
use crate::db::Database;
use crate::offline::{ChannelNotifier, ConsoleNotifier, OfflineStore, SqliteStorage};
use crate::remote::ApiClient;
use crate::types::Article;

#[derive(Parser, Debug)]
#[command(name = "readoff")]
#[command(about = "A terminal reader that keeps articles readable offline")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/readoff/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List offline articles in the order they were saved
  List,
  /// Read an offline article
  Read { id: i64 },
  /// Fetch articles and keep them offline
  Save {
    #[arg(required = true)]
    ids: Vec<i64>,
  },
  /// Remove an article from offline storage
  Remove { id: i64 },
  /// Manage archive services
  Archivers {
    #[command(subcommand)]
    command: ArchiversCommand,
  },
}

#[derive(Subcommand, Debug)]
enum ArchiversCommand {
  /// List archive services (cached)
  List,
  /// Delete archive services
  Delete {
    #[arg(required = true)]
    ids: Vec<i64>,
  },
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = Config::load(args.config.as_deref())?;

  let _log_guard = logging::init_tracing(&Config::data_dir()?.join("logs"))?;

  let db = Database::open(&config.database_path()?)?;

  match args.command {
    Command::List => list_offline(db).await,
    Command::Read { id } => read_offline(db, id).await,
    Command::Save { ids } => save_offline(&config, db, ids).await,
    Command::Remove { id } => remove_offline(db, id).await,
    Command::Archivers { command } => run_archivers(&config, db, command).await,
  }
}

fn console_store(db: Database) -> OfflineStore<SqliteStorage> {
  OfflineStore::new(SqliteStorage::new(db)).with_notifier(Arc::new(ConsoleNotifier))
}

fn api_client(config: &Config) -> Result<ApiClient> {
  Ok(ApiClient::new(&config.api)?.with_token(Config::get_api_token()))
}

async fn list_offline(db: Database) -> Result<()> {
  let articles = console_store(db).list().await?;
  if articles.is_empty() {
    println!("No offline articles.");
    return Ok(());
  }

  for article in articles {
    println!(
      "{:>8}  {}",
      article.id,
      ui::truncate(&article.display_title(), 70)
    );
  }
  Ok(())
}

async fn read_offline(db: Database, id: i64) -> Result<()> {
  let (notifier, messages) = ChannelNotifier::new();
  let store = OfflineStore::new(SqliteStorage::new(db)).with_notifier(Arc::new(notifier));

  let mut view = ui::ArticleView::new(id, Arc::new(store), messages);
  ui::run(&mut view).await
}

async fn save_offline(config: &Config, db: Database, ids: Vec<i64>) -> Result<()> {
  let client = api_client(config)?;
  let store = console_store(db);

  // Outcomes are printed by the notifier; only the failure count matters here
  let results = futures::future::join_all(
    ids
      .into_iter()
      .map(|id| store.put_offline(Article::stub(id), &client)),
  )
  .await;

  let failed = results.iter().filter(|r| r.is_err()).count();
  if failed > 0 {
    return Err(eyre!("{} article(s) could not be put offline", failed));
  }
  Ok(())
}

async fn remove_offline(db: Database, id: i64) -> Result<()> {
  let store = console_store(db);

  store.fetch_one(id).await;
  let state = store.state();
  let response = state.response();
  if response.is_error() {
    return Err(eyre!(state.last_error.clone().unwrap_or_default()));
  }

  match response.data().copied().flatten() {
    Some(article) => store.remove_offline(article).await?,
    None => println!("Article #{} is not offline.", id),
  }
  Ok(())
}

async fn run_archivers(config: &Config, db: Database, command: ArchiversCommand) -> Result<()> {
  let client = api_client(config)?;
  let cache = CacheLayer::new(ListingStorage::new(db))
    .with_stale_time(chrono::Duration::minutes(config.cache.stale_minutes));

  match command {
    ArchiversCommand::List => {
      let result = archivers::list(&client, &cache).await?;
      if result.source == CacheSource::Offline {
        println!("(offline: showing cached archive services)");
      }
      for service in &result.data.entries {
        let default = if service.is_default { " (default)" } else { "" };
        println!(
          "{:>8}  {}  [{}]{}",
          service.id,
          ui::truncate(&service.alias, 40),
          service.provider,
          default
        );
      }
      println!("{} archive service(s)", result.data.total);
    }
    ArchiversCommand::Delete { ids } => {
      let message = archivers::delete(&client, &cache, &ids).await?;
      println!("{}", message);
    }
  }
  Ok(())
}
