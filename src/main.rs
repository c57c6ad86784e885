use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use std::sync::Arc;

use offlist::config::Config;
use offlist::favorites::{FavoriteItem, FavoritesLedger};
use offlist::fetch::{HttpClient, Loader, Origin};
use offlist::store::SqliteStore;

#[derive(Parser, Debug)]
#[command(name = "offlist")]
#[command(about = "Offline-first list fetching with a persisted favorites ledger")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/offlist/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Fetch a list, falling back to the stored snapshot when offline
  Fetch {
    /// Source alias from the config, or a full URL
    source: String,
    /// Storage key for the snapshot (required when a URL is given)
    #[arg(short, long)]
    key: Option<String>,
  },
  /// Show the favorites ledger
  Favorites,
  /// Toggle an item in the favorites ledger
  Toggle {
    id: i64,
    #[arg(short, long, default_value = "")]
    name: String,
    #[arg(long)]
    category: Option<String>,
  },
  /// Remove an item from the favorites ledger
  Remove { id: i64 },
  /// Empty the favorites ledger
  Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();
  let config = Config::load(args.config.as_deref())?;

  let store = Arc::new(match &config.store_path {
    Some(path) => SqliteStore::open_at(path)?,
    None => SqliteStore::open()?,
  });

  match args.command {
    Command::Fetch { source, key } => fetch(&config, store, &source, key.as_deref()).await?,
    Command::Favorites => {
      let ledger = FavoritesLedger::load(store, &config.favorites_key);
      for item in ledger.all() {
        match &item.category {
          Some(category) => println!("{}\t{}\t{}", item.id, item.name, category),
          None => println!("{}\t{}", item.id, item.name),
        }
      }
    }
    Command::Toggle { id, name, category } => {
      let ledger = FavoritesLedger::load(store, &config.favorites_key);
      let item = FavoriteItem {
        id,
        name,
        category,
        extra: Default::default(),
      };
      if ledger.toggle(item) {
        println!("added {}", id);
      } else {
        println!("removed {}", id);
      }
    }
    Command::Remove { id } => {
      let ledger = FavoritesLedger::load(store, &config.favorites_key);
      ledger.remove(id);
    }
    Command::Clear => {
      let ledger = FavoritesLedger::load(store, &config.favorites_key);
      ledger.clear();
    }
  }

  Ok(())
}

async fn fetch(
  config: &Config,
  store: Arc<SqliteStore>,
  source: &str,
  key: Option<&str>,
) -> Result<()> {
  let (url, storage_key) = match config.sources.get(source) {
    Some(named) => (named.url.clone(), named.storage_key.clone()),
    None => {
      let key = key.ok_or_else(|| {
        eyre!(
          "unknown source '{}'; pass a full URL together with --key",
          source
        )
      })?;
      (source.to_string(), key.to_string())
    }
  };

  let loader = Loader::new(store);
  let http = HttpClient::new();

  let outcome = loader
    .load::<serde_json::Value, _, _>(&storage_key, || http.fetch_list(&url))
    .await;

  if let Some(warning) = &outcome.warning {
    eprintln!("warning: {}", warning);
  }
  match outcome.origin {
    Origin::Network => eprintln!("{} records (network)", outcome.data.len()),
    Origin::Cache => eprintln!("{} records (stored snapshot)", outcome.data.len()),
    Origin::Empty => eprintln!("no data available"),
  }

  for record in &outcome.data {
    println!("{}", record);
  }

  Ok(())
}
