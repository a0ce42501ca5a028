use std::path::PathBuf;
use std::process;

use cart_store::{
    CartStore, KeyValueStore, RedbStore, RetryPolicy, SqliteConfig, SqliteStore,
    DEFAULT_SNAPSHOT_KEY,
};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod commands;

/// cart-cli: Development tool for persisted carts.
///
/// Opens the cart snapshot in a local database, applies cart operations,
/// and inspects or exports what is stored.
#[derive(Parser)]
#[command(name = "cart", version, about, long_about = None)]
struct Cli {
    /// Path to the database file.
    #[arg(long, global = true, env = "CART_DB", default_value = "cart.db")]
    db: PathBuf,

    /// Storage engine behind the database file.
    #[arg(long, global = true, env = "CART_BACKEND", value_enum, default_value_t = Backend::Sqlite)]
    backend: Backend,

    /// Key the cart snapshot is stored under.
    #[arg(long, global = true, env = "CART_SNAPSHOT_KEY", default_value = DEFAULT_SNAPSHOT_KEY)]
    key: String,

    /// Attempts per snapshot write before giving up.
    #[arg(long, global = true, env = "CART_RETRIES", default_value = "3")]
    retries: u32,

    /// SQLite busy timeout in milliseconds.
    #[arg(long, global = true, env = "CART_BUSY_TIMEOUT_MS", default_value = "5000")]
    busy_timeout_ms: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// SQLite file (WAL mode).
    Sqlite,
    /// Pure-Rust redb file.
    Redb,
}

#[derive(Subcommand)]
enum Commands {
    /// List the line items in the cart.
    Show,

    /// Add a product, or one more unit if it is already in the cart.
    Add {
        /// Product id.
        id: String,

        /// Display title.
        #[arg(long)]
        title: String,

        /// Image URL.
        #[arg(long, default_value = "")]
        image_url: String,

        /// Unit price; finite and not negative.
        #[arg(long, value_parser = commands::parse_price)]
        price: f64,
    },

    /// Add one unit to a line item.
    Inc {
        /// Product id.
        id: String,
    },

    /// Remove one unit from a line item, dropping it at zero.
    Dec {
        /// Product id.
        id: String,
    },

    /// Remove every line item.
    Clear,

    /// Print the stored snapshot as JSON.
    Export {
        /// Reformat the snapshot with indentation.
        #[arg(long)]
        pretty: bool,
    },

    /// Show backend and snapshot statistics.
    Status,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> commands::Result {
    match cli.backend {
        Backend::Sqlite => {
            let config = SqliteConfig {
                busy_timeout_ms: cli.busy_timeout_ms,
                ..SqliteConfig::default()
            };
            let store = SqliteStore::open_with_config(&cli.db, config)?;
            let journal = store.journal_mode().await?;
            let size = store.file_size().await?;
            let label = format!(
                "{} (SQLite, {journal} mode, {})",
                cli.db.display(),
                commands::format_bytes(size)
            );
            dispatch(store, label, &cli).await
        }
        Backend::Redb => {
            let store = RedbStore::open(&cli.db)?;
            let label = format!("{} (redb)", cli.db.display());
            dispatch(store, label, &cli).await
        }
    }
}

async fn dispatch<S: KeyValueStore>(backend: S, label: String, cli: &Cli) -> commands::Result {
    let retry = RetryPolicy {
        max_attempts: cli.retries,
        ..RetryPolicy::default()
    };
    let cart = CartStore::builder(backend)
        .snapshot_key(cli.key.as_str())
        .retry_policy(retry)
        .hydrate()
        .await;
    debug!(db = %label, key = %cli.key, hydration = ?cart.hydration(), "cart opened");

    match &cli.command {
        Commands::Show => commands::show(&cart),
        Commands::Add {
            id,
            title,
            image_url,
            price,
        } => commands::add(&cart, id, title, image_url, *price).await,
        Commands::Inc { id } => commands::inc(&cart, id).await,
        Commands::Dec { id } => commands::dec(&cart, id).await,
        Commands::Clear => commands::clear(&cart).await,
        Commands::Export { pretty } => commands::export(&cart, *pretty).await,
        Commands::Status => commands::status(&cart, &label).await,
    }
}
