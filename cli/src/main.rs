//! User Geo Service: CLI
//!
//! ```sh
//! # Run with default config (~/.config/user-geo-service/config.toml)
//! user-geo-service serve
//!
//! # Custom config path and port
//! user-geo-service --config /etc/user-geo/config.toml serve --port 9000
//!
//! # Apply pending migrations without starting the server
//! user-geo-service db migrate
//!
//! # Validate config without starting
//! user-geo-service check
//! ```

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand};
use sea_orm_migration::sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, Set};
use sea_orm_migration::{seaql_migrations, MigratorTrait};
use tracing::{info, warn};

use user_geo::config::{AppConfig, ConfigError};
use user_geo::infrastructure::database::migrator::Migrator;
use user_geo::server::{init_tracing, ServerHandle, ServerOptions};
use user_geo::{default_config_path, init_database, DatabaseConfig};

/// User CRUD service with IP geolocation enrichment.
#[derive(Parser, Debug)]
#[command(
    name = "user-geo-service",
    version,
    about = "User CRUD REST service with IP geolocation enrichment",
    long_about = "Registers users and enriches each registration with \
                  geolocation metadata of the caller's IP address.\n\n\
                  Default config: ~/.config/user-geo-service/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "USER_GEO_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server.
    Serve {
        /// Override the listen host.
        #[arg(long)]
        host: Option<String>,

        /// Override the listen port.
        #[arg(long)]
        port: Option<u16>,

        /// Skip database migrations on startup.
        #[arg(long)]
        no_migrate: bool,

        /// Keep users in memory instead of the database.
        #[arg(long)]
        in_memory: bool,
    },

    /// Database schema management.
    Db {
        #[command(subcommand)]
        action: DbAction,
    },

    /// Validate the configuration and exit.
    Check,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum DbAction {
    /// Apply all pending migrations.
    Migrate,
    /// Revert the last applied migration.
    Rollback,
    /// Show applied and pending migrations.
    Status,
    /// Revert all applied migrations.
    Reset,
    /// Drop all tables and re-apply every migration.
    Fresh,
    /// Record pending migrations as applied without running them.
    MarkApplied,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let (mut config, load_error) = load_config(&config_path)?;

    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config.logging);

    match load_error {
        None => info!("Configuration loaded from {}", config_path.display()),
        Some(e) => warn!("{}. Using default configuration.", e),
    }

    match cli.command {
        Command::Serve {
            host,
            port,
            no_migrate,
            in_memory,
        } => {
            // ── Apply CLI overrides ────────────────────────────
            if let Some(host) = host {
                info!("CLI override: host = {}", host);
                config.server.host = host;
            }
            if let Some(port) = port {
                info!("CLI override: port = {}", port);
                config.server.port = port;
            }

            let handle = ServerHandle::start(ServerOptions {
                config,
                auto_migrate: !no_migrate,
                in_memory,
            })
            .await?;

            // Install OS signal handlers (SIGTERM, SIGINT)
            handle.install_signal_handler();
            info!("🚀 Press Ctrl+C to shutdown gracefully.");

            handle.wait().await;
        }
        Command::Db { action } => run_db_action(&config, action).await?,
        Command::Check => {
            config.validate()?;
            println!("✅ Configuration is valid");
            println!("   Config file : {}", config_path.display());
            println!("   API address : {}", config.server.address());
            println!("   Database    : {}", config.database.url);
            println!("   Geo lookup  : {}", config.geo.base_url);
            println!("   Log level   : {}", config.logging.level);
        }
    }

    Ok(())
}

/// A missing file falls back to defaults (plus environment overrides).
/// A file that exists but does not parse is an error.
fn load_config(path: &Path) -> Result<(AppConfig, Option<ConfigError>), ConfigError> {
    match AppConfig::load(path) {
        Ok(cfg) => Ok((cfg, None)),
        Err(e @ ConfigError::Io { .. }) => {
            let mut cfg = AppConfig::default();
            cfg.apply_env_overrides();
            Ok((cfg, Some(e)))
        }
        Err(e) => Err(e),
    }
}

async fn run_db_action(
    config: &AppConfig,
    action: DbAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from(&config.database);
    info!("Database: {}", db_config.url);
    let db = init_database(&db_config).await?;

    let result = apply_db_action(&db, action).await;
    db.close().await?;
    result?;
    Ok(())
}

async fn apply_db_action(db: &DatabaseConnection, action: DbAction) -> Result<(), DbErr> {
    match action {
        DbAction::Migrate => {
            Migrator::up(db, None).await?;
            info!("Migrations completed");
        }
        DbAction::Rollback => {
            Migrator::down(db, Some(1)).await?;
            info!("Last migration reverted");
        }
        DbAction::Status => {
            for m in Migrator::get_applied_migrations(db).await? {
                println!("applied  {}", m.name());
            }
            for m in Migrator::get_pending_migrations(db).await? {
                println!("pending  {}", m.name());
            }
        }
        DbAction::Reset => {
            Migrator::reset(db).await?;
            info!("All migrations reverted");
        }
        DbAction::Fresh => {
            Migrator::fresh(db).await?;
            info!("Database recreated");
        }
        DbAction::MarkApplied => {
            let marked = mark_pending_applied(db).await?;
            if marked.is_empty() {
                println!("there are no new migrations to mark as applied");
            } else {
                println!("marked as applied: {}", marked.join(", "));
            }
        }
    }
    Ok(())
}

/// Write every pending migration into the bookkeeping table without running
/// its `up`. Returns the names that were recorded.
async fn mark_pending_applied(db: &DatabaseConnection) -> Result<Vec<String>, DbErr> {
    Migrator::install(db).await?;

    let applied_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default();

    let mut marked = Vec::new();
    for m in Migrator::get_pending_migrations(db).await? {
        seaql_migrations::ActiveModel {
            version: Set(m.name().to_string()),
            applied_at: Set(applied_at),
        }
        .insert(db)
        .await?;
        marked.push(m.name().to_string());
    }
    Ok(marked)
}
