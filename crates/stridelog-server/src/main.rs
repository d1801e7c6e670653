use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use stridelog_db::{Database, DbConfig, SqliteDatabase};
use stridelog_server::auth;

#[derive(Parser)]
#[command(name = "stridelog-server")]
struct Cli {
    /// Address to bind
    #[arg(long, env = "STRIDELOG_BIND", default_value = "0.0.0.0")]
    bind: String,

    /// Port to listen on
    #[arg(long, env = "STRIDELOG_PORT", default_value_t = 3720)]
    port: u16,

    /// Path to the SQLite database file
    #[arg(long, env = "STRIDELOG_DB")]
    db: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a user account from the command line
    Useradd {
        email: String,
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let db = Arc::new(SqliteDatabase::open(&DbConfig {
        sqlite_path: cli.db.clone(),
    })?);

    match cli.command {
        Some(Commands::Useradd { email, password }) => {
            if !email.contains('@') {
                anyhow::bail!("a valid email address is required");
            }
            if password.len() < 6 {
                anyhow::bail!("password must be at least 6 characters");
            }
            let user = db.create_user(&email, &auth::hash_password(&password)).await?;
            eprintln!("Created user {} ({})", user.email, user.id);
        }
        None => {
            let addr = SocketAddr::new(cli.bind.parse()?, cli.port);
            let listener = TcpListener::bind(addr).await?;
            tracing::info!("stridelog-server listening on http://{addr}");
            stridelog_server::serve(listener, db).await?;
        }
    }

    Ok(())
}
