//! CLI entry point for sqlgate

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sqlgate::{InsertSpec, InsertTarget, MySqlConnection, Row, Settings, Value};

#[derive(Parser)]
#[command(name = "sqlgate")]
#[command(about = "Run queries and batched inserts against MySQL, printing JSON")]
#[command(version)]
struct Cli {
    /// Path to configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only allow SELECT, SHOW, USE and SET NAMES
    #[arg(long)]
    read_only: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Statement {
    /// SQL with `?` placeholders
    sql: String,

    /// Positional parameter; JSON literals are typed, anything else is a string
    #[arg(short = 'p', long = "param")]
    params: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every row
    Query {
        #[command(flatten)]
        statement: Statement,

        /// Rows as arrays instead of objects
        #[arg(long)]
        numbered: bool,
    },
    /// Print the first column of the first row
    Scalar {
        #[command(flatten)]
        statement: Statement,
    },
    /// Print the number of affected rows
    Exec {
        #[command(flatten)]
        statement: Statement,
    },
    /// Insert a JSON array of rows into a table
    Insert {
        table: String,
        /// JSON file with an array of objects or arrays
        file: PathBuf,
    },
    /// Run a JSON insert spec (`table`, `rows`/`row`, `fields`, `result`)
    InsertSpec {
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load settings first (before logging, so we can use settings.log_level)
    let mut settings = Settings::load(cli.config.as_deref())?;

    // Priority: RUST_LOG env var > settings.log_level > info
    let log_level = settings.log_level.as_deref().unwrap_or("info");
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .init();

    if cli.read_only {
        settings.read_only = true;
    }

    let mut conn = sqlgate::mysql::connect(&settings).await?;
    let result = run(&mut conn, cli.command).await;
    let closed = conn.disconnect().await;

    let output = settle(result, closed)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run(conn: &mut MySqlConnection, command: Commands) -> Result<serde_json::Value> {
    let output = match command {
        Commands::Query {
            statement,
            numbered,
        } => {
            let params = parse_params(&statement.params);
            let rows = if numbered {
                conn.query_numbered(&statement.sql, params).await?
            } else {
                conn.query(&statement.sql, params).await?
            };
            rows.iter().map(Row::to_json).collect()
        }
        Commands::Scalar { statement } => {
            let params = parse_params(&statement.params);
            conn.query_scalar(&statement.sql, params)
                .await?
                .map(|v| v.to_json())
                .unwrap_or_default()
        }
        Commands::Exec { statement } => {
            let params = parse_params(&statement.params);
            serde_json::Value::from(conn.exec(&statement.sql, params).await?)
        }
        Commands::Insert { table, file } => {
            let rows = read_rows(&file)?;
            info!("Inserting {} rows into {}", rows.len(), table);
            let inserted = conn.insert(InsertTarget::simple(table, rows)).await?;
            serde_json::Value::from(inserted)
        }
        Commands::InsertSpec { file } => {
            let spec = InsertSpec::from_json(&read_json(&file)?)?;
            serde_json::Value::from(conn.insert(spec.into()).await?)
        }
    };
    Ok(output)
}

/// The command's own outcome wins; a failed disconnect is only logged.
fn settle(
    result: Result<serde_json::Value>,
    closed: sqlgate::Result<()>,
) -> Result<serde_json::Value> {
    if let Err(e) = closed {
        warn!("Failed to disconnect: {}", e);
    }
    result
}

fn parse_params(raw: &[String]) -> Vec<Value> {
    raw.iter().map(|s| parse_param(s)).collect()
}

fn parse_param(raw: &str) -> Value {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(json @ (serde_json::Value::Null
        | serde_json::Value::Bool(_)
        | serde_json::Value::Number(_)
        | serde_json::Value::String(_))) => Value::from_json(json),
        _ => Value::String(raw.to_string()),
    }
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn read_rows(path: &Path) -> Result<Vec<Row>> {
    match read_json(path)? {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| Row::from_json(item).map_err(anyhow::Error::from))
            .collect(),
        _ => anyhow::bail!("{} must contain a JSON array of rows", path.display()),
    }
}
