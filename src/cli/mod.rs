use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use mig2schema::api::{self, ExtractOptions, DEFAULT_PROVIDER};
use mig2schema::mcp::McpServer;
use mig2schema::pg::container::DEFAULT_POSTGRES_IMAGE;
use mig2schema::render::OutputFormat;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mig2schema", version)]
#[command(
    about = "Extract the PostgreSQL schema produced by a directory of migrations",
    long_about = "Applies every *.up.sql migration in MIGRATION_DIR to a throwaway \
                  PostgreSQL container and prints the resulting schema."
)]
struct Cli {
    /// Directory containing *.up.sql / *.down.sql migration files
    #[arg(
        value_name = "MIGRATION_DIR",
        required_unless_present_any = ["mcp", "list_providers"]
    )]
    migration_dir: Option<PathBuf>,

    /// Print CREATE statements instead of the readable report
    #[arg(short, long)]
    extract: bool,

    /// Schema extraction provider
    #[arg(short, long, env = "MIG2SCHEMA_PROVIDER", default_value = DEFAULT_PROVIDER)]
    provider: String,

    /// List the providers usable in this environment and exit
    #[arg(long)]
    list_providers: bool,

    /// PostgreSQL Docker image used to run the migrations
    #[arg(long, env = "MIG2SCHEMA_PG_IMAGE", default_value = DEFAULT_POSTGRES_IMAGE)]
    pg_image: String,

    /// Database schemas to extract, comma separated
    #[arg(long, value_delimiter = ',', default_value = "public")]
    schemas: Vec<String>,

    /// Run as an MCP server on stdin/stdout
    #[arg(long)]
    mcp: bool,

    /// Log verbosity (trace, debug, info, warn, error)
    #[arg(long, env = "MIG2SCHEMA_LOG", default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Json)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

fn setup_logging(level: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .with_context(|| format!("invalid log level: {level}"))?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Text => subscriber.with_ansi(false).init(),
    }

    Ok(())
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level, cli.log_format)?;

    if cli.list_providers {
        println!("Available schema extraction providers:");
        for name in api::list_providers() {
            println!("  - {name}");
        }
        return Ok(());
    }

    if cli.mcp {
        McpServer::new()
            .run_stdio()
            .await
            .context("MCP server failed")?;
        return Ok(());
    }

    let Some(migration_dir) = cli.migration_dir else {
        bail!("MIGRATION_DIR is required");
    };

    let format = if cli.extract {
        OutputFormat::Sql
    } else {
        OutputFormat::Info
    };

    let options = ExtractOptions::new(migration_dir)
        .with_format(format)
        .with_provider(cli.provider)
        .with_postgres_image(cli.pg_image)
        .with_target_schemas(cli.schemas);

    let result = api::extract(options).await?;
    info!(
        provider = %result.provider,
        migrations = result.migrations_applied,
        "schema extraction complete"
    );

    match result.format {
        OutputFormat::Info => {
            println!("\n=== DATABASE SCHEMA ===");
            print!("{}", result.output);
        }
        OutputFormat::Sql => print!("{}", result.output),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn directory_is_optional_with_mcp_or_list() {
        assert!(Cli::try_parse_from(["mig2schema", "--mcp"]).is_ok());
        assert!(Cli::try_parse_from(["mig2schema", "--list-providers"]).is_ok());
        assert!(Cli::try_parse_from(["mig2schema"]).is_err());
    }

    #[test]
    fn parses_schemas_and_extract_flag() {
        let cli =
            Cli::try_parse_from(["mig2schema", "-e", "--schemas", "app,audit", "./migrations"])
                .unwrap();
        assert!(cli.extract);
        assert_eq!(cli.schemas, vec!["app", "audit"]);
        assert_eq!(cli.migration_dir, Some(PathBuf::from("./migrations")));
        assert_eq!(cli.log_format, LogFormat::Json);
    }
}
