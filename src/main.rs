use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ncd_lookup::{
    fetch::CmsClient, fetch_ncd_policy, import_csv, lookup_ncd, Config, ConfigOverrides,
    PolicyRequest,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Import NCD exports into a local store and look them up by title.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// YAML config file
    #[arg(long, global = true, env = "NCD_CONFIG")]
    config: Option<PathBuf>,

    /// DuckDB store
    #[arg(long, global = true, env = "NCD_DB_PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Append every row of the CSV export to the store
    Import {
        #[arg(long, env = "NCD_CSV_PATH")]
        csv: Option<PathBuf>,
    },
    /// Case-insensitive substring search of section titles (at most 5 rows)
    Lookup { query: String },
    /// Fetch a policy from the CMS coverage API by ID/version or by title
    Policy {
        #[arg(long, requires = "ver", conflicts_with = "title")]
        id: Option<String>,
        /// NCD version number
        #[arg(long, requires = "id")]
        ver: Option<String>,
        #[arg(long, required_unless_present = "id")]
        title: Option<String>,
        #[arg(long, env = "NCD_CMS_API_URL")]
        api_url: Option<String>,
        #[arg(long, env = "NCD_HTTP_TIMEOUT_SECS")]
        timeout_secs: Option<u64>,
    },
}

fn main() -> Result<()> {
    // stdout is reserved for command output
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut overrides = ConfigOverrides {
        db_path: args.db,
        ..Default::default()
    };
    if let Command::Import { csv } = &args.command {
        overrides.csv_path = csv.clone();
    }
    if let Command::Policy {
        api_url,
        timeout_secs,
        ..
    } = &args.command
    {
        overrides.cms_api_url = api_url.clone();
        overrides.http_timeout_secs = *timeout_secs;
    }
    let config = Config::load(args.config.as_deref())
        .context("loading configuration")?
        .with_overrides(overrides);
    info!(db = %config.db_path.display(), "configuration loaded");

    match args.command {
        Command::Import { .. } => {
            let summary = import_csv(&config.csv_path, &config.db_path).with_context(|| {
                format!(
                    "importing {} into {}",
                    config.csv_path.display(),
                    config.db_path.display()
                )
            })?;
            println!("{}", summary);
        }
        Command::Lookup { query } => {
            let outcome = lookup_ncd(&query, &config.db_path)
                .with_context(|| format!("looking up {:?}", query))?;
            print!("{}", outcome);
        }
        Command::Policy {
            id, ver, title, ..
        } => {
            let client = CmsClient::new(&config.cms_api_url, config.http_timeout())
                .context("building CMS client")?;
            let request = PolicyRequest {
                ncd_id: id,
                version: ver,
                title,
            };
            let outcome = fetch_ncd_policy(&client, &request, &config.db_path)
                .context("fetching NCD policy")?;
            print!("{}", outcome);
        }
    }

    Ok(())
}
