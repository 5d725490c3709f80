use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use waypoint_core::payload::{open_sealed, parse_sealed_response, seal_conf};
use waypoint_core::settings::{ENV_CONF_URL, ENV_PASSPHRASE};
use waypoint_core::{BootstrapSettings, Bootstrapper, FileCache, HttpTransport, RemoteConf};

#[derive(Parser, Debug)]
#[command(author, version, about = "Waypoint remote config operator tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Seal a config document for publication
    Seal {
        /// API base url to embed in the payload
        api: String,
        /// PBKDF2 iteration count
        #[arg(long, default_value_t = 100_000)]
        iterations: u32,
        /// Write the payload to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Decrypt a sealed payload file and print the config
    Open {
        /// File holding the sealed payload JSON
        file: PathBuf,
    },
    /// Run the bootstrap against a live endpoint
    Resolve {
        /// Endpoint to fetch; defaults to WAYPOINT_CONF_URL
        #[arg(long)]
        url: Option<String>,
        /// Cache file to reconcile against; defaults to the per-user location
        #[arg(long)]
        cache: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Seal {
            api,
            iterations,
            out,
        } => seal_command(api, iterations, out),
        Commands::Open { file } => open_command(file),
        Commands::Resolve { url, cache } => resolve_command(url, cache).await,
    }
}

fn seal_command(api: String, iterations: u32, out: Option<PathBuf>) -> Result<()> {
    let passphrase = prompt_passphrase_twice("Payload passphrase")?;
    let sealed = seal_conf(&RemoteConf { api }, &passphrase, iterations)?;
    let rendered = serde_json::to_string_pretty(&sealed)?;
    match out {
        Some(path) => {
            std::fs::write(&path, rendered + "\n")
                .map_err(|e| anyhow!("write {}: {e}", path.display()))?;
            eprintln!("sealed payload written to {}", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn open_command(file: PathBuf) -> Result<()> {
    let passphrase = prompt_passphrase("Payload passphrase")?;
    let body = std::fs::read_to_string(&file)
        .map_err(|e| anyhow!("read {}: {e}", file.display()))?;
    let sealed = parse_sealed_response(&body)?;
    let conf = open_sealed(&sealed, &passphrase)?;
    println!("{}", serde_json::to_string_pretty(&conf)?);
    Ok(())
}

async fn resolve_command(url: Option<String>, cache: Option<PathBuf>) -> Result<()> {
    let conf_url = match url {
        Some(url) => url,
        None => match std::env::var(ENV_CONF_URL) {
            Ok(url) if !url.is_empty() => url,
            _ => return Err(anyhow!("pass --url or set {ENV_CONF_URL}")),
        },
    };
    let passphrase = prompt_passphrase("Payload passphrase")?;
    let settings = BootstrapSettings::new(conf_url, passphrase);
    let transport = HttpTransport::new(settings.fetch_timeout)?;
    let cache = match cache {
        Some(path) => FileCache::at(path),
        None => FileCache::open_default()?,
    };
    let boot = Bootstrapper::new(transport, cache, settings);
    let resolved = boot.init_remote_api().await?;
    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(())
}

fn prompt_passphrase(prompt: &str) -> Result<String> {
    if let Ok(pw) = std::env::var(ENV_PASSPHRASE) {
        if !pw.is_empty() {
            return Ok(pw);
        }
    }
    let pw = rpassword::prompt_password(format!("{prompt}: "))
        .map_err(|e| anyhow!("passphrase prompt: {e}"))?;
    if pw.is_empty() {
        return Err(anyhow!("passphrase must not be empty"));
    }
    Ok(pw)
}

fn prompt_passphrase_twice(prompt: &str) -> Result<String> {
    if let Ok(pw) = std::env::var(ENV_PASSPHRASE) {
        if !pw.is_empty() {
            return Ok(pw);
        }
    }
    let first = prompt_passphrase(prompt)?;
    let second = rpassword::prompt_password("Confirm passphrase: ")
        .map_err(|e| anyhow!("passphrase prompt: {e}"))?;
    if first != second {
        return Err(anyhow!("passphrases do not match"));
    }
    Ok(first)
}
