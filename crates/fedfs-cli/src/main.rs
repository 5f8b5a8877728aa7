// fedfs: CLI frontend for fedfs-core
// Config loading, space wiring, output formatting

mod cli;

use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use clap::Parser;
use fedfs_core::{
    DefaultUrlResolver, FederatedSource, FedfsConfig, FileMeta, FileRegistry, JsonFileStore,
    LocalSource, ReqwestTransport, SourceRegistry, Space, SystemClock,
};
use tokio::io::AsyncReadExt;

use crate::cli::{Cli, Command};

/// Resolve the fedfs home: `--home` > `FEDFS_HOME` env > `~/.fedfs`.
fn fedfs_home(flag: Option<PathBuf>) -> io::Result<PathBuf> {
    if let Some(home) = flag {
        return Ok(home);
    }
    if let Ok(home) = std::env::var("FEDFS_HOME") {
        return Ok(PathBuf::from(home));
    }
    dirs_next::home_dir()
        .map(|h| h.join(".fedfs"))
        .ok_or_else(|| io::Error::new(ErrorKind::NotFound, "Could not determine home directory"))
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

async fn open_space(home: &Path) -> io::Result<Space> {
    let config_path = home.join(FedfsConfig::FILE_NAME);
    let config = FedfsConfig::load(&config_path)?;
    let registry: Arc<dyn SourceRegistry> = Arc::new(FileRegistry::new(config_path));
    let store = JsonFileStore::open(config.cache_path(home)).await?;
    let federated = FederatedSource::connect(
        registry.clone(),
        Arc::new(ReqwestTransport::new(&config.http)?),
        Arc::new(DefaultUrlResolver),
        Arc::new(store),
        Arc::new(SystemClock),
    );
    let local = LocalSource::new(config.local_root(home));
    Ok(Space::new(Box::new(local), Box::new(federated), registry))
}

fn format_time(ms: u64) -> String {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .filter(|_| ms > 0)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn format_meta(meta: &FileMeta) -> String {
    format!(
        "{}  {:>10}  {:>16}  {}",
        meta.perm.as_str(),
        meta.size,
        format_time(meta.last_modified),
        meta.name
    )
}

fn print_json<T: serde::Serialize>(value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    println!("{}", json);
    Ok(())
}

async fn run(cli: Cli) -> io::Result<()> {
    let home = fedfs_home(cli.home)?;
    log::debug!("using home {}", home.display());
    let space = open_space(&home).await?;

    match cli.command {
        Command::Ls => {
            let mut files = space.list_files().await?;
            files.sort_by(|a, b| a.name.cmp(&b.name));
            if cli.json {
                print_json(&files)?;
            } else {
                for meta in &files {
                    println!("{}", format_meta(meta));
                }
            }
        }
        Command::Cat { name } => {
            let file = space.read_file(&name).await?;
            let mut stdout = io::stdout().lock();
            stdout.write_all(&file.data)?;
            stdout.flush()?;
        }
        Command::Info { name } => {
            let meta = space.get_file_meta(&name).await?;
            if cli.json {
                print_json(&meta)?;
            } else {
                println!("name:          {}", meta.name);
                println!("size:          {}", meta.size);
                println!("content type:  {}", meta.content_type);
                println!("permission:    {}", meta.perm.as_str());
                println!("last modified: {}", format_time(meta.last_modified));
            }
        }
        Command::Put { name, file } => {
            let data = match file {
                Some(path) => tokio::fs::read(&path).await?,
                None => {
                    let mut buf = Vec::new();
                    tokio::io::stdin().read_to_end(&mut buf).await?;
                    buf
                }
            };
            let meta = space.write_file(&name, &data).await?;
            if cli.json {
                print_json(&meta)?;
            } else {
                eprintln!("[wrote {} bytes to {}]", meta.size, meta.name);
            }
        }
        Command::Rm { name } => {
            space.delete_file(&name).await?;
            eprintln!("[deleted {}]", name);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if let Err(e) = run(cli).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
