//! `assetgate-cache` - inspect and maintain the resolver disk cache.
//!
//! Reads the same configuration and secrets files as the library. The cache
//! directory comes from `--cache-dir`, else from the config file, else the
//! default user cache directory.
//!
//! Build: `cargo build --bin assetgate-cache --features cli`

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use dialoguer::Confirm;

use assetgate::cache::disk::default_base_dir;
use assetgate::{
    AssetgateBuilder, CacheInfo, Config, DiskCache, DiskCacheConfig, EntityKind, Secrets,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

// ── CLI ─────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "assetgate-cache",
    about = "inspect and maintain the assetgate resolver cache",
    version = assetgate::version::PKG_VERSION,
    long_version = long_version()
)]
struct Args {
    /// path to config.toml
    #[arg(long, env = "ASSETGATE_CONFIG")]
    config: Option<PathBuf>,

    /// cache base directory (overrides the config file)
    #[arg(long, env = "ASSETGATE_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// list cached workspaces
    List,
    /// show one workspace's cache entry
    Show {
        /// workspace ID
        workspace_id: String,
        /// site URL (e.g. "https://acme.atlassian.net")
        site_url: String,
    },
    /// remove one workspace's cache entry
    Evict {
        workspace_id: String,
        site_url: String,
    },
    /// remove every expired entry
    ClearExpired,
    /// remove the whole cache directory
    ClearAll {
        /// skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// fetch schemas and object types for the configured workspace and save them
    Refresh,
}

fn long_version() -> &'static str {
    Box::leak(assetgate::version::long_version().into_boxed_str())
}

// ── helpers ─────────────────────────────────────────────────────────

/// Config file, if one can be found. Only `refresh` requires it.
fn load_config(args: &Args) -> CliResult<Option<Config>> {
    match Config::load(args.config.as_deref()) {
        Ok(config) => Ok(Some(config)),
        Err(e) if args.config.is_some() => Err(e.into()),
        Err(_) => Ok(None),
    }
}

/// `--cache-dir`, else the config file's directory and TTL, else defaults.
fn disk_config(args: &Args, config: Option<&Config>) -> DiskCacheConfig {
    let base_dir = args
        .cache_dir
        .clone()
        .or_else(|| config.and_then(|c| c.cache.dir.clone()))
        .unwrap_or_else(default_base_dir);
    let disk = DiskCacheConfig::new(base_dir);
    match config {
        Some(config) => disk.ttl_hours(config.cache.ttl_hours),
        None => disk,
    }
}

/// confirm a prompt with the user; returns false if declined.
fn confirm(prompt: &str) -> bool {
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .unwrap_or(false)
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    }
}

fn print_info(info: &CacheInfo) {
    println!("workspace:     {}", info.workspace_id);
    println!("site:          {}", info.site_url);
    println!("file:          {}", info.file_name);
    println!("size:          {}", format_size(info.size_bytes));
    println!("schemas:       {}", info.schema_count);
    println!("object types:  {}", info.object_type_count);
    println!("cached at:     {}", info.cached_at.to_rfc3339());
    println!(
        "expires at:    {}{}",
        info.expires_at.to_rfc3339(),
        if info.expired { " (expired)" } else { "" }
    );
}

// ── commands ────────────────────────────────────────────────────────

fn list(disk: &DiskCache) -> CliResult<()> {
    let mut infos = disk.list_cached_workspaces()?;
    if infos.is_empty() {
        println!("no cached workspaces in {}.", disk.dir().display());
        return Ok(());
    }
    infos.sort_by(|a, b| a.workspace_id.cmp(&b.workspace_id));

    println!(
        "{:<38} {:<36} {:>7} {:>7} {:>10}  EXPIRES",
        "WORKSPACE", "SITE", "SCHEMAS", "TYPES", "SIZE"
    );
    println!("{}", "─".repeat(120));
    for info in &infos {
        println!(
            "{:<38} {:<36} {:>7} {:>7} {:>10}  {}{}",
            info.workspace_id,
            info.site_url,
            info.schema_count,
            info.object_type_count,
            format_size(info.size_bytes),
            info.expires_at.format("%Y-%m-%d %H:%M"),
            if info.expired { " (expired)" } else { "" }
        );
    }
    println!("\n{} workspaces", infos.len());
    Ok(())
}

fn show(disk: &DiskCache, workspace_id: &str, site_url: &str) -> CliResult<()> {
    let path = disk.cache_path(workspace_id, site_url);
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let Some(info) = disk
        .list_cached_workspaces()?
        .into_iter()
        .find(|info| info.file_name == file_name)
    else {
        eprintln!("no cache entry for workspace '{workspace_id}' at {site_url}.");
        process::exit(1);
    };
    print_info(&info);

    if let Ok(entry) = disk.load(workspace_id, site_url) {
        let cache = entry.into_resolver_cache();
        let mut schemas = cache.entities(EntityKind::Schema);
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        println!();
        for schema in schemas {
            let types = cache
                .entities(EntityKind::ObjectType)
                .into_iter()
                .filter(|t| t.parent_id.as_deref() == Some(schema.id.as_str()))
                .count();
            println!("  {:<40} {:>8}  {types} object types", schema.name, schema.id);
        }
    }
    Ok(())
}

fn evict(disk: &DiskCache, workspace_id: &str, site_url: &str) -> CliResult<()> {
    if disk.evict(workspace_id, site_url)? {
        println!("evicted workspace '{workspace_id}'.");
    } else {
        println!("no cache entry for workspace '{workspace_id}'.");
    }
    Ok(())
}

fn clear_expired(disk: &DiskCache) -> CliResult<()> {
    let removed = disk.clear_expired()?;
    println!("removed {removed} expired entr{}.", if removed == 1 { "y" } else { "ies" });
    Ok(())
}

fn clear_all(disk: &DiskCache, yes: bool) -> CliResult<()> {
    let count = disk.list_cached_workspaces()?.len();
    if !yes && !confirm(&format!("remove {} ({count} entries)?", disk.dir().display())) {
        println!("aborted.");
        return Ok(());
    }
    disk.clear_all()?;
    println!("cleared {}.", disk.dir().display());
    Ok(())
}

async fn refresh(args: &Args, config: Option<&Config>) -> CliResult<()> {
    let Some(config) = config else {
        eprintln!("refresh needs a config file with a [workspace] section.");
        process::exit(1);
    };
    let secrets = Secrets::load()?;

    let session = AssetgateBuilder::from_config(config, &secrets)?
        .disk_cache(disk_config(args, Some(config)))
        .build()?;

    println!("fetching schemas and object types for '{}'...", config.workspace.id);
    session.refresh_cache().await?;

    let cache = session.cache();
    println!(
        "saved {} schemas and {} object types to {}",
        cache.len(EntityKind::Schema),
        cache.len(EntityKind::ObjectType),
        session
            .disk_cache()
            .map(|d| d.cache_path(session.workspace_id(), session.site_url()))
            .unwrap_or_default()
            .display()
    );
    Ok(())
}

// ── main ────────────────────────────────────────────────────────────

async fn run(args: &Args) -> CliResult<()> {
    let config = load_config(args)?;
    let disk = DiskCache::new(disk_config(args, config.as_ref()));
    match &args.command {
        Command::List => list(&disk),
        Command::Show {
            workspace_id,
            site_url,
        } => show(&disk, workspace_id, site_url),
        Command::Evict {
            workspace_id,
            site_url,
        } => evict(&disk, workspace_id, site_url),
        Command::ClearExpired => clear_expired(&disk),
        Command::ClearAll { yes } => clear_all(&disk, *yes),
        Command::Refresh => refresh(args, config.as_ref()).await,
    }
}

#[tokio::main]
async fn main() {
    assetgate::logging::init_tracing();

    let args = Args::parse();
    if let Err(e) = run(&args).await {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
