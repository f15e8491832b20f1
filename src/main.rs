// cache-programs entry point.
// Loads configuration, sets up logging, and dispatches the selected command.

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};

use program_cache::cache::{CacheStore, FileCache, MemoryCache};
use program_cache::cli::{Args, Command};
use program_cache::config::Config;
use program_cache::logging::setup_logging;
use program_cache::refresh::RefreshJob;
use program_cache::show::read_index;
use program_cache::sites::TenancyMode;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            // Logging is configured from the config, so fall back to defaults to report this.
            setup_logging("info", args.log_format);
            error!(error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    if let Some(dir) = &args.cache_dir {
        config.cache.dir = Some(dir.clone());
    }

    setup_logging(&config.log_level, args.log_format);

    let cache = match config.cache_dir() {
        Ok(dir) => FileCache::new(dir),
        Err(e) => {
            error!(error = %e, "failed to resolve cache directory");
            return ExitCode::FAILURE;
        }
    };

    match args.command() {
        Command::Refresh { tenancy, dry_run } => {
            let mode = tenancy.unwrap_or(config.tenancy);
            if dry_run {
                dry_run_refresh(&config, mode).await
            } else {
                info!(cache_dir = %cache.root().display(), "writing to file cache");
                refresh(&config, &cache, mode).await
            }
        }
        Command::Show { site, tenancy } => {
            show(&cache, tenancy.unwrap_or(config.tenancy), site.as_deref())
        }
    }
}

async fn refresh<C: CacheStore>(config: &Config, cache: &C, mode: TenancyMode) -> ExitCode {
    if let Err(e) = config.validate() {
        error!(error = %e, "invalid configuration");
        return ExitCode::FAILURE;
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        mode = %mode,
        "starting program cache refresh"
    );

    if mode == TenancyMode::Multi && config.sites.is_empty() {
        warn!("multi-tenant mode with no sites configured, nothing will be cached");
    }

    let factory = config.client_factory();
    let job = RefreshJob::new(&factory, cache, mode, config.catalog.service_username.clone())
        .with_sites(config.sites.clone());

    match job.run().await {
        Ok(report) => {
            for failure in &report.failures {
                warn!(%failure, "refresh failure");
            }
            report.exit_code()
        }
        Err(e) => {
            error!(error = %e, "program cache refresh aborted");
            ExitCode::FAILURE
        }
    }
}

/// Run a refresh into memory and print the keys it would have written.
async fn dry_run_refresh(config: &Config, mode: TenancyMode) -> ExitCode {
    let memory = MemoryCache::new();
    let status = refresh(config, &memory, mode).await;

    for key in memory.keys() {
        println!("{}", key);
    }
    info!(entries = memory.len(), "dry run finished, cache left untouched");
    status
}

fn show(cache: &FileCache, mode: TenancyMode, site: Option<&str>) -> ExitCode {
    match read_index(cache, mode, site) {
        Ok(lines) => {
            for line in lines {
                println!("{}", line);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "failed to read cached program index");
            ExitCode::FAILURE
        }
    }
}
