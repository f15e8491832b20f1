// Command-line interface.
// Argument parsing for the refresh and show commands.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::sites::TenancyMode;

/// Rebuild the shared cache of catalog program data.
#[derive(Debug, Parser)]
#[command(name = "cache-programs", version, about)]
pub struct Args {
    /// Configuration file (defaults to ./program-cache.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,

    /// Override the cache directory
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Args {
    /// The subcommand to run; `refresh` when none was given.
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Refresh {
                tenancy: None,
                dry_run: false,
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Fetch every program from the catalog and rewrite the cache
    Refresh {
        /// Override the configured tenancy mode
        #[arg(long, value_enum)]
        tenancy: Option<TenancyMode>,

        /// Fetch into memory and list the keys that would be written
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the cached program index
    Show {
        /// Site whose index to read (multi-tenant mode)
        #[arg(long)]
        site: Option<String>,

        /// Override the configured tenancy mode
        #[arg(long, value_enum)]
        tenancy: Option<TenancyMode>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_refresh() {
        let args = Args::try_parse_from(["cache-programs"]).unwrap();
        assert_eq!(
            args.command(),
            Command::Refresh {
                tenancy: None,
                dry_run: false
            }
        );
        assert_eq!(args.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_refresh_with_tenancy() {
        let args =
            Args::try_parse_from(["cache-programs", "refresh", "--tenancy", "multi"]).unwrap();
        assert_eq!(
            args.command(),
            Command::Refresh {
                tenancy: Some(TenancyMode::Multi),
                dry_run: false
            }
        );
    }

    #[test]
    fn test_refresh_dry_run() {
        let args = Args::try_parse_from(["cache-programs", "refresh", "--dry-run"]).unwrap();
        assert_eq!(
            args.command(),
            Command::Refresh {
                tenancy: None,
                dry_run: true
            }
        );
    }

    #[test]
    fn test_show_with_global_flags() {
        let args = Args::try_parse_from([
            "cache-programs",
            "show",
            "--site",
            "north",
            "--log-format",
            "json",
            "--cache-dir",
            "/tmp/programs",
        ])
        .unwrap();

        assert_eq!(args.log_format, LogFormat::Json);
        assert_eq!(args.cache_dir, Some(PathBuf::from("/tmp/programs")));
        assert_eq!(
            args.command(),
            Command::Show {
                site: Some("north".to_string()),
                tenancy: None
            }
        );
    }
}
