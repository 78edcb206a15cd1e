//! Command-line and environment configuration.

use clap::Parser;
use std::io;
use std::path::{Path, PathBuf};

const DEFAULT_DB_FILE: &str = "usercrud.sqlite3";
const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Parser, Debug)]
#[command(name = "usercrud")]
#[command(about = "Create, list, find, update and delete users stored in SQLite.")]
#[command(version)]
pub struct Cli {
    #[arg(
        long,
        env = "USERCRUD_DB",
        help = "SQLite database file, created if missing [default: usercrud.sqlite3]"
    )]
    pub db: Option<PathBuf>,

    #[arg(
        long,
        help = "Use a throwaway in-memory database; overrides --db and USERCRUD_DB"
    )]
    pub in_memory: bool,

    #[arg(
        long,
        env = "USERCRUD_LOG_DIR",
        help = "Directory for rolling log files [default: ./logs]"
    )]
    pub log_dir: Option<PathBuf>,

    #[arg(
        long,
        env = "USERCRUD_LOG_LEVEL",
        help = "trace|debug|info|warn|error [default: debug in debug builds, info otherwise]"
    )]
    pub log_level: Option<String>,
}

/// Where the user table lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    File(PathBuf),
    Memory,
}

/// Resolved settings with defaults applied and paths made absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db: DbLocation,
    pub log_dir: PathBuf,
    pub log_level: String,
}

impl AppConfig {
    /// Applies defaults; relative log directories resolve against `cwd`.
    ///
    /// `--in-memory` wins over any database path, including one from the
    /// environment.
    pub fn resolve(cli: Cli, cwd: &Path) -> Self {
        let db = if cli.in_memory {
            DbLocation::Memory
        } else {
            DbLocation::File(cli.db.unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE)))
        };
        let log_dir = cli
            .log_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR));
        let log_dir = if log_dir.is_absolute() {
            log_dir
        } else {
            cwd.join(log_dir)
        };
        let log_level = cli
            .log_level
            .unwrap_or_else(|| usercrud_core::default_log_level().to_string());

        Self {
            db,
            log_dir,
            log_level,
        }
    }

    pub fn from_env_and_args() -> io::Result<Self> {
        let cwd = std::env::current_dir()?;
        Ok(Self::resolve(Cli::parse(), &cwd))
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, Cli, DbLocation, DEFAULT_DB_FILE};
    use clap::Parser;
    use std::path::{Path, PathBuf};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("usercrud").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn explicit_arguments_are_kept() {
        let cli = parse(&[
            "--db",
            "/data/people.db",
            "--log-dir",
            "/var/log/usercrud",
            "--log-level",
            "warn",
        ]);
        let config = AppConfig::resolve(cli, Path::new("/work"));

        assert_eq!(config.db, DbLocation::File(PathBuf::from("/data/people.db")));
        assert_eq!(config.log_dir, PathBuf::from("/var/log/usercrud"));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn relative_log_dir_resolves_against_cwd() {
        let cli = parse(&["--in-memory", "--log-dir", "out/logs"]);
        let config = AppConfig::resolve(cli, Path::new("/work"));

        assert_eq!(config.db, DbLocation::Memory);
        assert_eq!(config.log_dir, PathBuf::from("/work/out/logs"));
    }

    #[test]
    fn in_memory_overrides_explicit_db() {
        let cli = parse(&["--in-memory", "--db", "x.db"]);
        let config = AppConfig::resolve(cli, Path::new("/work"));

        assert_eq!(config.db, DbLocation::Memory);
    }

    // Only test that touches USERCRUD_DB; the other tests pass `--db` or
    // `--in-memory` so they do not depend on it.
    #[test]
    fn db_env_var_is_used_unless_in_memory() {
        std::env::remove_var("USERCRUD_DB");
        let config = AppConfig::resolve(parse(&[]), Path::new("/work"));
        assert_eq!(config.db, DbLocation::File(PathBuf::from(DEFAULT_DB_FILE)));

        std::env::set_var("USERCRUD_DB", "/srv/elsewhere.db");
        let from_env = AppConfig::resolve(parse(&[]), Path::new("/work"));
        let in_memory = Cli::try_parse_from(["usercrud", "--in-memory"]);
        std::env::remove_var("USERCRUD_DB");

        assert_eq!(
            from_env.db,
            DbLocation::File(PathBuf::from("/srv/elsewhere.db"))
        );
        let in_memory = AppConfig::resolve(in_memory.unwrap(), Path::new("/work"));
        assert_eq!(in_memory.db, DbLocation::Memory);
    }
}
