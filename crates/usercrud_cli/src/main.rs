//! Console front end for usercrud.
//!
//! # Responsibility
//! - Resolve configuration, start logging, open the database once.
//! - Run the menu on stdin/stdout and close the database on the way out.

mod config;
mod console;
mod menu;

use anyhow::{anyhow, Context, Result};
use config::{AppConfig, DbLocation};
use console::Console;
use log::info;
use std::io;
use usercrud_core::{
    close_db, core_version, init_logging, open_db, open_db_in_memory, SqliteUserRepository,
    UserService,
};

fn main() -> Result<()> {
    let config = AppConfig::from_env_and_args().context("failed to read configuration")?;

    init_logging(&config.log_level, &config.log_dir).map_err(|err| anyhow!(err))?;
    info!(
        "event=cli_start module=cli status=ok version={} db={:?}",
        core_version(),
        config.db
    );

    let conn = match &config.db {
        DbLocation::File(path) => open_db(path)
            .with_context(|| format!("failed to open database `{}`", path.display()))?,
        DbLocation::Memory => open_db_in_memory().context("failed to open in-memory database")?,
    };

    let menu_result = {
        let service = UserService::new(SqliteUserRepository::new(&conn));
        let stdin = io::stdin();
        let mut console = Console::new(stdin.lock(), io::stdout());
        menu::run(&service, &mut console)
    };

    close_db(conn).context("failed to close database")?;
    menu_result.context("console I/O failed")?;

    info!("event=cli_exit module=cli status=ok");
    Ok(())
}
