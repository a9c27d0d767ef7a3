//! Console walkthrough of the Escuela student store.
//!
//! Opens `escuela.db` in the working directory, runs the fixed sequence of
//! store operations and prints each result. Takes no arguments.

mod driver;

use escuela_core::{init_logging, open_db, SqliteStudentRepository, StoreConfig, StudentService};
use log::info;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let config = StoreConfig::default().resolved_against(&std::env::current_dir()?);

    if let Err(err) = init_logging(config.log_level, &config.log_dir) {
        eprintln!("logging disabled: {err}");
    }

    // The connection lives for the whole run and is closed on every exit path.
    let conn = open_db(&config.db_path)?;
    let repo =
        SqliteStudentRepository::try_new(&conn)?.with_sequence_reset(config.sequence_reset);
    let service = StudentService::new(repo);

    let stdout = std::io::stdout();
    driver::run(&service, &mut stdout.lock())?;

    info!("event=walkthrough module=cli status=ok");
    Ok(())
}
