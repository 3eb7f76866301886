//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `swimboard_core` linkage without any view layer.
//! - Print a deterministic summary of a board database.
//!
//! Usage: `swimboard_cli [DB_PATH] [CONFIG_JSON]`. Without `DB_PATH` an
//! in-memory board is used.
//!
//! `DB_PATH` is created and migrated if needed. Board entries are read into
//! an in-memory snapshot, so lane seeding and load-time repair are shown but
//! never written back to the file.

use std::process::ExitCode;
use swimboard_core::db::{open_db, open_db_in_memory};
use swimboard_core::{BoardService, CoreConfig, MemoryKeyValueStore, SqliteKeyValueStore};

fn main() -> ExitCode {
    println!("swimboard_core ping={}", swimboard_core::ping());
    println!("swimboard_core version={}", swimboard_core::core_version());

    let mut args = std::env::args().skip(1);
    let db_path = args.next();
    let config_path = args.next();

    match run(db_path.as_deref(), config_path.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=cli_run module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(
    db_path: Option<&str>,
    config_path: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = match config_path {
        Some(path) => CoreConfig::from_file(path)?,
        None => CoreConfig::default(),
    };
    config.logging.init()?;

    let conn = match db_path {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let storage = SqliteKeyValueStore::try_new(&conn)?;
    let snapshot = MemoryKeyValueStore::snapshot_of(
        &storage,
        &[config.board.tasks_key.as_str(), config.board.lanes_key.as_str()],
    )?;
    let board = BoardService::load(snapshot, config.board)?;

    for lane in board.lanes() {
        println!(
            "lane id={} name={:?} color={} tasks={}",
            lane.id,
            lane.name,
            lane.color,
            board.lane_tasks(&lane.id).len()
        );
    }
    println!("tasks total={}", board.task_store().len());
    Ok(())
}
