//! `stigmergy status` (spec §6): print the Status Board report.

use std::path::Path;

use anyhow::{Context, Result};
use stigmergy_board::StatusBoard;

use crate::paths;

pub fn handle_status(project_root: &Path) -> Result<i32> {
    let board_path = paths::status_board_path(project_root);
    let board = StatusBoard::new(&board_path);
    board
        .initialize(&paths::project_name(project_root), chrono::Utc::now())
        .context("initializing status board")?;

    let report = board.report().context("reading status board")?;
    println!("{report}");
    Ok(0)
}
