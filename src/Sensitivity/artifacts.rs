//! Solver artifacts of the directional-derivative strategy: the labeled export written before the
//! k_aug solve and the relocation of the dsdp files after the dot_sens solve.
use super::sens_error::SensitivityError;
use crate::Modeling::Model;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Moves each of `files` from `work_dir` into `work_dir/target_dir`.
///
/// A missing file is skipped. Any other failure is logged and the remaining files are still
/// moved. Returns the new paths of the moved files.
pub fn relocate_artifacts(
    work_dir: &Path,
    target_dir: &str,
    files: &[String],
) -> Result<Vec<PathBuf>, SensitivityError> {
    let target = work_dir.join(target_dir);
    fs::create_dir_all(&target)?;
    let mut moved = Vec::new();
    for file in files {
        let source = work_dir.join(file);
        if !source.exists() {
            debug!("artifact {} not present, skipped", source.display());
            continue;
        }
        let destination = target.join(file);
        match move_file(&source, &destination) {
            Ok(()) => moved.push(destination),
            Err(e) => warn!(
                "cannot move artifact {} to {}: {}",
                source.display(),
                destination.display(),
                e
            ),
        }
    }
    info!("{} artifact(s) moved to {}", moved.len(), target.display());
    Ok(moved)
}

/// rename, falling back to copy + remove across file systems
fn move_file(source: &Path, destination: &Path) -> std::io::Result<()> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(source, destination)?;
            fs::remove_file(source)
        }
    }
}

/// Writes `<stem>.nl` (the model in the JSON exchange format), `<stem>.col` (one variable label per
/// line) and `<stem>.row` (active constraint rows, then active objectives).
pub fn write_labeled_export(
    model: &Model,
    work_dir: &Path,
    stem: &str,
) -> Result<[PathBuf; 3], SensitivityError> {
    let nl = work_dir.join(format!("{}.nl", stem));
    let col = work_dir.join(format!("{}.col", stem));
    let row = work_dir.join(format!("{}.row", stem));
    fs::write(&nl, serde_json::to_string_pretty(model)?)?;

    let mut columns = String::new();
    for v in model.variables() {
        if model.is_fixed(&v)? {
            continue;
        }
        columns.push_str(&model.data_name(&v));
        columns.push('\n');
    }
    fs::write(&col, columns)?;

    let mut rows = String::new();
    for c in model.active_constraints() {
        rows.push_str(&model.data_name(&c));
        rows.push('\n');
    }
    for o in model.active_objectives() {
        rows.push_str(&model.data_name(&o));
        rows.push('\n');
    }
    fs::write(&row, rows)?;
    info!("labeled export written to {}", nl.display());
    Ok([nl, col, row])
}
