//! The agenda file itself.
use log::*;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::error::{AgendaError, Result};

/// Body of every agenda file. The date only appears in the file name.
pub const AGENDA_TEMPLATE: &str = "# General\n\n# Skyblock";

/// Create (or truncate) `{dir}/{file_name}` and write the agenda template.
pub fn write_agenda(dir: &Path, file_name: &str) -> Result<PathBuf> {
    let path = dir.join(file_name);
    debug!("writing agenda to {}", path.display());

    let to_error = |source| AgendaError::WriteFile {
        path: path.clone(),
        source,
    };

    let file = File::create(&path).map_err(to_error)?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(AGENDA_TEMPLATE.as_bytes())
        .map_err(to_error)?;
    writer.flush().map_err(to_error)?;

    Ok(path)
}
