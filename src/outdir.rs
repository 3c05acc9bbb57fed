use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::{ConvertError, Result};

/// Create the output directory, optionally clearing an old one first
pub fn prepare_output_dir(dir: &Path, delete_first: bool) -> Result<()> {
    if delete_first && dir.exists() {
        info!("Deleting previous output directory [{}]", dir.display());
        fs::remove_dir_all(dir).map_err(|e| ConvertError::output(dir, e))?;
    }

    if !dir.exists() {
        info!("Creating output directory [{}]", dir.display());
        fs::create_dir_all(dir).map_err(|e| ConvertError::output(dir, e))?;
    }

    Ok(())
}
