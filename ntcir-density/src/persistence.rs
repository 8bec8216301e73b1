//! Estimator bundle persistence
//!
//! Bundles are stored as JSON. Writes go to a sibling temp file which is then
//! renamed over the destination, so a crash never leaves a truncated bundle.

use crate::density::EstimatorBundle;
use ntcir_common::{Error, Result};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Write `bundle` to `path`, replacing any existing file
pub fn save_bundle(bundle: &EstimatorBundle, path: &Path) -> Result<()> {
    let temp_path = temp_path_for(path);

    let file = File::create(&temp_path).map_err(|e| Error::io(&temp_path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, bundle)
        .map_err(|e| Error::Serialization(format!("Failed to encode estimators: {}", e)))?;
    writer.flush().map_err(|e| Error::io(&temp_path, e))?;
    drop(writer);

    debug!("Renaming {} to {}", temp_path.display(), path.display());
    fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))?;

    info!("Estimators written to {}", path.display());
    Ok(())
}

/// Read a bundle previously written by [`save_bundle`]
pub fn load_bundle(path: &Path) -> Result<EstimatorBundle> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let bundle: EstimatorBundle = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        Error::Serialization(format!("Failed to decode {}: {}", path.display(), e))
    })?;
    bundle.validate()?;
    Ok(bundle)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name: OsString = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("estimators"));
    name.push(".tmp");
    path.with_file_name(name)
}

impl EstimatorBundle {
    pub fn save(&self, path: &Path) -> Result<()> {
        save_bundle(self, path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        load_bundle(path)
    }
}
