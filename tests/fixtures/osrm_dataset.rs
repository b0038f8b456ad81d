//! Prepares an OSRM MLD dataset for the container-backed tests.
//!
//! Downloads a Geofabrik extract once and runs the OSRM preprocessing
//! steps through Docker, skipping steps whose outputs already exist.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("extract download failed: {0}")]
    Download(#[from] reqwest::Error),

    #[error("{step} exited with {status}")]
    Step { step: String, status: String },
}

/// A prepared dataset on disk.
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    /// Directory mounted into the container at `/data`.
    pub data_dir: PathBuf,
    /// File name of the `.osrm` base inside `data_dir`.
    pub osrm_file: String,
}

impl PreparedDataset {
    /// Ensures `region` (a Geofabrik path such as
    /// `north-america/us/nevada`) is downloaded and preprocessed under
    /// `data_root`.
    pub fn ensure(region: &str, data_root: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let name = region.rsplit('/').next().unwrap_or(region);
        let data_root = data_root.as_ref();
        let data_root = if data_root.is_absolute() {
            data_root.to_path_buf()
        } else {
            std::env::current_dir()?.join(data_root)
        };
        let data_dir = data_root.join(name);
        fs::create_dir_all(&data_dir)?;

        let pbf_file = format!("{}-latest.osm.pbf", name);
        let pbf_path = data_dir.join(&pbf_file);
        if !pbf_path.exists() {
            let url = format!("https://download.geofabrik.de/{}-latest.osm.pbf", region);
            tracing::info!(%url, "downloading OSM extract");
            let bytes = reqwest::blocking::get(&url)?.error_for_status()?.bytes()?;
            let tmp_path = pbf_path.with_extension("tmp");
            fs::write(&tmp_path, &bytes)?;
            fs::rename(tmp_path, &pbf_path)?;
        }

        let osrm_file = format!("{}-latest.osrm", name);
        let osrm_base = data_dir.join(&osrm_file);
        if !osrm_base.exists() {
            osrm_step(&data_dir, &["osrm-extract", "-p", "/opt/car.lua", &format!("/data/{}", pbf_file)])?;
        }

        let mld_outputs = ["partition", "mldgr", "cells"];
        if !mld_outputs.iter().all(|ext| osrm_base.with_extension(format!("osrm.{}", ext)).exists()) {
            osrm_step(&data_dir, &["osrm-partition", &format!("/data/{}", osrm_file)])?;
            osrm_step(&data_dir, &["osrm-customize", &format!("/data/{}", osrm_file)])?;
        }

        Ok(Self { data_dir, osrm_file })
    }

    /// Modification time of the partition output, used to key reused
    /// containers to a specific preprocessing run.
    pub fn revision(&self) -> u64 {
        fs::metadata(self.data_dir.join(&self.osrm_file).with_extension("osrm.partition"))
            .and_then(|meta| meta.modified())
            .ok()
            .and_then(|time| time.duration_since(std::time::SystemTime::UNIX_EPOCH).ok())
            .map(|duration| duration.as_secs())
            .unwrap_or(0)
    }
}

fn osrm_step(data_dir: &Path, args: &[&str]) -> Result<(), DatasetError> {
    tracing::info!(step = args[0], "running OSRM preprocessing");
    let status = Command::new("docker")
        .args(["run", "--rm", "-t", "-v"])
        .arg(format!("{}:/data", data_dir.display()))
        .arg("osrm/osrm-backend")
        .args(args)
        .status()?;

    if status.success() {
        Ok(())
    } else {
        Err(DatasetError::Step {
            step: args[0].to_string(),
            status: status.to_string(),
        })
    }
}
