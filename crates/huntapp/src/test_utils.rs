use crate::config::EngineConfig;
use crate::init::{initialize, HuntContext};
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestEnv {
    // Dropping this deletes the data directory.
    pub _temp_dir: TempDir,
    pub ctx: HuntContext,
    pub root: PathBuf,
}

impl TestEnv {
    pub fn new() -> crate::error::Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let root = temp_dir.path().join("data");
        let ctx = initialize(EngineConfig {
            data_dir: Some(root.clone()),
            ..Default::default()
        })?;
        Ok(Self {
            _temp_dir: temp_dir,
            ctx,
            root,
        })
    }

    /// Re-runs startup against the same directory, as a restart would.
    pub fn restart(&mut self) -> crate::error::Result<()> {
        self.ctx = initialize(self.ctx.config.clone())?;
        Ok(())
    }

    pub fn hunts_dir(&self) -> PathBuf {
        self.root.join("hunts")
    }

    pub fn snapshots_dir(&self) -> PathBuf {
        self.root.join("snapshots")
    }
}
