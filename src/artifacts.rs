use std::path::{Path, PathBuf};

use image::{GrayImage, RgbImage};
use log::debug;

use crate::error::{Result, StraightenError};

/// Writer for intermediate pipeline images
///
/// Disabled writers do nothing. Enabled writers overwrite fixed file names in
/// their directory.
#[derive(Debug, Clone, Default)]
pub struct DebugArtifacts {
    dir: Option<PathBuf>,
}

impl DebugArtifacts {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    pub fn disabled() -> Self {
        Self { dir: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn save_gray(&self, name: &str, img: &GrayImage) -> Result<()> {
        match self.target(name) {
            Some(path) => img.save(&path).map_err(|source| StraightenError::Write { path, source }),
            None => Ok(()),
        }
    }

    pub fn save_rgb(&self, name: &str, img: &RgbImage) -> Result<()> {
        match self.target(name) {
            Some(path) => img.save(&path).map_err(|source| StraightenError::Write { path, source }),
            None => Ok(()),
        }
    }

    fn target(&self, name: &str) -> Option<PathBuf> {
        let path = self.dir.as_ref()?.join(name);
        debug!("Writing debug artifact {:?}", path);
        Some(path)
    }
}
