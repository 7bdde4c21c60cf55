//! Sample buffers for directory-based scoring

use ndarray::Array3;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Error, Result};

/// Destination for generated `u8` HWC images
pub trait SampleSink {
    /// Store one batch; `iter_idx` numbers the batch within the run
    fn write(&mut self, iter_idx: usize, images: &[Array3<u8>]) -> Result<()>;

    /// Called once after scoring; `clean` asks the sink to discard its samples
    fn finish(&mut self, _clean: bool) -> Result<()> {
        Ok(())
    }
}

/// Writes each image as `iter{i}_b{j}.png` under one directory
#[derive(Debug)]
pub struct PngDirectory {
    dir: PathBuf,
    written: usize,
}

impl PngDirectory {
    /// Create the directory (and parents) if needed
    pub fn create<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, written: 0 })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Images written so far
    pub fn written(&self) -> usize {
        self.written
    }

    fn save(path: &Path, image: &Array3<u8>) -> Result<()> {
        let (height, width, channels) = image.dim();
        let raw: Vec<u8> = image.iter().copied().collect();
        let (w, h) = (width as u32, height as u32);
        let bad_layout =
            || Error::InvalidBatch(format!("cannot encode {height}x{width}x{channels}"));
        match channels {
            1 => image::GrayImage::from_raw(w, h, raw).ok_or_else(bad_layout)?.save(path)?,
            3 => image::RgbImage::from_raw(w, h, raw).ok_or_else(bad_layout)?.save(path)?,
            _ => return Err(bad_layout()),
        }
        Ok(())
    }
}

impl SampleSink for PngDirectory {
    fn write(&mut self, iter_idx: usize, images: &[Array3<u8>]) -> Result<()> {
        for (img_idx, image) in images.iter().enumerate() {
            let path = self.dir.join(format!("iter{iter_idx}_b{img_idx}.png"));
            Self::save(&path, image)?;
            self.written += 1;
        }
        Ok(())
    }

    fn finish(&mut self, clean: bool) -> Result<()> {
        if clean {
            fs::remove_dir_all(&self.dir)?;
        } else {
            info!(dir = %self.dir.display(), images = self.written, "sampled images saved");
        }
        Ok(())
    }
}
