//! File-backed shared mapping for one bot.

use crate::shm::layout::REGION_BYTES;
use crate::shm::view::SensorView;
use crate::types::SetupError;
use log::info;
use memmap2::{MmapMut, MmapOptions};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

/// Name of the region file inside the per-bot directory.
pub const REGION_FILE: &str = "shm";

/// The shared sensor region, created and owned by the supervisor.
///
/// The isolated process maps the same file from inside its container. Access
/// is lock-free; the ordering contract (snapshot written before STEP, region
/// untouched by the bot after its reply) is cooperative and unenforced. A
/// misbehaving bot can only corrupt its own observable state: the arrays are
/// fixed-capacity and the mapping is not executable.
pub struct SensorRegion {
    map: MmapMut,
    path: PathBuf,
}

impl SensorRegion {
    /// Creates the per-bot directory (pre-existing is fine), sizes the region
    /// file and maps it read-write. Zeroes the region, stamps the layout
    /// version and presets the neutral default palette.
    pub fn create(dir: &Path) -> Result<Self, SetupError> {
        fs::create_dir_all(dir).map_err(SetupError::Directory)?;

        let path = dir.join(REGION_FILE);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)
            .map_err(SetupError::SharedMemory)?;
        file.set_len(REGION_BYTES as u64)
            .map_err(SetupError::SharedMemory)?;

        let mut map = unsafe { MmapOptions::new().map_mut(&file) }.map_err(SetupError::SharedMemory)?;

        map.fill(0);
        {
            let mut view = SensorView::new(&mut map);
            view.stamp_version();
            view.set_default_palette();
        }

        info!(
            "mapped sensor region at {} ({} bytes)",
            path.display(),
            REGION_BYTES
        );

        Ok(Self { map, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Typed view over the mapped bytes.
    pub fn view(&mut self) -> SensorView<'_> {
        SensorView::new(&mut self.map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shm::layout::LAYOUT_VERSION;

    fn scratch_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("botbox-region-{}-{}", tag, std::process::id()))
    }

    #[test]
    fn create_stamps_version_and_palette() {
        let dir = scratch_dir("stamp");
        let mut region = SensorRegion::create(&dir).unwrap();
        {
            let view = region.view();
            assert_eq!(view.version(), LAYOUT_VERSION);
            assert_eq!(view.color_count(), 1);
        }
        assert_eq!(
            fs::metadata(region.path()).unwrap().len(),
            REGION_BYTES as u64
        );
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn create_tolerates_existing_directory() {
        let dir = scratch_dir("exists");
        fs::create_dir_all(&dir).unwrap();
        let region = SensorRegion::create(&dir);
        assert!(region.is_ok());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn recreate_clears_stale_content() {
        let dir = scratch_dir("stale");
        {
            let mut region = SensorRegion::create(&dir).unwrap();
            let mut view = region.view();
            view.write_food(&[crate::shm::view::FoodEntry {
                x: 1.0,
                y: 2.0,
                value: 3.0,
                dir: 0.0,
                dist: 2.2,
            }]);
        }
        let mut region = SensorRegion::create(&dir).unwrap();
        assert_eq!(region.view().food_count(), 0);
        let _ = fs::remove_dir_all(&dir);
    }
}
