use std::{
    fs::File,
    io::{ErrorKind, Read},
    path::PathBuf,
};

use anyhow::{Context, Result};
use fs4::fs_std::FileExt;
use tracing::debug;

use crate::habits::habit::Habit;

use super::entities::HabitEntity;

/// Interface for abstracting storage of habits.
pub trait HabitStore {
    /// Loads the persisted habits in file order. No saved state loads as an
    /// empty list, a corrupted file or record is an error.
    fn load_all(&self) -> Result<Vec<Habit>>;

    /// Overwrites the persisted state with the full current habit list.
    fn save_all<'a>(&self, habits: impl Iterator<Item = &'a Habit>) -> Result<()>;
}

/// The main realization of [HabitStore]. Keeps everything in one json file
/// guarded by advisory locks, so two cli invocations racing on the same file
/// don't interleave their writes.
pub struct HabitStoreImpl {
    file_path: PathBuf,
}

impl HabitStoreImpl {
    pub fn new(file_path: PathBuf) -> Result<Self, std::io::Error> {
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        Ok(Self { file_path })
    }
}

impl HabitStore for HabitStoreImpl {
    fn load_all(&self) -> Result<Vec<Habit>> {
        let mut file = match File::open(&self.file_path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => {
                return Err(e).with_context(|| format!("Can't open {:?}", self.file_path));
            }
        };
        debug!("Loading habits from {:?}", self.file_path);

        // Semi-safe acquire-release for the file
        file.lock_shared()?;
        let mut contents = String::new();
        let read = file.read_to_string(&mut contents);
        file.unlock()?;
        read?;

        let entities: Vec<HabitEntity> = serde_json::from_str(&contents)
            .with_context(|| format!("Habit file {:?} is corrupted", self.file_path))?;

        entities
            .into_iter()
            .map(HabitEntity::into_habit)
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("Habit file {:?}", self.file_path))
    }

    fn save_all<'a>(&self, habits: impl Iterator<Item = &'a Habit>) -> Result<()> {
        let entities: Vec<HabitEntity> = habits.map(HabitEntity::from).collect();

        let file = File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.file_path)?;

        file.lock_exclusive()?;
        let written = write_entities(&file, &entities);
        file.unlock()?;
        written
    }
}

fn write_entities(file: &File, entities: &[HabitEntity]) -> Result<()> {
    // Truncate after taking the lock, a concurrent reader should never see
    // the file half-written.
    file.set_len(0)?;
    serde_json::to_writer_pretty(file, entities)?;
    file.sync_all()?;
    Ok(())
}
