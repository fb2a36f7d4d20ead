// SPDX-FileCopyrightText: 2022-2024 Noah Fontes
//
// SPDX-License-Identifier: Apache-2.0

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{error::Result, metadata};

use super::{IsPersistent, Storage};

pub(crate) struct File {
    path: PathBuf,
}

impl File {
    pub(crate) fn new<P: AsRef<Path>>(file: P) -> Option<Self> {
        metadata::PROJECT_DIRS
            .as_ref()
            .map(|dirs| Self::new_at(dirs.data_dir().join(file)))
    }

    pub(crate) fn new_at<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl IsPersistent for File {
    fn is_persistent(&self) -> bool {
        true
    }
}

#[async_trait]
impl<T: Send + Serialize + Sync + for<'de> Deserialize<'de>> Storage<T> for File {
    async fn get(&mut self) -> Result<Option<T>> {
        match fs::File::open(&self.path) {
            Ok(fp) => Ok(Some(serde_json::from_reader::<fs::File, T>(fp)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&mut self, data: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::File::create(&self.path)?;
        serde_json::to_writer(file, data)?;
        debug!("Stored data at {}", self.path.display());
        Ok(())
    }

    async fn clear(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Removed {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{env, process};

    use crate::error::Result;

    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        env::temp_dir()
            .join(format!("nexus-access-test-{}", process::id()))
            .join(name)
    }

    #[tokio::test]
    async fn round_trips_and_clears() -> Result<()> {
        let mut storage = File::new_at(scratch_path("round-trip.json"));

        assert_eq!(Storage::<Vec<u32>>::get(&mut storage).await?, None);

        storage.update(&vec![1_u32, 2, 3]).await?;
        assert_eq!(
            Storage::<Vec<u32>>::get(&mut storage).await?,
            Some(vec![1, 2, 3])
        );

        Storage::<Vec<u32>>::clear(&mut storage).await?;
        assert_eq!(Storage::<Vec<u32>>::get(&mut storage).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn clearing_a_missing_file_succeeds() -> Result<()> {
        let mut storage = File::new_at(scratch_path("never-written.json"));
        Storage::<Vec<u32>>::clear(&mut storage).await
    }
}
