use crate::error::RaincheckError;
use log::info;
use std::io;
use std::path::{Path, PathBuf};

const CACHE_DIR_NAME: &str = "raincheck_cache";

pub(crate) fn get_cache_dir() -> Result<PathBuf, RaincheckError> {
    dirs::cache_dir()
        .map(|p| p.join(CACHE_DIR_NAME))
        .ok_or(RaincheckError::CacheDirResolution)
}

pub(crate) async fn ensure_cache_dir_exists(path: &Path) -> Result<(), RaincheckError> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(RaincheckError::CacheDirCreation(
                    path.to_path_buf(),
                    io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        "cache path exists but is not a directory",
                    ),
                ));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Creating cache directory: {}", path.display());
            tokio::fs::create_dir_all(path)
                .await
                .map_err(|e| RaincheckError::CacheDirCreation(path.to_path_buf(), e))
        }
        Err(e) => Err(RaincheckError::CacheDirCreation(path.to_path_buf(), e)),
    }
}
