use std::{
    fs,
    path::{Path, PathBuf},
};

use base64::{Engine as _, engine::general_purpose};
use thiserror::Error;
use url::Url;

use crate::fetch::Fetch;

/// A downloaded cover, ready to be embedded in the document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cover {
    /// Image file name, also used as the image id in the document.
    pub id: String,
    /// Base64 of the image bytes.
    pub data: String,
}

/// Problems with the temporary cover file. None of them stop the run.
#[derive(Debug, Error)]
pub enum CoverError {
    #[error("could not write temporary image {}: {source}", path.display())]
    Write { path: PathBuf, source: std::io::Error },
    #[error("could not read back temporary image {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("could not delete temporary image {}: {source}", path.display())]
    Delete { path: PathBuf, source: std::io::Error },
}

pub struct CoverFetcher {
    tmp_dir: PathBuf,
    keep: bool,
}

impl Default for CoverFetcher {
    fn default() -> Self {
        CoverFetcher::new(std::env::temp_dir(), false)
    }
}

impl CoverFetcher {
    pub fn new(tmp_dir: impl Into<PathBuf>, keep: bool) -> Self {
        CoverFetcher {
            tmp_dir: tmp_dir.into(),
            keep,
        }
    }

    /// Download `url` and encode it.
    ///
    /// The image goes through a temporary `<id>.jpeg` file which is removed
    /// afterwards unless covers are kept. Only the download itself can fail;
    /// temp-file trouble is logged and the in-memory bytes are used.
    pub fn fetch(&self, fetcher: &dyn Fetch, url: &Url) -> anyhow::Result<Cover> {
        let id = format!("{}.jpeg", uuid::Uuid::new_v4().simple());
        let bytes = fetcher.get_bytes(url)?;
        let path = self.tmp_dir.join(&id);

        let stored = match store(&path, &bytes) {
            Ok(stored) => stored,
            Err(e) => {
                log::warn!("{e}");
                bytes
            }
        };
        let data = general_purpose::STANDARD.encode(&stored);

        if !self.keep
            && path.exists()
            && let Err(e) = remove(&path)
        {
            log::warn!("{e}");
        }

        log::debug!("cover {id} from {url} ({} bytes)", stored.len());
        Ok(Cover { id, data })
    }
}

fn store(path: &Path, bytes: &[u8]) -> Result<Vec<u8>, CoverError> {
    fs::write(path, bytes).map_err(|source| CoverError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    fs::read(path).map_err(|source| CoverError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn remove(path: &Path) -> Result<(), CoverError> {
    fs::remove_file(path).map_err(|source| CoverError::Delete {
        path: path.to_path_buf(),
        source,
    })
}
