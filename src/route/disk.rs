use std::fs;
use std::io;
use std::path::PathBuf;

use jwalk::WalkDir;

use super::{RouteError, RouteStore};

/// Route store backed by files under an output directory.
#[derive(Debug, Clone)]
pub struct DiskRoutes {
    root: PathBuf,
}

impl DiskRoutes {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn file_path(&self, path: &str) -> PathBuf {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.root.clone(), |acc, segment| acc.join(segment))
    }

    fn io_error(path: &str, source: io::Error) -> RouteError {
        RouteError::Io {
            path: path.to_string(),
            source,
        }
    }
}

impl RouteStore for DiskRoutes {
    fn list(&self) -> Vec<String> {
        WalkDir::new(&self.root)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                let path = e.path();
                let rel = path.strip_prefix(&self.root).ok()?;
                let segments: Option<Vec<&str>> =
                    rel.components().map(|c| c.as_os_str().to_str()).collect();
                Some(segments?.join("/"))
            })
            .collect()
    }

    fn get(&self, path: &str) -> Result<Vec<u8>, RouteError> {
        fs::read(self.file_path(path)).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => RouteError::NotFound(path.to_string()),
            _ => Self::io_error(path, err),
        })
    }

    fn set(&self, path: &str, content: Vec<u8>) -> Result<(), RouteError> {
        let file = self.file_path(path);
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).map_err(|err| Self::io_error(path, err))?;
        }
        fs::write(&file, content).map_err(|err| Self::io_error(path, err))
    }

    fn remove(&self, path: &str) -> Result<(), RouteError> {
        match fs::remove_file(self.file_path(path)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Self::io_error(path, err)),
        }
    }
}
