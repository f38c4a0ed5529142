use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{PipelineError, PipelineResult};

/// Persist any serializable object as JSON, creating parent directories.
pub fn save_object<T: Serialize, P: AsRef<Path>>(path: P, obj: &T) -> PipelineResult<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| PipelineError::io(dir, e))?;
    }

    let file = File::create(path).map_err(|e| PipelineError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, obj).map_err(|source| PipelineError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|e| PipelineError::io(path, e))?;

    log::debug!("saved object to {}", path.display());
    Ok(())
}

/// Read back an object written by [`save_object`].
pub fn load_object<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> PipelineResult<T> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;

    let obj = serde_json::from_reader(BufReader::new(file)).map_err(|source| {
        PipelineError::Deserialize {
            path: path.to_path_buf(),
            source,
        }
    })?;

    log::debug!("loaded object from {}", path.display());
    Ok(obj)
}
