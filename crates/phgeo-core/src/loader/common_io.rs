// crates/phgeo-core/src/loader/common_io.rs
use crate::error::{GeoError, Result};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

#[cfg(feature = "compact")]
use flate2::{read::GzDecoder, write::GzEncoder, Compression};

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

/// Opens `path` for reading, gunzipping files that end in `.gz`.
pub fn open_stream(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).map_err(|e| {
        GeoError::NotFound(format!("Fixture not found at {}: {}", path.display(), e))
    })?;
    let reader = BufReader::new(file);

    if !is_gzip(path) {
        return Ok(Box::new(reader));
    }

    #[cfg(feature = "compact")]
    {
        Ok(Box::new(GzDecoder::new(reader)))
    }

    #[cfg(not(feature = "compact"))]
    {
        Err(GeoError::InvalidData(format!(
            "{} is gzipped but the 'compact' feature is disabled",
            path.display()
        )))
    }
}

/// `data/regions.json` -> `data/regions.json.<suffix>`
pub fn get_cache_path(source: &Path, suffix: &str) -> PathBuf {
    let filename = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    source.with_file_name(format!("{filename}.{suffix}"))
}

/// A cache is fresh when it exists and no source is newer than it.
/// Missing sources are ignored.
pub fn is_cache_fresh(cache_path: &Path, sources: &[PathBuf]) -> bool {
    let cache_time = match fs::metadata(cache_path).and_then(|m| m.modified()) {
        Ok(t) => t,
        Err(_) => return false,
    };
    sources.iter().all(|source| {
        fs::metadata(source)
            .and_then(|m| m.modified())
            .map_or(true, |t| t <= cache_time)
    })
}

/// Serializes `value` with bincode into `path`, gzipped under `compact`.
///
/// Writes to a sibling temp file first and renames it into place, so readers
/// never see a half-written file.
pub fn write_bincode<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let tmp = get_cache_path(path, "tmp");
    {
        let writer = BufWriter::new(File::create(&tmp)?);

        #[cfg(feature = "compact")]
        {
            let mut encoder = GzEncoder::new(writer, Compression::default());
            bincode::serialize_into(&mut encoder, value)?;
            encoder.finish()?.flush()?;
        }

        #[cfg(not(feature = "compact"))]
        {
            let mut writer = writer;
            bincode::serialize_into(&mut writer, value)?;
            writer.flush()?;
        }
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Counterpart of [`write_bincode`].
pub fn read_bincode<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| {
        GeoError::NotFound(format!("Snapshot not found at {}: {}", path.display(), e))
    })?;
    let reader = BufReader::new(file);

    #[cfg(feature = "compact")]
    let value = bincode::deserialize_from(GzDecoder::new(reader))?;

    #[cfg(not(feature = "compact"))]
    let value = bincode::deserialize_from(reader)?;

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_path_appends_suffix() {
        let p = get_cache_path(Path::new("data/regions.json"), "bin");
        assert_eq!(p, PathBuf::from("data/regions.json.bin"));
    }

    #[test]
    fn plain_files_are_read_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.json");
        fs::write(&path, b"[]").unwrap();
        let mut out = String::new();
        open_stream(&path).unwrap().read_to_string(&mut out).unwrap();
        assert_eq!(out, "[]");
    }

    #[test]
    fn missing_cache_is_never_fresh() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!is_cache_fresh(&dir.path().join("nope.bin"), &[]));
    }

    #[test]
    fn bincode_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("value.bin");
        write_bincode(&path, &vec![1u32, 2, 3]).unwrap();
        let back: Vec<u32> = read_bincode(&path).unwrap();
        assert_eq!(back, vec![1, 2, 3]);
        assert!(!get_cache_path(&path, "tmp").exists());
    }
}
