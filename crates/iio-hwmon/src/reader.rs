use crate::error::ReadError;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Where raw ADC samples come from.
pub trait RawSource: Send {
    /// Read the current raw code of the channel with the given index.
    fn read_raw(&self, index: usize) -> Result<i64, ReadError>;
}

pub const DEFAULT_RAW_BASE: &str = "/sys/bus/iio/devices/iio:device0/in_voltage";

/// Reads `<base><index>_raw` sysfs attributes.
#[derive(Debug, Clone)]
pub struct SysfsReader {
    base: String,
}

impl SysfsReader {
    /// `base` is a path prefix, not a directory: the index and `_raw` are appended as-is.
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    pub fn path_for(&self, index: usize) -> PathBuf {
        PathBuf::from(format!("{}{}_raw", self.base, index))
    }
}

impl Default for SysfsReader {
    fn default() -> Self {
        Self::new(DEFAULT_RAW_BASE)
    }
}

impl RawSource for SysfsReader {
    fn read_raw(&self, index: usize) -> Result<i64, ReadError> {
        let path = self.path_for(index);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(ReadError::Missing { path }),
            Err(source) => return Err(ReadError::Io { path, source }),
        };
        parse_raw(&path, &content)
    }
}

/// Parse the first whitespace-delimited token of an attribute as a signed integer.
pub fn parse_raw(path: &Path, content: &str) -> Result<i64, ReadError> {
    let token = content
        .split_whitespace()
        .next()
        .ok_or_else(|| ReadError::Empty {
            path: path.to_path_buf(),
        })?;
    token.parse::<i64>().map_err(|_| ReadError::Parse {
        path: path.to_path_buf(),
        token: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader_in(dir: &tempfile::TempDir) -> SysfsReader {
        SysfsReader::new(format!("{}/in_voltage", dir.path().display()))
    }

    #[test]
    fn test_path_layout() {
        let r = SysfsReader::default();
        assert_eq!(
            r.path_for(7),
            PathBuf::from("/sys/bus/iio/devices/iio:device0/in_voltage7_raw")
        );
    }

    #[test]
    fn test_reads_integer_token() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let r = reader_in(&dir);
        fs::write(r.path_for(0), "512\n")?;
        fs::write(r.path_for(1), "  42  trailing junk")?;
        fs::write(r.path_for(2), "-3")?;
        assert_eq!(r.read_raw(0)?, 512);
        assert_eq!(r.read_raw(1)?, 42);
        assert_eq!(r.read_raw(2)?, -3);
        Ok(())
    }

    #[test]
    fn test_missing_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let r = reader_in(&dir);
        assert!(matches!(r.read_raw(4), Err(ReadError::Missing { .. })));
        Ok(())
    }

    #[test]
    fn test_empty_and_garbage() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let r = reader_in(&dir);
        fs::write(r.path_for(0), " \n")?;
        fs::write(r.path_for(1), "abc")?;
        assert!(matches!(r.read_raw(0), Err(ReadError::Empty { .. })));
        match r.read_raw(1) {
            Err(ReadError::Parse { token, .. }) => assert_eq!(token, "abc"),
            other => panic!("expected parse error, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_directory_is_io_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let r = reader_in(&dir);
        fs::create_dir(r.path_for(0))?;
        assert!(matches!(r.read_raw(0), Err(ReadError::Io { .. })));
        Ok(())
    }
}
