//! Crate-level error types.

use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum FlycamError {
    Io(std::io::Error),
    /// TOML configuration parse or serialization failure.
    ConfigParse(String),
    /// Image file could not be opened or decoded.
    Texture { path: PathBuf, source: image::ImageError },
    /// Surface, adapter or device creation failure.
    Gpu(String),
}

impl fmt::Display for FlycamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::Texture { path, source } => {
                write!(f, "failed to load texture {}: {source}", path.display())
            }
            Self::Gpu(msg) => write!(f, "GPU error: {msg}"),
        }
    }
}

impl std::error::Error for FlycamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Texture { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FlycamError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for FlycamError {
    fn from(e: toml::de::Error) -> Self {
        Self::ConfigParse(e.to_string())
    }
}

impl From<wgpu::CreateSurfaceError> for FlycamError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        Self::Gpu(e.to_string())
    }
}

impl From<wgpu::RequestAdapterError> for FlycamError {
    fn from(e: wgpu::RequestAdapterError) -> Self {
        Self::Gpu(e.to_string())
    }
}

impl From<wgpu::RequestDeviceError> for FlycamError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        Self::Gpu(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn io_errors_keep_their_source() {
        let err = FlycamError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(err.to_string().contains("gone"));
        assert!(err.source().is_some());
    }

    #[test]
    fn toml_errors_become_config_parse() {
        let bad = toml::from_str::<toml::Value>("= nope").unwrap_err();
        let err = FlycamError::from(bad);
        assert!(matches!(err, FlycamError::ConfigParse(_)));
    }
}
