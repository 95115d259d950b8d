use crate::AssetError;
use std::path::Path;

/// Read a shader source file into a string.
///
/// Whitespace-only files are rejected with [`AssetError::EmptyShader`].
pub fn load_shader_source(path: impl AsRef<Path>) -> Result<String, AssetError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if source.trim().is_empty() {
        return Err(AssetError::EmptyShader(path.to_path_buf()));
    }
    tracing::debug!("read shader {} ({} bytes)", path.display(), source.len());
    Ok(source)
}
