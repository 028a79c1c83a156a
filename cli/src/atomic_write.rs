use std::io;
use std::io::Write as _;
use std::path::Path;

use tempfile::NamedTempFile;

/// Writes `contents` next to `path` and renames it into place, so readers never observe a
/// half-written config file. A trailing newline is added when missing.
pub fn write_atomic_text(path: &Path, contents: &str) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(contents.as_bytes())?;
    if !contents.ends_with('\n') {
        tmp.write_all(b"\n")?;
    }
    tmp.flush()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
