use std::path::PathBuf;

use parley_protocol::FileRef;

/// Interpret pasted text as one or more files to attach.
///
/// Each non-empty line must normalize to a path of an existing regular file; otherwise the paste
/// is plain text and `None` is returned.
pub fn pasted_file_refs(pasted: &str) -> Option<Vec<FileRef>> {
    let lines: Vec<&str> = pasted
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if lines.is_empty() {
        return None;
    }

    lines
        .into_iter()
        .map(|line| {
            let path = normalize_pasted_path(line)?;
            match FileRef::from_path(&path) {
                Ok(file) => Some(file),
                Err(err) => {
                    tracing::trace!("paste is not an attachable file: {err}");
                    None
                }
            }
        })
        .collect()
}

/// Normalize pasted text that may represent a filesystem path.
///
/// Supports:
/// - `file://` URLs (converted to local paths)
/// - Windows/UNC paths
/// - shell-escaped single paths (via `shlex`)
pub fn normalize_pasted_path(pasted: &str) -> Option<PathBuf> {
    let pasted = pasted.trim();

    if let Ok(url) = url::Url::parse(pasted)
        && url.scheme() == "file"
    {
        return url.to_file_path().ok();
    }

    // POSIX shlex treats backslashes as escapes, so Windows paths bypass it.
    let looks_like_windows_path = {
        let drive = pasted
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
            && pasted.get(1..2) == Some(":")
            && pasted.get(2..3).is_some_and(|s| s == "\\" || s == "/");
        let unc = pasted.starts_with("\\\\");
        drive || unc
    };
    if looks_like_windows_path {
        #[cfg(target_os = "linux")]
        {
            if is_probably_wsl()
                && let Some(converted) = convert_windows_path_to_wsl(pasted)
            {
                return Some(converted);
            }
        }
        return Some(PathBuf::from(pasted));
    }

    let parts: Vec<String> = shlex::Shlex::new(pasted).collect();
    if parts.len() == 1 {
        return parts.into_iter().next().map(PathBuf::from);
    }

    None
}

#[cfg(target_os = "linux")]
pub fn is_probably_wsl() -> bool {
    if let Ok(version) = std::fs::read_to_string("/proc/version") {
        let version_lower = version.to_lowercase();
        if version_lower.contains("microsoft") || version_lower.contains("wsl") {
            return true;
        }
    }

    // Custom WSL kernels may not mention it in /proc/version.
    std::env::var_os("WSL_DISTRO_NAME").is_some() || std::env::var_os("WSL_INTEROP").is_some()
}

#[cfg(target_os = "linux")]
fn convert_windows_path_to_wsl(input: &str) -> Option<PathBuf> {
    if input.starts_with("\\\\") {
        return None;
    }

    let drive_letter = input.chars().next()?.to_ascii_lowercase();
    if !drive_letter.is_ascii_lowercase() || input.get(1..2) != Some(":") {
        return None;
    }

    let mut result = PathBuf::from(format!("/mnt/{drive_letter}"));
    for component in input
        .get(2..)?
        .trim_start_matches(['\\', '/'])
        .split(['\\', '/'])
        .filter(|component| !component.is_empty())
    {
        result.push(component);
    }

    Some(result)
}
