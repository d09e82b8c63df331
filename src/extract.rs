//! Mapping member names onto the filesystem without escaping the
//! destination directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Returns the path below `dest_dir` that a member called `name` extracts
/// to.
///
/// Cabinet names use `\` as a separator; both `\` and `/` split segments.
/// Empty and `.` segments are dropped.  Names with `..` segments, absolute
/// names, and names carrying a drive or stream prefix (`C:`) are rejected
/// with [`Error::UnsafePath`].
pub fn destination_path(dest_dir: &Path, name: &str) -> Result<PathBuf> {
    let unsafe_path = || Error::UnsafePath(name.to_string());
    if name.contains('\0') {
        return Err(unsafe_path());
    }
    if name.starts_with('/') || name.starts_with('\\') {
        return Err(unsafe_path());
    }
    let mut path = dest_dir.to_path_buf();
    let mut num_segments = 0;
    for segment in name.split(['/', '\\']) {
        match segment {
            "" | "." => continue,
            ".." => return Err(unsafe_path()),
            _ if segment.contains(':') => return Err(unsafe_path()),
            _ => {
                path.push(segment);
                num_segments += 1;
            }
        }
    }
    if num_segments == 0 || !path.starts_with(dest_dir) {
        return Err(unsafe_path());
    }
    Ok(path)
}

/// Writes `data` to the destination of member `name`, creating parent
/// directories as needed.  The parent directory is re-checked after
/// creation so that a symlink planted inside `dest_dir` cannot redirect the
/// write elsewhere.
pub(crate) fn write_member(
    dest_dir: &Path,
    name: &str,
    data: &[u8],
) -> Result<PathBuf> {
    let path = destination_path(dest_dir, name)?;
    let parent = path.parent().unwrap_or(dest_dir);
    fs::create_dir_all(parent)?;
    let canonical_dest = dest_dir.canonicalize()?;
    let canonical_parent = parent.canonicalize()?;
    if !canonical_parent.starts_with(&canonical_dest) {
        return Err(Error::UnsafePath(name.to_string()));
    }
    fs::write(&path, data)?;
    log::debug!("Extracted {:?} to {}", name, path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::destination_path;
    use crate::error::Error;

    #[test]
    fn nested_names_map_below_destination() {
        let dest = Path::new("out");
        assert_eq!(
            destination_path(dest, "dir\\sub/file.txt").unwrap(),
            Path::new("out").join("dir").join("sub").join("file.txt")
        );
        assert_eq!(
            destination_path(dest, "./a//b.txt").unwrap(),
            Path::new("out").join("a").join("b.txt")
        );
    }

    #[test]
    fn traversal_is_rejected() {
        let dest = Path::new("out");
        for name in [
            "../escape.txt",
            "a/../../escape.txt",
            "a\\..\\b",
            "/etc/passwd",
            "\\windows\\system.ini",
            "C:\\boot.ini",
            "file.txt:stream",
            "",
            "./",
            "nul\0byte",
        ] {
            assert!(
                matches!(destination_path(dest, name), Err(Error::UnsafePath(_))),
                "{:?} should be rejected",
                name
            );
        }
    }
}
