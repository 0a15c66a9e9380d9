//! Safe zip extraction (spec §4.8): "any zip read uses a **safe-unzip**
//! routine that rejects zip-slip paths, absolute paths, backslashes,
//! symlinks, duplicate entries, excess entry counts/bytes, and compression
//! ratios above threshold."

use std::collections::HashSet;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

use crate::error::ArtifactError;

const S_IFLNK: u32 = 0o120000;
const S_IFMT: u32 = 0o170000;

/// Limits enforced by [`safe_unzip`]. Defaults are conservative enough for
/// an audit packet (a handful of JSON documents plus a checksum manifest)
/// and deliberately hostile to zip-bomb-shaped archives.
#[derive(Clone, Copy, Debug)]
pub struct UnzipLimits {
    pub max_entries: usize,
    pub max_total_bytes: u64,
    pub max_compression_ratio: f64,
}

impl Default for UnzipLimits {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            max_total_bytes: 256 * 1024 * 1024,
            max_compression_ratio: 100.0,
        }
    }
}

/// An extracted entry's logical path (relative, validated) and bytes.
pub struct UnzippedEntry {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

fn validate_entry_name(name: &str) -> Result<PathBuf, ArtifactError> {
    if name.contains('\\') {
        return Err(ArtifactError::UnsafeZipBackslash(name.to_string()));
    }
    let path = Path::new(name);
    if path.is_absolute() {
        return Err(ArtifactError::UnsafeZipAbsolutePath(name.to_string()));
    }
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ArtifactError::UnsafeZipPathTraversal(name.to_string()));
            }
        }
    }
    Ok(path.to_path_buf())
}

fn is_symlink(entry: &zip::read::ZipFile) -> bool {
    entry
        .unix_mode()
        .map(|mode| mode & S_IFMT == S_IFLNK)
        .unwrap_or(false)
}

/// Reads `bytes` as a zip archive, validating every entry before any bytes
/// are returned to the caller. Rejects the first violation it finds rather
/// than collecting all of them, matching the fail-closed posture the rest
/// of the workspace takes on integrity checks.
pub fn safe_unzip(
    bytes: &[u8],
    limits: UnzipLimits,
) -> Result<Vec<UnzippedEntry>, ArtifactError> {
    let reader = std::io::Cursor::new(bytes);
    let mut archive = zip::ZipArchive::new(reader)?;

    if archive.len() > limits.max_entries {
        return Err(ArtifactError::UnsafeZipTooManyEntries {
            actual: archive.len(),
            limit: limits.max_entries,
        });
    }

    let mut seen_names: HashSet<String> = HashSet::new();
    let mut total_bytes: u64 = 0;
    let mut out = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let name = entry.name().to_string();

        if !seen_names.insert(name.clone()) {
            return Err(ArtifactError::UnsafeZipDuplicateEntry(name));
        }
        if is_symlink(&entry) {
            return Err(ArtifactError::UnsafeZipSymlink(name));
        }

        let relative = validate_entry_name(&name)?;
        if entry.is_dir() {
            continue;
        }

        let uncompressed = entry.size();
        total_bytes += uncompressed;
        if total_bytes > limits.max_total_bytes {
            return Err(ArtifactError::UnsafeZipTooManyBytes {
                actual: total_bytes,
                limit: limits.max_total_bytes,
            });
        }

        let compressed = entry.compressed_size().max(1);
        let ratio = uncompressed as f64 / compressed as f64;
        if ratio > limits.max_compression_ratio {
            return Err(ArtifactError::UnsafeZipCompressionRatio {
                name,
                ratio,
                limit: limits.max_compression_ratio,
            });
        }

        let mut data = Vec::with_capacity(uncompressed as usize);
        entry.read_to_end(&mut data)?;
        out.push(UnzippedEntry {
            path: relative,
            bytes: data,
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut writer = ZipWriter::new(std::io::Cursor::new(&mut buf));
            let options =
                FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
            for (name, data) in entries {
                writer.start_file(*name, options).unwrap();
                writer.write_all(data).unwrap();
            }
            writer.finish().unwrap();
        }
        buf
    }

    #[test]
    fn extracts_well_formed_archive() {
        let zip = build_zip(&[("a.json", b"{}"), ("nested/b.json", b"{\"x\":1}")]);
        let entries = safe_unzip(&zip, UnzipLimits::default()).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn rejects_path_traversal() {
        let zip = build_zip(&[("../escape.json", b"{}")]);
        let err = safe_unzip(&zip, UnzipLimits::default()).unwrap_err();
        assert!(matches!(err, ArtifactError::UnsafeZipPathTraversal(_)));
    }

    #[test]
    fn rejects_absolute_path() {
        let zip = build_zip(&[("/etc/passwd", b"{}")]);
        let err = safe_unzip(&zip, UnzipLimits::default()).unwrap_err();
        assert!(matches!(err, ArtifactError::UnsafeZipAbsolutePath(_)));
    }

    #[test]
    fn rejects_backslash_paths() {
        let zip = build_zip(&[("windows\\style.json", b"{}")]);
        let err = safe_unzip(&zip, UnzipLimits::default()).unwrap_err();
        assert!(matches!(err, ArtifactError::UnsafeZipBackslash(_)));
    }

    #[test]
    fn rejects_archive_over_entry_limit() {
        let zip = build_zip(&[("a.json", b"{}"), ("b.json", b"{}")]);
        let limits = UnzipLimits {
            max_entries: 1,
            ..UnzipLimits::default()
        };
        let err = safe_unzip(&zip, limits).unwrap_err();
        assert!(matches!(err, ArtifactError::UnsafeZipTooManyEntries { .. }));
    }

    #[test]
    fn rejects_archive_over_byte_limit() {
        let zip = build_zip(&[("a.json", &[0u8; 1024])]);
        let limits = UnzipLimits {
            max_total_bytes: 100,
            ..UnzipLimits::default()
        };
        let err = safe_unzip(&zip, limits).unwrap_err();
        assert!(matches!(err, ArtifactError::UnsafeZipTooManyBytes { .. }));
    }
}
