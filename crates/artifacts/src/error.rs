//! Artifact and audit-packet error catalog (spec §4.8).

use settld_types::{ErrorClass, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact {artifact_id} recomputed hash {recomputed} does not match stored hash {stored}")]
    HashMismatch {
        artifact_id: String,
        stored: String,
        recomputed: String,
    },

    #[error("artifact core must not carry its own artifactHash field")]
    CoreCarriesOwnHash,

    #[error("zip entry path '{0}' is absolute, which is rejected by safe-unzip")]
    UnsafeZipAbsolutePath(String),

    #[error("zip entry path '{0}' escapes the extraction root (zip-slip)")]
    UnsafeZipPathTraversal(String),

    #[error("zip entry path '{0}' uses a backslash, which is rejected by safe-unzip")]
    UnsafeZipBackslash(String),

    #[error("zip entry '{0}' is a symlink, which is rejected by safe-unzip")]
    UnsafeZipSymlink(String),

    #[error("zip entry '{0}' is duplicated")]
    UnsafeZipDuplicateEntry(String),

    #[error("zip archive has {actual} entries, exceeding the limit of {limit}")]
    UnsafeZipTooManyEntries { actual: usize, limit: usize },

    #[error("zip archive's total uncompressed size {actual} bytes exceeds the limit of {limit} bytes")]
    UnsafeZipTooManyBytes { actual: u64, limit: u64 },

    #[error("zip entry '{name}' has a compression ratio of {ratio:.1}, exceeding the limit of {limit:.1} (zip bomb)")]
    UnsafeZipCompressionRatio {
        name: String,
        ratio: f64,
        limit: f64,
    },

    #[error("zip read error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("codec error: {0}")]
    Codec(#[from] settld_codec::CodecError),
}

impl ErrorCode for ArtifactError {
    fn code(&self) -> &'static str {
        match self {
            ArtifactError::HashMismatch { .. } => "ARTIFACT_HASH_MISMATCH",
            ArtifactError::CoreCarriesOwnHash => "ARTIFACT_CORE_CARRIES_OWN_HASH",
            ArtifactError::UnsafeZipAbsolutePath(_) => "UNSAFE_ZIP_ABSOLUTE_PATH",
            ArtifactError::UnsafeZipPathTraversal(_) => "UNSAFE_ZIP_PATH_TRAVERSAL",
            ArtifactError::UnsafeZipBackslash(_) => "UNSAFE_ZIP_BACKSLASH",
            ArtifactError::UnsafeZipSymlink(_) => "UNSAFE_ZIP_SYMLINK",
            ArtifactError::UnsafeZipDuplicateEntry(_) => "UNSAFE_ZIP_DUPLICATE_ENTRY",
            ArtifactError::UnsafeZipTooManyEntries { .. } => "UNSAFE_ZIP_TOO_MANY_ENTRIES",
            ArtifactError::UnsafeZipTooManyBytes { .. } => "UNSAFE_ZIP_TOO_MANY_BYTES",
            ArtifactError::UnsafeZipCompressionRatio { .. } => "UNSAFE_ZIP_COMPRESSION_RATIO",
            ArtifactError::Zip(_) => "UNSAFE_ZIP_READ_ERROR",
            ArtifactError::Io(_) => "ARTIFACT_IO_ERROR",
            ArtifactError::Codec(e) => e.code(),
        }
    }

    fn class(&self) -> ErrorClass {
        match self {
            ArtifactError::HashMismatch { .. } => ErrorClass::Integrity,
            ArtifactError::CoreCarriesOwnHash => ErrorClass::Schema,
            ArtifactError::UnsafeZipAbsolutePath(_)
            | ArtifactError::UnsafeZipPathTraversal(_)
            | ArtifactError::UnsafeZipBackslash(_)
            | ArtifactError::UnsafeZipSymlink(_)
            | ArtifactError::UnsafeZipDuplicateEntry(_)
            | ArtifactError::UnsafeZipTooManyEntries { .. }
            | ArtifactError::UnsafeZipTooManyBytes { .. }
            | ArtifactError::UnsafeZipCompressionRatio { .. } => ErrorClass::Integrity,
            ArtifactError::Zip(_) | ArtifactError::Io(_) => ErrorClass::Upstream,
            ArtifactError::Codec(_) => ErrorClass::Integrity,
        }
    }
}
