/*!
 * Upload strategy selection by file size
 */

use std::fmt;

/// Files at or above this size go through multipart upload (1 GiB)
pub const MULTIPART_THRESHOLD: u64 = 1024 * 1024 * 1024;

/// Fixed part size for multipart uploads (1 GiB)
pub const MULTIPART_PART_SIZE: u64 = 1024 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStrategy {
    /// Whole file as one object body in a single request
    Direct,
    /// Fixed-size parts reassembled server-side
    Multipart,
}

impl UploadStrategy {
    pub fn classify(size_bytes: u64) -> Self {
        if size_bytes >= MULTIPART_THRESHOLD {
            UploadStrategy::Multipart
        } else {
            UploadStrategy::Direct
        }
    }
}

impl fmt::Display for UploadStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadStrategy::Direct => write!(f, "direct"),
            UploadStrategy::Multipart => write!(f, "multipart"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_boundary() {
        assert_eq!(UploadStrategy::classify(1_073_741_824), UploadStrategy::Multipart);
        assert_eq!(UploadStrategy::classify(1_073_741_823), UploadStrategy::Direct);
    }

    #[test]
    fn test_small_and_large() {
        assert_eq!(UploadStrategy::classify(0), UploadStrategy::Direct);
        assert_eq!(UploadStrategy::classify(4096), UploadStrategy::Direct);
        assert_eq!(
            UploadStrategy::classify(2 * MULTIPART_THRESHOLD),
            UploadStrategy::Multipart
        );
        assert_eq!(UploadStrategy::classify(u64::MAX), UploadStrategy::Multipart);
    }

    #[test]
    fn test_part_size_is_one_gib() {
        assert_eq!(MULTIPART_PART_SIZE, 1_073_741_824);
    }
}
