//! Type definitions for S3 operations

/// S3 object summary as returned by a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Object {
    /// Object key (path within bucket)
    pub key: String,

    /// Object size in bytes
    pub size: u64,
}

impl S3Object {
    pub fn new(key: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            size,
        }
    }
}

/// First page of a listing
#[derive(Debug, Clone, Default)]
pub struct S3ListResult {
    /// Objects on this page
    pub objects: Vec<S3Object>,

    /// Whether more objects exist beyond this page
    pub is_truncated: bool,
}

impl S3ListResult {
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// A completed part of a multipart upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPartInfo {
    /// Part number (1-based)
    pub part_number: i32,

    /// ETag returned by S3 for this part
    pub etag: String,

    /// Part size in bytes
    pub size: u64,
}

impl UploadPartInfo {
    pub fn new(part_number: i32, etag: String, size: u64) -> Self {
        Self {
            part_number,
            etag,
            size,
        }
    }
}

/// Byte range of a single part within the source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartRange {
    /// Part number (1-based)
    pub part_number: i32,

    /// Offset of the first byte of the part
    pub offset: u64,

    /// Part length in bytes
    pub length: u64,
}
