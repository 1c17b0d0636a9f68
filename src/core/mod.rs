/*!
 * Upload core: addressing, strategy selection, connectivity and dispatch
 */

pub mod address;
pub mod connectivity;
pub mod dispatch;
pub mod strategy;

pub use address::{BucketAddress, UploadTarget};
pub use connectivity::check_access;
pub use dispatch::{UploadDispatcher, UploadReport, UploadedObject};
pub use strategy::{UploadStrategy, MULTIPART_PART_SIZE, MULTIPART_THRESHOLD};
