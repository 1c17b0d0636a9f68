/*!
 * Storage protocol implementations
 */

pub mod s3;
