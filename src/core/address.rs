/*!
 * Bucket addressing with virtual sub-buckets
 *
 * An operator-facing bucket address is either `name` or `name/prefix...`.
 * Only the first `/` is significant: everything before it is the physical
 * bucket, everything after it is an opaque prefix used both to scope the
 * connectivity listing and to namespace object keys.
 */

use std::fmt;
use std::str::FromStr;

use crate::error::{BackupError, Result};

const SEPARATOR: char = '/';

/// A parsed bucket address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketAddress {
    raw: String,
    physical: String,
    prefix: Option<String>,
}

/// Where a single file lands: physical bucket plus full object key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub physical_bucket: String,
    pub object_key: String,
}

impl BucketAddress {
    /// Parse an operator-supplied address
    ///
    /// Rejects an empty address and an address whose physical segment is
    /// empty (`/prefix`). A trailing separator (`demo/`) is kept as an
    /// empty prefix.
    pub fn parse(address: &str) -> Result<Self> {
        if address.is_empty() {
            return Err(BackupError::Config(
                "Bucket address cannot be empty".to_string(),
            ));
        }

        let (physical, prefix) = match address.split_once(SEPARATOR) {
            Some((physical, rest)) => (physical, Some(rest.to_string())),
            None => (address, None),
        };

        if physical.is_empty() {
            return Err(BackupError::Config(format!(
                "Bucket address {} has no bucket name before '{}'",
                address, SEPARATOR
            )));
        }

        Ok(Self {
            raw: address.to_string(),
            physical: physical.to_string(),
            prefix,
        })
    }

    /// The real top-level bucket
    pub fn physical(&self) -> &str {
        &self.physical
    }

    /// Everything after the first separator, if there was one
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn is_virtual(&self) -> bool {
        self.prefix.is_some()
    }

    /// The address exactly as the operator wrote it
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Compute the upload target for `file_name`
    ///
    /// `demo/test/test2` + `a.dump` resolves to bucket `demo`, key
    /// `test/test2/a.dump`; `demo` + `a.dump` resolves to key `a.dump`.
    pub fn resolve(&self, file_name: &str) -> UploadTarget {
        let object_key = match &self.prefix {
            Some(prefix) => format!("{}{}{}", prefix, SEPARATOR, file_name),
            None => file_name.to_string(),
        };

        UploadTarget {
            physical_bucket: self.physical.clone(),
            object_key,
        }
    }
}

impl FromStr for BucketAddress {
    type Err = BackupError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for BucketAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
