/*!
 * Bucket connectivity check
 *
 * Runs once before any upload. A plain bucket is reachable when its
 * listing succeeds, even if empty. A virtual sub-bucket additionally needs
 * at least one object under its prefix; an empty listing there means the
 * sub-bucket does not exist. A freshly created, still empty sub-bucket is
 * therefore reported as inaccessible.
 */

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::address::BucketAddress;
use crate::error::{BackupError, Result};
use crate::protocol::s3::S3Operations;

/// Check that `address` can be reached through `store`
///
/// No retries are attempted here.
pub async fn check_access<S>(
    store: &S,
    address: &BucketAddress,
    cancel: &CancellationToken,
) -> Result<()>
where
    S: S3Operations + ?Sized,
{
    debug!(
        bucket = address.physical(),
        prefix = address.prefix().unwrap_or(""),
        "Checking bucket access"
    );

    let listing = store
        .list_objects(address.physical(), address.prefix(), cancel)
        .await
        .map_err(|e| BackupError::connectivity(address.as_str(), e))?;

    if address.is_virtual() && listing.is_empty() {
        return Err(BackupError::Connectivity {
            bucket: address.to_string(),
            reason: format!(
                "s3 Bucket {} does not exist: no objects under prefix",
                address
            ),
        });
    }

    debug!(
        objects = listing.objects.len(),
        more = listing.is_truncated,
        "Bucket listing page received"
    );
    info!(bucket = %address, "Connectivity with S3 bucket established");
    Ok(())
}
