//! Content-derived listing identity.
//!
//! The listing page exposes no stable IDs, so a listing is identified by a
//! digest over the fields that describe the flat itself. Area, zone, link and
//! capture time are left out so that re-scrapes of the same posting keep
//! their identity.

use crate::models::{NewListing, field_or_placeholder};

const DELIMITER: &str = "-";

/// The string the identity digest is computed over.
pub fn identity_key(listing: &NewListing) -> String {
    [
        field_or_placeholder(&listing.address),
        field_or_placeholder(&listing.gross_rent),
        field_or_placeholder(&listing.rooms),
        field_or_placeholder(&listing.floor),
        field_or_placeholder(&listing.move_in_date),
    ]
    .join(DELIMITER)
}

/// 32 lowercase hex characters (MD5 of [`identity_key`]).
///
/// Digest collisions between different listings are not detected here; the
/// store's unique constraint is the only guard.
pub fn identity(listing: &NewListing) -> String {
    format!("{:x}", md5::compute(identity_key(listing).as_bytes()))
}
