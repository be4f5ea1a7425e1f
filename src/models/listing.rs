use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::identity;

/// Rendered in place of any listing field the page did not provide.
pub const MISSING_FIELD: &str = "Keine Angabe";
/// Rendered in place of a missing application link.
pub const MISSING_LINK: &str = "No link";

/// A row as scraped from the listing page, before it has an identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewListing {
    pub address: Option<String>,
    pub gross_rent: Option<String>,
    pub rooms: Option<String>,
    pub floor: Option<String>,
    pub area: Option<String>,
    pub move_in_date: Option<String>,
    pub zone: Option<String>,
    pub application_link: Option<String>,
    pub observed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    pub address: Option<String>,
    pub gross_rent: Option<String>,
    pub rooms: Option<String>,
    pub floor: Option<String>,
    pub area: Option<String>,
    pub move_in_date: Option<String>,
    pub zone: Option<String>,
    pub application_link: Option<String>,
    pub observed_at: DateTime<Utc>,
    pub identity_hash: String,
}

impl Listing {
    pub fn new(new_listing: NewListing) -> Self {
        let identity_hash = identity::identity(&new_listing);
        Self {
            address: new_listing.address,
            gross_rent: new_listing.gross_rent,
            rooms: new_listing.rooms,
            floor: new_listing.floor,
            area: new_listing.area,
            move_in_date: new_listing.move_in_date,
            zone: new_listing.zone,
            application_link: new_listing.application_link,
            observed_at: new_listing.observed_at,
            identity_hash,
        }
    }

    /// Capture date as shown in notifications, e.g. `05.03.2025`.
    pub fn observed_date(&self) -> String {
        self.observed_at.with_timezone(&Local).format("%d.%m.%Y").to_string()
    }

    pub fn link_or_placeholder(&self) -> &str {
        self.application_link.as_deref().unwrap_or(MISSING_LINK)
    }
}

/// Renders an optional field the way it is stored and displayed.
pub fn field_or_placeholder(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(MISSING_FIELD)
}

fn from_placeholder(value: String, placeholder: &str) -> Option<String> {
    if value == placeholder {
        None
    } else {
        Some(value)
    }
}

/// Row shape of the `apartments` table.
#[derive(Debug, Clone, FromRow)]
pub struct ListingRecord {
    pub id: i64,
    pub address: String,
    pub rentalgross: String,
    pub rooms: String,
    pub floor: String,
    pub area: String,
    pub move_in_date: String,
    pub zone: String,
    pub link: String,
    pub timestamp: DateTime<Utc>,
    pub unique_hash: String,
}

impl From<ListingRecord> for Listing {
    fn from(record: ListingRecord) -> Self {
        Self {
            address: from_placeholder(record.address, MISSING_FIELD),
            gross_rent: from_placeholder(record.rentalgross, MISSING_FIELD),
            rooms: from_placeholder(record.rooms, MISSING_FIELD),
            floor: from_placeholder(record.floor, MISSING_FIELD),
            area: from_placeholder(record.area, MISSING_FIELD),
            move_in_date: from_placeholder(record.move_in_date, MISSING_FIELD),
            zone: from_placeholder(record.zone, MISSING_FIELD),
            application_link: from_placeholder(record.link, MISSING_LINK),
            observed_at: record.timestamp,
            identity_hash: record.unique_hash,
        }
    }
}
