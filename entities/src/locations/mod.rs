mod category;

use crate::geo::Coordinates;
use chrono::NaiveDate;
use shared_kernel::{non_empty_string, string_key, uuid_key};

pub use category::{Category, UnknownCategory};

uuid_key!(LocationId);
uuid_key!(OwnerId);
string_key!(PhotoUrl);
non_empty_string!(LocationName);

impl LocationName {
    /// The part before the first comma, e.g. `Paris` for `Paris, France`.
    pub fn short_name(&self) -> &str {
        self.0.split(',').next().unwrap_or(&self.0).trim()
    }

    /// The last comma separated part, which for geocoded names is the country.
    pub fn country(&self) -> &str {
        self.0.rsplit(',').next().unwrap_or(&self.0).trim()
    }
}

/// A pinned travel memory as stored remotely.
#[derive(Clone, Debug, PartialEq)]
pub struct Location {
    pub id: LocationId,
    pub owner: OwnerId,
    pub name: LocationName,
    pub coordinates: Coordinates,
    pub category: Category,
    pub visited_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub album_link: Option<String>,
    pub photo_urls: Vec<PhotoUrl>,
}

/// Everything needed to insert a record. The id is assigned remotely.
#[derive(Clone, Debug, PartialEq)]
pub struct NewLocation {
    pub owner: OwnerId,
    pub name: LocationName,
    pub coordinates: Coordinates,
    pub category: Category,
    pub visited_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub album_link: Option<String>,
    pub photo_urls: Vec<PhotoUrl>,
}

/// The mutable fields of a record. Owner and coordinates never change after
/// creation.
#[derive(Clone, Debug, PartialEq)]
pub struct LocationChanges {
    pub name: LocationName,
    pub category: Category,
    pub visited_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub album_link: Option<String>,
    pub photo_urls: Vec<PhotoUrl>,
}

impl Location {
    pub fn from_new(id: LocationId, location: NewLocation) -> Self {
        Location {
            id,
            owner: location.owner,
            name: location.name,
            coordinates: location.coordinates,
            category: location.category,
            visited_date: location.visited_date,
            notes: location.notes,
            album_link: location.album_link,
            photo_urls: location.photo_urls,
        }
    }

    pub fn apply(&mut self, changes: LocationChanges) {
        self.name = changes.name;
        self.category = changes.category;
        self.visited_date = changes.visited_date;
        self.notes = changes.notes;
        self.album_link = changes.album_link;
        self.photo_urls = changes.photo_urls;
    }
}
