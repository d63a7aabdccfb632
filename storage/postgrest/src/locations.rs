use crate::repository::Repository;
use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use entities::geo::Coordinates;
use entities::locations::{
    Category, Location, LocationChanges, LocationId, LocationName, NewLocation, OwnerId, PhotoUrl,
};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;
use shared_kernel::http_client::HttpClient;
use url::Url;
use use_cases::location_store::LocationRepo;
use uuid::Uuid;

const LOCATIONS: [&str; 3] = ["rest", "v1", "locations"];

#[derive(Debug, Deserialize)]
struct LocationRow {
    id: Uuid,
    user_id: Uuid,
    city_name: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    latitude: f64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    longitude: f64,
    category: Option<String>,
    visited_date: Option<NaiveDate>,
    notes: Option<String>,
    album_link: Option<String>,
    photo_urls: Option<Vec<String>>,
}

impl TryFrom<LocationRow> for Location {
    type Error = anyhow::Error;

    fn try_from(row: LocationRow) -> Result<Self, Self::Error> {
        let name = LocationName::try_from(row.city_name)
            .map_err(|err| anyhow::anyhow!("location {} has no name: {err}", row.id))?;
        let coordinates = Coordinates::new(row.latitude, row.longitude)
            .with_context(|| format!("location {} has invalid coordinates", row.id))?;

        Ok(Location {
            id: row.id.into(),
            owner: row.user_id.into(),
            name,
            coordinates,
            category: Category::from_stored(row.category.as_deref()),
            visited_date: row.visited_date,
            notes: row.notes,
            album_link: row.album_link,
            photo_urls: row
                .photo_urls
                .unwrap_or_default()
                .into_iter()
                .map(PhotoUrl::from)
                .collect(),
        })
    }
}

/// Columns sent on insert and update. Empty lists go out as `null`.
#[derive(Debug, Serialize)]
struct LocationColumns<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<Uuid>,
    city_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    longitude: Option<f64>,
    category: &'static str,
    visited_date: Option<NaiveDate>,
    notes: Option<&'a str>,
    album_link: Option<&'a str>,
    photo_urls: Option<Vec<&'a str>>,
}

fn photo_column(photo_urls: &[PhotoUrl]) -> Option<Vec<&str>> {
    (!photo_urls.is_empty()).then(|| photo_urls.iter().map(AsRef::as_ref).collect())
}

impl<'a> From<&'a NewLocation> for LocationColumns<'a> {
    fn from(location: &'a NewLocation) -> Self {
        LocationColumns {
            user_id: Some(location.owner.inner()),
            city_name: location.name.as_ref(),
            latitude: Some(location.coordinates.latitude()),
            longitude: Some(location.coordinates.longitude()),
            category: location.category.id(),
            visited_date: location.visited_date,
            notes: location.notes.as_deref(),
            album_link: location.album_link.as_deref(),
            photo_urls: photo_column(&location.photo_urls),
        }
    }
}

impl<'a> From<&'a LocationChanges> for LocationColumns<'a> {
    fn from(changes: &'a LocationChanges) -> Self {
        LocationColumns {
            user_id: None,
            city_name: changes.name.as_ref(),
            latitude: None,
            longitude: None,
            category: changes.category.id(),
            visited_date: changes.visited_date,
            notes: changes.notes.as_deref(),
            album_link: changes.album_link.as_deref(),
            photo_urls: photo_column(&changes.photo_urls),
        }
    }
}

impl Repository {
    fn locations_url(&self, params: &[(&str, String)]) -> anyhow::Result<Url> {
        let mut url = self.endpoint(LOCATIONS)?;
        url.query_pairs_mut()
            .extend_pairs(params.iter().map(|(key, value)| (*key, value.as_str())));
        Ok(url)
    }

    fn by_id(&self, id: LocationId) -> anyhow::Result<Url> {
        self.locations_url(&[("id", format!("eq.{id}"))])
    }
}

#[async_trait]
impl LocationRepo for Repository {
    #[tracing::instrument(err, skip(self), level = "info")]
    async fn list_for_owner(&self, owner: OwnerId) -> anyhow::Result<Vec<Location>> {
        let url = self.locations_url(&[
            ("select", "*".to_string()),
            ("user_id", format!("eq.{owner}")),
            ("order", "visited_date.desc.nullslast".to_string()),
        ])?;

        let rows = HttpClient::get_with_headers::<Vec<LocationRow>>(url, self.headers())
            .await
            .context("Failed to fetch locations")?;

        rows.into_iter().map(Location::try_from).collect()
    }

    #[tracing::instrument(err, skip(self), level = "info")]
    async fn insert(&self, location: NewLocation) -> anyhow::Result<Location> {
        let url = self.locations_url(&[])?;
        let body = serde_json::to_value(LocationColumns::from(&location))
            .context("Failed to serialize location")?;
        let mut headers = self.headers();
        headers.insert("Prefer", "return=representation".to_string());

        // the backend's message is shown to the user as is
        let rows = HttpClient::post_json::<Vec<LocationRow>>(url, headers, body)
            .await
            .map_err(anyhow::Error::from)?;

        rows.into_iter()
            .next()
            .context("The backend did not return the inserted location")
            .and_then(Location::try_from)
    }

    #[tracing::instrument(err, skip(self), level = "info")]
    async fn update(&self, id: LocationId, changes: LocationChanges) -> anyhow::Result<()> {
        let body = serde_json::to_value(LocationColumns::from(&changes))
            .context("Failed to serialize location")?;

        HttpClient::patch_json(self.by_id(id)?, self.headers(), body)
            .await
            .map_err(anyhow::Error::from)
    }

    #[tracing::instrument(err, skip(self), level = "info")]
    async fn delete(&self, id: LocationId) -> anyhow::Result<()> {
        HttpClient::delete(self.by_id(id)?, self.headers())
            .await
            .map_err(anyhow::Error::from)
    }
}
