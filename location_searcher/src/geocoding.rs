use crate::searcher::Searcher;
use async_trait::async_trait;
use entities::geo::Coordinates;
use serde::Deserialize;
use shared_kernel::http_client::HttpClient;
use use_cases::map_surface::{Geocoder, Place};

const FORWARD_LIMIT: usize = 1;
const REVERSE_LIMIT: usize = 1;

#[derive(Deserialize, Debug)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Deserialize, Debug)]
struct Feature {
    place_name: String,
    /// `[longitude, latitude]`
    center: [f64; 2],
}

impl From<FeatureCollection> for Vec<Place> {
    fn from(collection: FeatureCollection) -> Self {
        collection
            .features
            .into_iter()
            .filter_map(|feature| {
                let [longitude, latitude] = feature.center;
                match Coordinates::new(latitude, longitude) {
                    Ok(coordinates) => Some(Place {
                        name: feature.place_name,
                        coordinates,
                    }),
                    Err(err) => {
                        tracing::warn!(error = %err, place = %feature.place_name, "Skipping geocoding result");
                        None
                    }
                }
            })
            .collect()
    }
}

#[async_trait]
impl Geocoder for Searcher {
    #[tracing::instrument(err, skip(self), level = "info")]
    async fn forward(&self, query: String) -> anyhow::Result<Vec<Place>> {
        let url = self.places_url(query.trim(), FORWARD_LIMIT)?;
        let response = HttpClient::get_json::<FeatureCollection>(url).await?;
        Ok(response.into())
    }

    #[tracing::instrument(err, skip(self), level = "info")]
    async fn reverse(&self, coordinates: Coordinates) -> anyhow::Result<Vec<Place>> {
        let term = format!("{},{}", coordinates.longitude(), coordinates.latitude());
        let url = self.places_url(&term, REVERSE_LIMIT)?;
        let response = HttpClient::get_json::<FeatureCollection>(url).await?;
        Ok(response.into())
    }
}
