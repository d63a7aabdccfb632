use entities::geo::{Bounds, Coordinates};
use entities::locations::{Category, Location, LocationId};
#[cfg(test)]
use mockall::automock;
use std::str::FromStr;
use thiserror::Error;

const TRANSIENT_COLOR: [u8; 3] = [0xf9, 0x73, 0x16];

/// Opaque id the widget hands out for a placed marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(pub u64);

#[derive(Clone, Debug, PartialEq)]
pub enum MarkerKind {
    Saved { id: LocationId, category: Category },
    /// A search result that is not a saved location yet.
    Transient,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MarkerSpec {
    pub coordinates: Coordinates,
    pub kind: MarkerKind,
    pub label: String,
}

impl MarkerSpec {
    pub fn for_location(location: &Location) -> Self {
        Self {
            coordinates: location.coordinates,
            kind: MarkerKind::Saved {
                id: location.id,
                category: location.category,
            },
            label: format!("{} {}", location.category.icon(), location.name),
        }
    }

    pub fn transient(coordinates: Coordinates, label: impl Into<String>) -> Self {
        Self {
            coordinates,
            kind: MarkerKind::Transient,
            label: label.into(),
        }
    }

    pub fn color(&self) -> [u8; 3] {
        match &self.kind {
            MarkerKind::Saved { category, .. } => category.color(),
            MarkerKind::Transient => TRANSIENT_COLOR,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
}

impl Viewport {
    pub fn centered_on(coordinates: Coordinates, zoom: f64) -> Self {
        Self {
            latitude: coordinates.latitude(),
            longitude: coordinates.longitude(),
            zoom,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("{0} is not a known map style")]
pub struct UnknownMapStyle(pub String);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MapStyle {
    #[default]
    Outdoors,
    Streets,
    Satellite,
    Light,
    Dark,
}

impl MapStyle {
    pub const ALL: [MapStyle; 5] = [
        MapStyle::Outdoors,
        MapStyle::Streets,
        MapStyle::Satellite,
        MapStyle::Light,
        MapStyle::Dark,
    ];

    /// The tile style identifier of the mapping service.
    pub fn id(&self) -> &'static str {
        match self {
            MapStyle::Outdoors => "outdoors-v12",
            MapStyle::Streets => "streets-v12",
            MapStyle::Satellite => "satellite-v9",
            MapStyle::Light => "light-v11",
            MapStyle::Dark => "dark-v11",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MapStyle::Outdoors => "outdoors",
            MapStyle::Streets => "streets",
            MapStyle::Satellite => "satellite",
            MapStyle::Light => "light",
            MapStyle::Dark => "dark",
        }
    }
}

impl FromStr for MapStyle {
    type Err = UnknownMapStyle;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        MapStyle::ALL
            .into_iter()
            .find(|style| style.name() == normalized)
            .ok_or_else(|| UnknownMapStyle(value.to_owned()))
    }
}

/// The interactive map. Implementations own the drawing surface; the map
/// surface only tells it what to show.
#[cfg_attr(test, automock)]
pub trait MapWidget: Send {
    fn add_marker(&mut self, marker: MarkerSpec) -> anyhow::Result<MarkerHandle>;

    fn remove_marker(&mut self, handle: MarkerHandle);

    fn fly_to(&mut self, viewport: Viewport) -> anyhow::Result<()>;

    fn fit_bounds(&mut self, bounds: Bounds) -> anyhow::Result<()>;

    /// Switching styles may drop every marker; callers re-add them.
    fn set_style(&mut self, style: MapStyle) -> anyhow::Result<()>;

    /// Encoded image of what is currently drawn.
    fn snapshot(&self) -> anyhow::Result<Vec<u8>>;
}
