mod widget;

use async_trait::async_trait;
use entities::geo::{Bounds, Coordinates};
use entities::locations::{Location, LocationId};
#[cfg(test)]
use mockall::automock;
use std::collections::HashMap;
use std::sync::Arc;

#[cfg(test)]
pub use widget::MockMapWidget;
pub use widget::{
    MapStyle, MapWidget, MarkerHandle, MarkerKind, MarkerSpec, UnknownMapStyle, Viewport,
};

pub const DEFAULT_VIEWPORT: Viewport = Viewport {
    latitude: 40.7128,
    longitude: -74.006,
    zoom: 2.0,
};
pub const SEARCH_ZOOM: f64 = 12.0;
pub const USER_ZOOM: f64 = 10.0;

const FIT_PADDING: f64 = 0.1;
const FIT_MIN_SPAN: f64 = 0.05;

/// A named point returned by the geocoder.
#[derive(Clone, Debug, PartialEq)]
pub struct Place {
    pub name: String,
    pub coordinates: Coordinates,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Places matching a free text query, best match first.
    async fn forward(&self, query: String) -> anyhow::Result<Vec<Place>>;

    /// Places at a point, most specific first.
    async fn reverse(&self, coordinates: Coordinates) -> anyhow::Result<Vec<Place>>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MapEvent {
    BackgroundClicked(Coordinates),
    MarkerClicked(MarkerHandle),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerTarget {
    Saved(LocationId),
    Transient,
}

/// What a new location form starts out with.
#[derive(Clone, Debug, PartialEq)]
pub struct FormPrefill {
    pub coordinates: Coordinates,
    pub name: Option<String>,
}

struct TransientMarker {
    handle: Option<MarkerHandle>,
    place: Place,
}

/// Keeps the widget's markers in step with the visible locations and turns
/// widget interactions into form or panel requests.
pub struct MapSurface {
    widget: Box<dyn MapWidget>,
    geocoder: Arc<dyn Geocoder>,
    markers: HashMap<MarkerHandle, LocationId>,
    rendered: Vec<Location>,
    transient: Option<TransientMarker>,
    style: MapStyle,
}

impl MapSurface {
    pub fn new(mut widget: Box<dyn MapWidget>, geocoder: Arc<dyn Geocoder>) -> Self {
        if let Err(err) = widget.fly_to(DEFAULT_VIEWPORT) {
            tracing::warn!(error = ?err, "Failed to set the initial viewport");
        }
        Self {
            widget,
            geocoder,
            markers: HashMap::new(),
            rendered: vec![],
            transient: None,
            style: MapStyle::default(),
        }
    }

    /// Replaces every saved-location marker with one per visible location.
    /// Returns how many markers were placed.
    pub fn render(&mut self, visible: &[Location]) -> usize {
        for (handle, _) in self.markers.drain() {
            self.widget.remove_marker(handle);
        }

        for location in visible {
            match self.widget.add_marker(MarkerSpec::for_location(location)) {
                Ok(handle) => {
                    self.markers.insert(handle, location.id);
                }
                Err(err) => {
                    tracing::warn!(error = ?err, location = %location.id, "Failed to place marker");
                }
            }
        }
        self.rendered = visible.to_vec();
        self.markers.len()
    }

    pub fn resolve(&self, handle: MarkerHandle) -> Option<MarkerTarget> {
        if let Some(id) = self.markers.get(&handle) {
            return Some(MarkerTarget::Saved(*id));
        }
        self.transient
            .as_ref()
            .and_then(|transient| transient.handle)
            .filter(|transient| *transient == handle)
            .map(|_| MarkerTarget::Transient)
    }

    /// A click on empty map. The place name is looked up on a best effort
    /// basis and left blank when the geocoder has nothing.
    pub async fn click_background(&mut self, coordinates: Coordinates) -> FormPrefill {
        self.clear_transient();

        let name = match self.geocoder.reverse(coordinates).await {
            Ok(places) => places.into_iter().next().map(|place| place.name),
            Err(err) => {
                tracing::warn!(error = ?err, "Reverse geocoding failed");
                None
            }
        };

        FormPrefill { coordinates, name }
    }

    /// Pins the best match for `query` with a transient marker and flies to it.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn search(&mut self, query: &str) -> Option<Place> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        let place = match self.geocoder.forward(query.to_owned()).await {
            Ok(places) => places.into_iter().next(),
            Err(err) => {
                tracing::warn!(error = ?err, "Search failed");
                None
            }
        }?;

        self.clear_transient();
        self.pin_transient(place.clone());
        self.fly(Viewport::centered_on(place.coordinates, SEARCH_ZOOM));
        Some(place)
    }

    /// Removes the search marker and hands its place to the form.
    pub fn click_transient(&mut self) -> Option<FormPrefill> {
        let transient = self.transient.take()?;
        if let Some(handle) = transient.handle {
            self.widget.remove_marker(handle);
        }
        Some(FormPrefill {
            coordinates: transient.place.coordinates,
            name: Some(transient.place.name),
        })
    }

    pub fn change_style(&mut self, style: MapStyle) {
        if let Err(err) = self.widget.set_style(style) {
            tracing::warn!(error = ?err, style = style.name(), "Failed to switch map style");
            return;
        }
        self.style = style;

        let rendered = std::mem::take(&mut self.rendered);
        self.render(&rendered);
        if let Some(transient) = self.transient.take() {
            if let Some(handle) = transient.handle {
                self.widget.remove_marker(handle);
            }
            self.pin_transient(transient.place);
        }
    }

    pub fn center_on(&mut self, coordinates: Coordinates) {
        self.fly(Viewport::centered_on(coordinates, USER_ZOOM));
    }

    /// Fits the viewport around the rendered locations. Returns false when
    /// there is nothing to fit.
    pub fn fit_to_markers(&mut self) -> bool {
        let Some(bounds) = Bounds::around(self.rendered.iter().map(|l| &l.coordinates)) else {
            return false;
        };
        let bounds = bounds.padded(FIT_PADDING).with_min_span(FIT_MIN_SPAN);
        match self.widget.fit_bounds(bounds) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = ?err, "Failed to fit the map to its markers");
                false
            }
        }
    }

    /// The owned widget, for exporting what is on screen.
    pub fn widget(&self) -> &dyn MapWidget {
        self.widget.as_ref()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn style(&self) -> MapStyle {
        self.style
    }

    pub fn transient(&self) -> Option<&Place> {
        self.transient.as_ref().map(|transient| &transient.place)
    }

    fn pin_transient(&mut self, place: Place) {
        let marker = MarkerSpec::transient(place.coordinates, place.name.clone());
        let handle = match self.widget.add_marker(marker) {
            Ok(handle) => Some(handle),
            Err(err) => {
                tracing::warn!(error = ?err, "Failed to place search marker");
                None
            }
        };
        self.transient = Some(TransientMarker { handle, place });
    }

    fn clear_transient(&mut self) {
        if let Some(handle) = self.transient.take().and_then(|transient| transient.handle) {
            self.widget.remove_marker(handle);
        }
    }

    fn fly(&mut self, viewport: Viewport) {
        if let Err(err) = self.widget.fly_to(viewport) {
            tracing::warn!(error = ?err, "Failed to move the map");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        FormPrefill, MapStyle, MapSurface, MarkerTarget, MockGeocoder, MockMapWidget, Place,
        SEARCH_ZOOM,
    };
    use crate::map_surface::MarkerHandle;
    use crate::test_support::{located, RecordingWidget};
    use anyhow::anyhow;
    use entities::geo::Coordinates;
    use entities::locations::{Category, OwnerId};
    use std::sync::Arc;

    fn paris() -> Place {
        Place {
            name: "Paris, Île-de-France, France".to_string(),
            coordinates: Coordinates::new(48.8566, 2.3522).unwrap(),
        }
    }

    fn surface(widget: RecordingWidget, geocoder: MockGeocoder) -> MapSurface {
        MapSurface::new(Box::new(widget), Arc::new(geocoder))
    }

    #[test]
    fn test_render_tears_down_previous_markers() {
        let owner = OwnerId::new();
        let widget = RecordingWidget::default();
        let mut surface = surface(widget.clone(), MockGeocoder::new());
        let first = vec![
            located(owner, "Rome, Italy", Category::Historical, None, 41.9, 12.5),
            located(owner, "Nice, France", Category::Beach, None, 43.7, 7.26),
        ];
        let second = vec![located(owner, "Oslo, Norway", Category::Urban, None, 59.9, 10.7)];

        assert_eq!(surface.render(&first), 2);
        assert_eq!(surface.render(&second), 1);

        assert_eq!(widget.marker_count(), 1);
        assert_eq!(widget.state.lock().unwrap().removed, 2);
        let handle = MarkerHandle(*widget.state.lock().unwrap().markers.keys().next().unwrap());
        assert_eq!(
            surface.resolve(handle),
            Some(MarkerTarget::Saved(second[0].id))
        );
    }

    #[test]
    fn test_markers_the_widget_rejects_are_skipped() {
        let owner = OwnerId::new();
        let mut widget = MockMapWidget::new();
        widget.expect_fly_to().returning(|_| Ok(()));
        let mut calls = 0;
        widget.expect_add_marker().returning(move |_| {
            calls += 1;
            if calls == 2 {
                Err(anyhow!("style not loaded"))
            } else {
                Ok(MarkerHandle(calls))
            }
        });
        let mut surface = MapSurface::new(Box::new(widget), Arc::new(MockGeocoder::new()));
        let visible = vec![
            located(owner, "A", Category::Food, None, 1.0, 1.0),
            located(owner, "B", Category::Food, None, 2.0, 2.0),
            located(owner, "C", Category::Food, None, 3.0, 3.0),
        ];

        assert_eq!(surface.render(&visible), 2);
    }

    #[tokio::test]
    async fn test_search_pins_a_single_transient_marker_and_flies_to_it() {
        let widget = RecordingWidget::default();
        let mut geocoder = MockGeocoder::new();
        geocoder
            .expect_forward()
            .times(2)
            .returning(|_| Ok(vec![paris()]));
        let mut surface = surface(widget.clone(), geocoder);

        surface.search("paris").await.unwrap();
        let found = surface.search("  paris ").await;

        assert_eq!(found, Some(paris()));
        assert_eq!(widget.marker_count(), 1);
        let viewport = widget.state.lock().unwrap().viewport.unwrap();
        assert_eq!(viewport.zoom, SEARCH_ZOOM);
        assert_eq!(viewport.latitude, 48.8566);
    }

    #[tokio::test]
    async fn test_blank_search_never_reaches_the_geocoder() {
        let mut geocoder = MockGeocoder::new();
        geocoder.expect_forward().never();
        let mut surface = surface(RecordingWidget::default(), geocoder);

        assert_eq!(surface.search("   ").await, None);
    }

    #[tokio::test]
    async fn test_clicking_the_transient_marker_prefills_the_form() {
        let widget = RecordingWidget::default();
        let mut geocoder = MockGeocoder::new();
        geocoder.expect_forward().returning(|_| Ok(vec![paris()]));
        let mut surface = surface(widget.clone(), geocoder);
        surface.search("paris").await;

        let handle = MarkerHandle(*widget.state.lock().unwrap().markers.keys().next().unwrap());
        assert_eq!(surface.resolve(handle), Some(MarkerTarget::Transient));

        let prefill = surface.click_transient().unwrap();
        assert_eq!(
            prefill,
            FormPrefill {
                coordinates: paris().coordinates,
                name: Some(paris().name),
            }
        );
        assert_eq!(widget.marker_count(), 0);
        assert!(surface.transient().is_none());
    }

    #[tokio::test]
    async fn test_background_click_degrades_when_reverse_geocoding_fails() {
        let widget = RecordingWidget::default();
        let mut geocoder = MockGeocoder::new();
        geocoder.expect_forward().returning(|_| Ok(vec![paris()]));
        geocoder
            .expect_reverse()
            .returning(|_| Err(anyhow!("rate limited")));
        let mut surface = surface(widget.clone(), geocoder);
        surface.search("paris").await;

        let clicked = Coordinates::new(10.0, 20.0).unwrap();
        let prefill = surface.click_background(clicked).await;

        assert_eq!(
            prefill,
            FormPrefill {
                coordinates: clicked,
                name: None
            }
        );
        assert_eq!(widget.marker_count(), 0);
    }

    #[tokio::test]
    async fn test_background_click_uses_the_first_reverse_result() {
        let mut geocoder = MockGeocoder::new();
        geocoder.expect_reverse().returning(|_| Ok(vec![paris()]));
        let mut surface = surface(RecordingWidget::default(), geocoder);

        let prefill = surface.click_background(paris().coordinates).await;
        assert_eq!(prefill.name, Some(paris().name));
    }

    #[test]
    fn test_style_change_re_adds_markers() {
        let owner = OwnerId::new();
        let widget = RecordingWidget::default();
        let mut surface = surface(widget.clone(), MockGeocoder::new());
        surface.render(&[located(owner, "Kyoto, Japan", Category::Historical, None, 35.0, 135.7)]);

        surface.change_style(MapStyle::Dark);

        assert_eq!(surface.style(), MapStyle::Dark);
        assert_eq!(widget.state.lock().unwrap().style, Some(MapStyle::Dark));
        assert_eq!(widget.marker_count(), 1);
        assert_eq!(surface.marker_count(), 1);
    }

    #[test]
    fn test_fit_to_markers_pads_the_rendered_bounds() {
        let owner = OwnerId::new();
        let widget = RecordingWidget::default();
        let mut surface = surface(widget.clone(), MockGeocoder::new());
        assert!(!surface.fit_to_markers());

        surface.render(&[
            located(owner, "A", Category::Food, None, 10.0, 10.0),
            located(owner, "B", Category::Food, None, 20.0, 30.0),
        ]);

        assert!(surface.fit_to_markers());
        let fitted = widget.state.lock().unwrap().fitted.unwrap();
        assert!((fitted.north - 21.0).abs() < 1e-9);
        assert!((fitted.west - 8.0).abs() < 1e-9);
    }
}
