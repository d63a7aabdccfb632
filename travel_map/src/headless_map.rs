use entities::geo::Bounds;
use map_export::{ExportOptions, ExportPoint, ExportStyle};
use std::collections::BTreeMap;
use use_cases::map_surface::{
    MapStyle, MapWidget, MarkerHandle, MarkerKind, MarkerSpec, Viewport, DEFAULT_VIEWPORT,
};

/// A map widget without a screen. Markers live in memory and snapshots are
/// drawn with the exporter.
pub struct HeadlessMap {
    next_handle: u64,
    markers: BTreeMap<MarkerHandle, MarkerSpec>,
    viewport: Viewport,
    bounds: Option<Bounds>,
    style: MapStyle,
    options: ExportOptions,
}

impl HeadlessMap {
    pub fn new(options: ExportOptions) -> Self {
        Self {
            next_handle: 0,
            markers: BTreeMap::new(),
            viewport: DEFAULT_VIEWPORT,
            bounds: None,
            style: MapStyle::default(),
            options,
        }
    }

    pub fn markers(&self) -> impl Iterator<Item = &MarkerSpec> {
        self.markers.values()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// The area on screen: the fitted bounds, or else the extent of the
    /// viewport at its zoom.
    fn frame(&self) -> Bounds {
        if let Some(bounds) = self.bounds {
            return bounds;
        }
        let scale = 2f64.powf(self.viewport.zoom);
        let (half_height, half_width) = (90.0 / scale, 180.0 / scale);
        Bounds {
            north: (self.viewport.latitude + half_height).min(90.0),
            south: (self.viewport.latitude - half_height).max(-90.0),
            east: self.viewport.longitude + half_width,
            west: self.viewport.longitude - half_width,
        }
    }

    fn export_style(&self) -> ExportStyle {
        match self.style {
            MapStyle::Dark => ExportStyle::Dark,
            MapStyle::Satellite => ExportStyle::Satellite,
            MapStyle::Outdoors => ExportStyle::Outdoors,
            MapStyle::Streets | MapStyle::Light => ExportStyle::Light,
        }
    }
}

/// Saved marker labels lead with the category icon.
fn place_name(label: &str) -> &str {
    label.split_once(' ').map_or(label, |(_, name)| name)
}

impl MapWidget for HeadlessMap {
    fn add_marker(&mut self, marker: MarkerSpec) -> anyhow::Result<MarkerHandle> {
        self.next_handle += 1;
        let handle = MarkerHandle(self.next_handle);
        self.markers.insert(handle, marker);
        Ok(handle)
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        self.markers.remove(&handle);
    }

    fn fly_to(&mut self, viewport: Viewport) -> anyhow::Result<()> {
        self.viewport = viewport;
        self.bounds = None;
        Ok(())
    }

    fn fit_bounds(&mut self, bounds: Bounds) -> anyhow::Result<()> {
        let (latitude, longitude) = bounds.center();
        self.viewport = Viewport {
            latitude,
            longitude,
            ..self.viewport
        };
        self.bounds = Some(bounds);
        Ok(())
    }

    fn set_style(&mut self, style: MapStyle) -> anyhow::Result<()> {
        self.style = style;
        self.markers.clear();
        Ok(())
    }

    fn snapshot(&self) -> anyhow::Result<Vec<u8>> {
        let points: Vec<_> = self
            .markers
            .values()
            .filter_map(|marker| match marker.kind {
                MarkerKind::Saved { category, .. } => {
                    let name = place_name(&marker.label);
                    Some(ExportPoint {
                        coordinates: marker.coordinates,
                        category,
                        visited_date: None,
                        label: name.split(',').next().unwrap_or(name).trim().to_owned(),
                        country: name.rsplit(',').next().unwrap_or(name).trim().to_owned(),
                        photos: 0,
                    })
                }
                MarkerKind::Transient => None,
            })
            .collect();
        let options = ExportOptions {
            style: self.export_style(),
            ..self.options
        };
        let rendered = map_export::render_framed(&points, self.frame(), &options)?;
        Ok(rendered.bytes)
    }
}
