use crate::canvas::{text_height, text_width, Canvas, Color};
use crate::options::{ExportFormat, ExportOptions, ExportStyle, ExportTheme};
use chrono::NaiveDate;
use entities::geo::{Bounds, Coordinates};
use entities::locations::{Category, Location};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, ImageError};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

const MARGIN: f64 = 40.0;
const GRID_SPACING: f64 = 50.0;
const STATS_HEIGHT: f64 = 120.0;
const BOUNDS_PADDING: f64 = 0.1;
const MIN_SPAN: f64 = 1.0;
const MARKER_RADIUS: f64 = 16.0;
const MARKER_BORDER: f64 = 3.0;
const SHADOW_OFFSET: f64 = 2.0;
const JOURNEY_WIDTH: f64 = 2.0;
const JOURNEY_DASH: f64 = 5.0;
const TITLE: &str = "My Travel Memories";
const TITLE_CELL: f64 = 4.0;
const TITLE_CENTRE_Y: f64 = 60.0;
const LABEL_CELL: f64 = 2.0;
const LABEL_OFFSET: f64 = 35.0;
const STATS_CELL: f64 = 2.0;
const WATERMARK: &str = "Created with Map My Memories";
const WATERMARK_CELL: f64 = 1.5;
const WATERMARK_INSET: f64 = 20.0;
const WHITE: Color = [0xff, 0xff, 0xff];
const BLACK: Color = [0x00, 0x00, 0x00];

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("No locations to export")]
    NoLocations,
    #[error("Failed to encode the map image: {0}")]
    Encode(#[from] ImageError),
}

/// What the exporter needs to know about a location.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportPoint {
    pub coordinates: Coordinates,
    pub category: Category,
    pub visited_date: Option<NaiveDate>,
    /// Drawn under the marker.
    pub label: String,
    pub country: String,
    pub photos: usize,
}

impl From<&Location> for ExportPoint {
    fn from(location: &Location) -> Self {
        ExportPoint {
            coordinates: location.coordinates,
            category: location.category,
            visited_date: location.visited_date,
            label: location.name.short_name().to_owned(),
            country: location.name.country().to_owned(),
            photos: location.photo_urls.len(),
        }
    }
}

#[derive(Debug)]
pub struct RenderedMap {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: ExportFormat,
}

struct Palette {
    background: Color,
    map: Color,
    grid: Color,
    journey: Color,
    panel: Color,
    border: Color,
    text: Color,
}

impl Palette {
    fn for_options(options: &ExportOptions) -> Palette {
        if options.theme == ExportTheme::Vintage {
            return Palette {
                background: [0xf4, 0xec, 0xd8],
                map: [0xfb, 0xf5, 0xe6],
                grid: [0xe0, 0xd2, 0xb4],
                journey: [0x8b, 0x6b, 0x4a],
                panel: [0xfb, 0xf5, 0xe6],
                border: [0xc8, 0xb4, 0x8c],
                text: [0x4a, 0x37, 0x28],
            };
        }
        match options.style {
            ExportStyle::Dark => Palette {
                background: [0x0f, 0x17, 0x2a],
                map: [0x1e, 0x29, 0x3b],
                grid: [0x33, 0x41, 0x55],
                journey: [0x47, 0x55, 0x69],
                panel: [0x1e, 0x29, 0x3b],
                border: [0x47, 0x55, 0x69],
                text: [0xf1, 0xf5, 0xf9],
            },
            ExportStyle::Satellite => Palette {
                background: [0xf8, 0xfa, 0xfc],
                map: [0x2d, 0x3a, 0x2e],
                grid: [0x3f, 0x4f, 0x40],
                journey: [0xcb, 0xd5, 0xe1],
                panel: WHITE,
                border: [0xe2, 0xe8, 0xf0],
                text: [0x1e, 0x29, 0x3b],
            },
            ExportStyle::Outdoors => Palette {
                background: [0xf8, 0xfa, 0xfc],
                map: [0xee, 0xf5, 0xe6],
                grid: [0xd4, 0xe4, 0xc8],
                journey: [0xcb, 0xd5, 0xe1],
                panel: WHITE,
                border: [0xe2, 0xe8, 0xf0],
                text: [0x1e, 0x29, 0x3b],
            },
            ExportStyle::Light => Palette {
                background: [0xf8, 0xfa, 0xfc],
                map: WHITE,
                grid: [0xe2, 0xe8, 0xf0],
                journey: [0xcb, 0xd5, 0xe1],
                panel: WHITE,
                border: [0xe2, 0xe8, 0xf0],
                text: [0x1e, 0x29, 0x3b],
            },
        }
    }
}

/// Projects coordinates linearly into the map area.
struct Projection {
    bounds: Bounds,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl Projection {
    fn project(&self, coordinates: &Coordinates) -> (f64, f64) {
        let x = self.x
            + (coordinates.longitude() - self.bounds.west) / self.bounds.longitude_span()
                * self.width;
        let y = self.y
            + (self.bounds.north - coordinates.latitude()) / self.bounds.latitude_span()
                * self.height;
        (x, y)
    }
}

fn draw_grid(canvas: &mut Canvas, projection: &Projection, color: Color) {
    let right = projection.x + projection.width;
    let bottom = projection.y + projection.height;
    let mut x = projection.x;
    while x <= right {
        canvas.fill_rect(x, projection.y, 1.0, projection.height, color, 1.0);
        x += GRID_SPACING;
    }
    let mut y = projection.y;
    while y <= bottom {
        canvas.fill_rect(projection.x, y, projection.width, 1.0, color, 1.0);
        y += GRID_SPACING;
    }
}

/// Connects dated points oldest first. Undated points are left out.
fn draw_journey(canvas: &mut Canvas, projection: &Projection, points: &[ExportPoint], color: Color) {
    let mut dated: Vec<_> = points
        .iter()
        .filter_map(|point| point.visited_date.map(|date| (date, point.coordinates)))
        .collect();
    dated.sort_by_key(|(date, _)| *date);

    for pair in dated.windows(2) {
        let from = projection.project(&pair[0].1);
        let to = projection.project(&pair[1].1);
        canvas.dashed_line(from, to, JOURNEY_WIDTH, JOURNEY_DASH, color);
    }
}

fn draw_marker(canvas: &mut Canvas, (x, y): (f64, f64), color: Color) {
    canvas.fill_circle(x + SHADOW_OFFSET, y + SHADOW_OFFSET, MARKER_RADIUS, BLACK, 0.2);
    canvas.fill_circle(x, y, MARKER_RADIUS, color, 1.0);
    canvas.fill_ring(
        x,
        y,
        MARKER_RADIUS - MARKER_BORDER / 2.0,
        MARKER_RADIUS + MARKER_BORDER / 2.0,
        WHITE,
        1.0,
    );
}

fn centred_text(canvas: &mut Canvas, (x, y): (f64, f64), text: &str, cell: f64, color: Color) {
    canvas.text(
        x - text_width(text, cell) / 2.0,
        y - text_height(cell) / 2.0,
        text,
        cell,
        color,
        1.0,
    );
}

/// A panel along the bottom with the totals above a bar split by category
/// share.
fn draw_stats(canvas: &mut Canvas, points: &[ExportPoint], width: f64, height: f64, palette: &Palette) {
    let (x, y) = (MARGIN, height - STATS_HEIGHT);
    let (panel_width, panel_height) = (width - MARGIN * 2.0, 80.0);
    canvas.fill_rect(x, y, panel_width, panel_height, palette.panel, 0.9);
    canvas.stroke_rect(x, y, panel_width, panel_height, palette.border);

    let countries = points
        .iter()
        .map(|point| point.country.as_str())
        .collect::<BTreeSet<_>>()
        .len();
    let photos: usize = points.iter().map(|point| point.photos).sum();
    let totals = [
        format!("{} locations", points.len()),
        format!("{countries} countries"),
        format!("{photos} photos"),
    ];
    let column = (panel_width - MARGIN) / totals.len() as f64;
    for (index, total) in totals.iter().enumerate() {
        let left = x + 20.0 + index as f64 * column;
        canvas.text(left, y + 16.0, total, STATS_CELL, palette.text, 1.0);
    }

    let counts = points.iter().fold(BTreeMap::new(), |mut counts, point| {
        *counts.entry(point.category).or_insert(0usize) += 1;
        counts
    });
    let total = points.len() as f64;
    let (bar_x, bar_y) = (x + 20.0, y + 46.0);
    let bar_width = panel_width - 40.0;
    let mut offset = 0.0;
    for (category, count) in counts {
        let share = bar_width * count as f64 / total;
        canvas.fill_rect(bar_x + offset, bar_y, share, 14.0, category.color(), 1.0);
        offset += share;
    }
}

fn encode(canvas: Canvas, options: &ExportOptions) -> Result<RenderedMap, ExportError> {
    let image = canvas.into_image();
    let (width, height) = image.dimensions();
    let mut bytes = Vec::new();
    match options.format {
        ExportFormat::Png => {
            PngEncoder::new(&mut bytes).write_image(image.as_raw(), width, height, ColorType::Rgb8)?
        }
        ExportFormat::Jpeg => {
            JpegEncoder::new_with_quality(&mut bytes, options.quality.jpeg_quality()).write_image(
                image.as_raw(),
                width,
                height,
                ColorType::Rgb8,
            )?
        }
    }
    Ok(RenderedMap {
        bytes,
        width,
        height,
        format: options.format,
    })
}

/// Renders every point, framed by their padded bounding box.
pub fn render(points: &[ExportPoint], options: &ExportOptions) -> Result<RenderedMap, ExportError> {
    let frame = Bounds::around(points.iter().map(|point| &point.coordinates))
        .ok_or(ExportError::NoLocations)?
        .padded(BOUNDS_PADDING)
        .with_min_span(MIN_SPAN);
    render_framed(points, frame, options)
}

/// Renders inside a fixed frame. Markers, labels and the journey line only
/// cover points within it while the stats count every point.
#[tracing::instrument(err, skip(points), fields(points = points.len()), level = "info")]
pub fn render_framed(
    points: &[ExportPoint],
    frame: Bounds,
    options: &ExportOptions,
) -> Result<RenderedMap, ExportError> {
    if points.is_empty() {
        return Err(ExportError::NoLocations);
    }
    let framed: Vec<_> = points
        .iter()
        .filter(|point| frame.contains(&point.coordinates))
        .cloned()
        .collect();

    let palette = Palette::for_options(options);
    let (layout_width, layout_height) = options.size.dimensions();
    let (width, height) = (f64::from(layout_width), f64::from(layout_height));
    let (pixel_width, pixel_height) = options.pixel_size();
    let mut canvas = Canvas::new(
        pixel_width,
        pixel_height,
        options.quality.scale(),
        palette.background,
    );

    let stats_height = if options.show_stats { STATS_HEIGHT } else { 0.0 };
    let projection = Projection {
        bounds: frame,
        x: MARGIN,
        y: MARGIN,
        width: width - MARGIN * 2.0,
        height: height - MARGIN * 2.0 - stats_height,
    };

    canvas.fill_rect(
        projection.x,
        projection.y,
        projection.width,
        projection.height,
        palette.map,
        1.0,
    );
    draw_grid(&mut canvas, &projection, palette.grid);

    if options.theme != ExportTheme::Minimal {
        draw_journey(&mut canvas, &projection, &framed, palette.journey);
    }

    let show_labels = options.show_labels && options.theme != ExportTheme::Minimal;
    for point in &framed {
        let (x, y) = projection.project(&point.coordinates);
        draw_marker(&mut canvas, (x, y), point.category.color());
        if show_labels {
            centred_text(&mut canvas, (x, y + LABEL_OFFSET), &point.label, LABEL_CELL, palette.text);
        }
    }

    if options.show_title {
        centred_text(&mut canvas, (width / 2.0, TITLE_CENTRE_Y), TITLE, TITLE_CELL, palette.text);
    }

    if options.show_stats {
        draw_stats(&mut canvas, points, width, height, &palette);
    }

    if options.show_watermark {
        canvas.text(
            width - WATERMARK_INSET - text_width(WATERMARK, WATERMARK_CELL),
            height - WATERMARK_INSET - text_height(WATERMARK_CELL),
            WATERMARK,
            WATERMARK_CELL,
            palette.text,
            0.6,
        );
    }

    encode(canvas, options)
}

/// Suggested download name, e.g. `my-travel-map-1700000000000.png`.
pub fn file_name(unix_millis: i64, format: ExportFormat) -> String {
    format!("my-travel-map-{unix_millis}.{}", format.extension())
}
