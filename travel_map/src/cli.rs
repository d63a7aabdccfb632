use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use entities::locations::{Category, LocationId};
use map_export::{ExportFormat, ExportQuality, ExportSize, ExportStyle, ExportTheme};
use std::path::PathBuf;
use use_cases::map_surface::MapStyle;

#[derive(Parser, Debug)]
#[command(name = "travel-map")]
#[command(about = "Pin, browse and export your travel memories", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Fields of the location form. Anything left out keeps its current value.
#[derive(Args, Debug, Default)]
pub struct FormFields {
    #[arg(long)]
    pub name: Option<String>,
    /// One of general, historical, food, nature, beach, urban, entertainment,
    /// shopping, accommodation, photo
    #[arg(long)]
    pub category: Option<String>,
    /// Visit date as YYYY-MM-DD
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long)]
    pub notes: Option<String>,
    /// Link to an external photo album
    #[arg(long)]
    pub album: Option<String>,
    /// Photo to upload, may be repeated
    #[arg(long = "photo")]
    pub photos: Vec<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List saved locations, most recent visit first
    List {
        /// Hide a category, may be repeated
        #[arg(long)]
        hide: Vec<Category>,
    },
    /// Show one location with its photos
    Show { id: LocationId },
    /// Journey statistics
    Stats,
    /// Pin a new location
    Add {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        #[command(flatten)]
        fields: FormFields,
    },
    /// Look a place up and optionally save it
    Search {
        query: String,
        /// Save the found place as a new location
        #[arg(long, default_value_t = false)]
        save: bool,
        #[command(flatten)]
        fields: FormFields,
    },
    /// Change a saved location
    Edit {
        id: LocationId,
        #[command(flatten)]
        fields: FormFields,
        /// Position of a stored photo to drop, may be repeated
        #[arg(long)]
        remove_photo: Vec<usize>,
    },
    /// Delete a saved location
    Delete {
        id: LocationId,
        /// Skip the confirmation prompt
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
    /// Render the visible locations to an image
    Export {
        /// Target file, or a directory to place a generated file name in
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value = "social")]
        size: ExportSize,
        #[arg(long, default_value = "high")]
        quality: ExportQuality,
        #[arg(long, default_value = "png")]
        format: ExportFormat,
        #[arg(long, default_value = "light")]
        style: ExportStyle,
        #[arg(long, default_value = "modern")]
        theme: ExportTheme,
        #[arg(long, default_value_t = false)]
        no_stats: bool,
        #[arg(long, default_value_t = false)]
        no_title: bool,
        /// Leave place names off the markers
        #[arg(long, default_value_t = false)]
        no_labels: bool,
        #[arg(long, default_value_t = false)]
        no_watermark: bool,
        #[arg(long)]
        hide: Vec<Category>,
    },
    /// Save what the map currently shows
    Snapshot {
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        style: Option<MapStyle>,
        /// Zoom to fit every visible location
        #[arg(long, default_value_t = false, conflicts_with = "near_lat")]
        fit: bool,
        /// Centre on your own position instead
        #[arg(long, requires = "near_lng", allow_hyphen_values = true)]
        near_lat: Option<f64>,
        #[arg(long, requires = "near_lat", allow_hyphen_values = true)]
        near_lng: Option<f64>,
    },
}
