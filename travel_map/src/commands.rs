use crate::cli::{Cli, Commands, FormFields};
use anyhow::{bail, Context};
use bytes::Bytes;
use chrono::{NaiveDate, Utc};
use entities::geo::Coordinates;
use entities::locations::{Category, Location, LocationId};
use map_export::{ExportFormat, ExportOptions, ExportPoint};
use std::io::Write;
use std::path::{Path, PathBuf};
use use_cases::dashboard::Dashboard;
use use_cases::location_form::{FormMode, LocationDraft, PhotoFile, SubmitOutcome};
use use_cases::map_surface::MapEvent;
use use_cases::statistics::JourneyStats;

pub async fn run(cli: Cli, dashboard: &mut Dashboard) -> anyhow::Result<()> {
    // commands that need a saved record fail on their own lookup
    if let Err(err) = dashboard.load().await {
        tracing::warn!(error = %err, "Continuing without the saved locations");
    }

    match cli.command {
        Commands::List { hide } => list(dashboard, &hide),
        Commands::Show { id } => show(dashboard, id),
        Commands::Stats => {
            let stats = dashboard.stats(Utc::now().date_naive());
            print!("{}", describe_stats(&stats, &dashboard.email()));
            Ok(())
        }
        Commands::Add { lat, lng, fields } => add(dashboard, lat, lng, fields).await,
        Commands::Search {
            query,
            save,
            fields,
        } => search(dashboard, &query, save, fields).await,
        Commands::Edit {
            id,
            fields,
            remove_photo,
        } => edit(dashboard, id, fields, remove_photo).await,
        Commands::Delete { id, yes } => delete(dashboard, id, yes).await,
        Commands::Export {
            out,
            size,
            quality,
            format,
            style,
            theme,
            no_stats,
            no_title,
            no_labels,
            no_watermark,
            hide,
        } => {
            let options = ExportOptions {
                format,
                quality,
                size,
                style,
                theme,
                show_stats: !no_stats,
                show_title: !no_title,
                show_labels: !no_labels,
                show_watermark: !no_watermark,
            };
            export(dashboard, &out, options, &hide).await
        }
        Commands::Snapshot {
            out,
            style,
            fit,
            near_lat,
            near_lng,
        } => {
            if let Some(style) = style {
                dashboard.change_style(style);
            }
            if let (Some(latitude), Some(longitude)) = (near_lat, near_lng) {
                dashboard.locate_user(Coordinates::new(latitude, longitude)?);
            } else if fit {
                dashboard.fit_to_markers();
            }
            let bytes = dashboard.map().widget().snapshot()?;
            tokio::fs::write(&out, bytes)
                .await
                .with_context(|| format!("Failed to write {}", out.display()))?;
            println!("{}", out.display());
            Ok(())
        }
    }
}

fn hide_categories(dashboard: &mut Dashboard, hidden: &[Category]) {
    for category in hidden {
        if dashboard.filter().is_active(*category) {
            dashboard.toggle_category(*category);
        }
    }
}

fn list(dashboard: &mut Dashboard, hidden: &[Category]) -> anyhow::Result<()> {
    hide_categories(dashboard, hidden);
    let visible = dashboard.visible_locations();
    for location in &visible {
        println!("{}", describe_row(location));
    }

    let counts = dashboard.filter().counts(&dashboard.store().snapshot());
    let summary: Vec<_> = counts
        .into_iter()
        .map(|(category, count)| format!("{} {count}", category.label()))
        .collect();
    println!("{} shown. {}", visible.len(), summary.join(", "));
    Ok(())
}

fn show(dashboard: &mut Dashboard, id: LocationId) -> anyhow::Result<()> {
    if !dashboard.open_location(id) {
        bail!("No location with id {id}");
    }
    let Some(location) = dashboard.panel().location() else {
        bail!("No location with id {id}");
    };
    print!("{}", describe_location(&location));
    Ok(())
}

async fn add(
    dashboard: &mut Dashboard,
    latitude: f64,
    longitude: f64,
    fields: FormFields,
) -> anyhow::Result<()> {
    let coordinates = Coordinates::new(latitude, longitude)?;
    dashboard
        .handle_map_event(MapEvent::BackgroundClicked(coordinates))
        .await;
    submit(dashboard, fields).await
}

async fn search(
    dashboard: &mut Dashboard,
    query: &str,
    save: bool,
    fields: FormFields,
) -> anyhow::Result<()> {
    let Some(place) = dashboard.search(query).await else {
        bail!("Nothing found for {query}");
    };
    println!("{} ({})", place.name, place.coordinates);
    if !save {
        return Ok(());
    }

    let Some(prefill) = dashboard.map_mut().click_transient() else {
        bail!("The search result is no longer on the map");
    };
    dashboard.form_mut().open_create(prefill);
    submit(dashboard, fields).await
}

async fn edit(
    dashboard: &mut Dashboard,
    id: LocationId,
    fields: FormFields,
    mut remove_photo: Vec<usize>,
) -> anyhow::Result<()> {
    if !dashboard.open_location(id) || !dashboard.edit_selected() {
        bail!("No location with id {id}");
    }
    if let Some(draft) = dashboard.form_mut().draft_mut() {
        // highest first so earlier positions stay valid
        remove_photo.sort_unstable_by(|a, b| b.cmp(a));
        remove_photo.dedup();
        for position in remove_photo {
            if draft.remove_existing_photo(position).is_none() {
                bail!("No photo at position {position}");
            }
        }
    }
    submit(dashboard, fields).await
}

async fn submit(dashboard: &mut Dashboard, fields: FormFields) -> anyhow::Result<()> {
    let photos = read_photos(&fields.photos).await?;
    let Some(draft) = dashboard.form_mut().draft_mut() else {
        bail!("The form is not open");
    };
    apply_fields(draft, fields, photos)?;

    if let Some(mode) = dashboard.form().mode() {
        let editing = matches!(mode, FormMode::Edit { .. });
        tracing::info!(coordinates = %mode.coordinates(), editing, "Submitting location");
    }
    match dashboard.submit_form().await? {
        SubmitOutcome::Created(location) => println!("Saved {}", describe_row(&location)),
        SubmitOutcome::Updated(id) => println!("Updated {id}"),
    }
    Ok(())
}

async fn delete(dashboard: &mut Dashboard, id: LocationId, yes: bool) -> anyhow::Result<()> {
    if !dashboard.open_location(id) {
        bail!("No location with id {id}");
    }
    let question = dashboard.request_delete()?;
    if !yes && !confirm(question)? {
        dashboard.panel_mut().cancel_delete();
        println!("Cancelled");
        return Ok(());
    }
    let deleted = dashboard.confirm_delete().await?;
    println!("Deleted {deleted}");
    Ok(())
}

async fn export(
    dashboard: &mut Dashboard,
    out: &Path,
    options: ExportOptions,
    hidden: &[Category],
) -> anyhow::Result<()> {
    hide_categories(dashboard, hidden);
    let points: Vec<_> = dashboard
        .visible_locations()
        .iter()
        .map(ExportPoint::from)
        .collect();
    let rendered = map_export::render(&points, &options)?;

    let target = output_path(out, options.format, Utc::now().timestamp_millis());
    tokio::fs::write(&target, &rendered.bytes)
        .await
        .with_context(|| format!("Failed to write {}", target.display()))?;
    tracing::info!(path = %target.display(), width = rendered.width, height = rendered.height, "Exported map");
    println!("{}", target.display());
    Ok(())
}

fn confirm(question: &str) -> anyhow::Result<bool> {
    print!("{question} [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// A directory gets a generated file name inside it.
fn output_path(out: &Path, format: ExportFormat, unix_millis: i64) -> PathBuf {
    if out.is_dir() {
        out.join(map_export::file_name(unix_millis, format))
    } else {
        out.to_path_buf()
    }
}

async fn read_photos(paths: &[PathBuf]) -> anyhow::Result<Vec<PhotoFile>> {
    let mut photos = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        photos.push(PhotoFile {
            file_name,
            content_type: None,
            bytes: Bytes::from(bytes),
        });
    }
    Ok(photos)
}

fn apply_fields(
    draft: &mut LocationDraft,
    fields: FormFields,
    photos: Vec<PhotoFile>,
) -> anyhow::Result<()> {
    if let Some(name) = fields.name {
        draft.name = name;
    }
    if let Some(category) = fields.category {
        draft.set_category(&category)?;
    }
    if let Some(date) = fields.date {
        draft.visited_date = Some(date);
    }
    if let Some(notes) = fields.notes {
        draft.notes = notes;
    }
    if let Some(album) = fields.album {
        draft.album_link = album;
    }
    draft.attach_photos(photos);
    Ok(())
}

fn describe_date(date: Option<NaiveDate>) -> String {
    date.map(|date| date.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn describe_row(location: &Location) -> String {
    format!(
        "{}  {} {}  {}  {}",
        location.id,
        location.category.icon(),
        location.name,
        location.category.label(),
        describe_date(location.visited_date)
    )
}

fn describe_location(location: &Location) -> String {
    let mut lines = vec![
        format!("{} {}", location.category.icon(), location.name),
        format!("Category: {}", location.category.label()),
        format!("Visited: {}", describe_date(location.visited_date)),
        format!("Coordinates: {}", location.coordinates),
    ];
    if let Some(notes) = &location.notes {
        lines.push(format!("Notes: {notes}"));
    }
    if let Some(album) = &location.album_link {
        lines.push(format!("Album: {album}"));
    }
    for (position, url) in location.photo_urls.iter().enumerate() {
        lines.push(format!("Photo {position}: {url}"));
    }
    lines.into_iter().map(|line| line + "\n").collect()
}

fn describe_stats(stats: &JourneyStats, email: &str) -> String {
    let latest = match (&stats.latest_place, stats.last_visit) {
        (Some(place), Some(date)) => format!("{place} on {}", describe_date(Some(date))),
        (Some(place), None) => place.clone(),
        (None, _) => "-".to_string(),
    };
    format!(
        "Signed in as {email}\n\
         Locations: {}\n\
         Photos: {} across {} locations\n\
         Countries: {}\n\
         Visits in the last 30 days: {}\n\
         Latest: {latest}\n",
        stats.locations,
        stats.photos,
        stats.locations_with_photos,
        stats.countries,
        stats.recent_visits,
    )
}
