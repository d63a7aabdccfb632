use crate::location_form::PhotoFile;
use crate::location_store::LocationRepo;
use crate::map_surface::{MapStyle, MapWidget, MarkerHandle, MarkerSpec, Viewport};
use crate::session::MockSession;
use anyhow::anyhow;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDate;
use entities::geo::{Bounds, Coordinates};
use entities::locations::{
    Category, Location, LocationChanges, LocationId, LocationName, NewLocation, OwnerId,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

pub fn location(
    owner: OwnerId,
    name: &str,
    category: Category,
    visited_date: Option<NaiveDate>,
) -> Location {
    located(owner, name, category, visited_date, 48.8566, 2.3522)
}

pub fn located(
    owner: OwnerId,
    name: &str,
    category: Category,
    visited_date: Option<NaiveDate>,
    latitude: f64,
    longitude: f64,
) -> Location {
    Location {
        id: LocationId::new(),
        owner,
        name: LocationName::try_from(name).unwrap(),
        coordinates: Coordinates::new(latitude, longitude).unwrap(),
        category,
        visited_date,
        notes: None,
        album_link: None,
        photo_urls: vec![],
    }
}

pub fn photo(file_name: &str) -> PhotoFile {
    PhotoFile {
        file_name: file_name.to_string(),
        content_type: Some("image/jpeg".to_string()),
        bytes: Bytes::from_static(b"\xff\xd8\xff"),
    }
}

pub fn session_for(owner: OwnerId) -> MockSession {
    let mut session = MockSession::new();
    session.expect_user_id().return_const(owner);
    session
        .expect_email()
        .return_const("traveller@example.com".to_string());
    session
}

/// A repository that behaves like the remote collection: inserts get a fresh
/// id and reads only return the owner's records.
#[derive(Default)]
pub struct InMemoryLocationRepo {
    records: Mutex<Vec<Location>>,
    failing_writes: Mutex<Option<String>>,
}

impl InMemoryLocationRepo {
    pub fn with_records(records: Vec<Location>) -> Self {
        Self {
            records: Mutex::new(records),
            failing_writes: Mutex::new(None),
        }
    }

    pub fn fail_writes_with(&self, message: &str) {
        *self.failing_writes.lock().unwrap() = Some(message.to_owned());
    }

    pub fn recover(&self) {
        *self.failing_writes.lock().unwrap() = None;
    }

    pub fn records(&self) -> Vec<Location> {
        self.records.lock().unwrap().clone()
    }

    fn check_write(&self) -> anyhow::Result<()> {
        match self.failing_writes.lock().unwrap().as_ref() {
            Some(message) => Err(anyhow!(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl LocationRepo for InMemoryLocationRepo {
    async fn list_for_owner(&self, owner: OwnerId) -> anyhow::Result<Vec<Location>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|location| location.owner == owner)
            .cloned()
            .collect())
    }

    async fn insert(&self, location: NewLocation) -> anyhow::Result<Location> {
        self.check_write()?;
        let location = Location::from_new(LocationId::new(), location);
        self.records.lock().unwrap().push(location.clone());
        Ok(location)
    }

    async fn update(&self, id: LocationId, changes: LocationChanges) -> anyhow::Result<()> {
        self.check_write()?;
        let mut records = self.records.lock().unwrap();
        if let Some(location) = records.iter_mut().find(|location| location.id == id) {
            location.apply(changes);
        }
        Ok(())
    }

    async fn delete(&self, id: LocationId) -> anyhow::Result<()> {
        self.check_write()?;
        self.records
            .lock()
            .unwrap()
            .retain(|location| location.id != id);
        Ok(())
    }
}

#[derive(Default, Debug)]
pub struct WidgetState {
    pub next_handle: u64,
    pub markers: BTreeMap<u64, MarkerSpec>,
    pub viewport: Option<Viewport>,
    pub fitted: Option<Bounds>,
    pub style: Option<MapStyle>,
    pub removed: usize,
}

/// A map widget that remembers what it was asked to draw. The state is shared
/// so a test can inspect it after handing the widget to a surface.
#[derive(Default, Clone)]
pub struct RecordingWidget {
    pub state: Arc<Mutex<WidgetState>>,
}

impl RecordingWidget {
    pub fn marker_count(&self) -> usize {
        self.state.lock().unwrap().markers.len()
    }
}

impl MapWidget for RecordingWidget {
    fn add_marker(&mut self, marker: MarkerSpec) -> anyhow::Result<MarkerHandle> {
        let mut state = self.state.lock().unwrap();
        state.next_handle += 1;
        let handle = state.next_handle;
        state.markers.insert(handle, marker);
        Ok(MarkerHandle(handle))
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        let mut state = self.state.lock().unwrap();
        if state.markers.remove(&handle.0).is_some() {
            state.removed += 1;
        }
    }

    fn fly_to(&mut self, viewport: Viewport) -> anyhow::Result<()> {
        self.state.lock().unwrap().viewport = Some(viewport);
        Ok(())
    }

    fn fit_bounds(&mut self, bounds: Bounds) -> anyhow::Result<()> {
        self.state.lock().unwrap().fitted = Some(bounds);
        Ok(())
    }

    fn set_style(&mut self, style: MapStyle) -> anyhow::Result<()> {
        self.state.lock().unwrap().style = Some(style);
        Ok(())
    }

    fn snapshot(&self) -> anyhow::Result<Vec<u8>> {
        Ok(vec![])
    }
}
