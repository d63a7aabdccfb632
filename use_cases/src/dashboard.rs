use crate::category_filter::CategoryFilter;
use crate::detail_panel::{DetailPanel, PanelError};
use crate::location_form::{BlobStorage, FormError, LocationForm, SubmitOutcome};
use crate::location_store::{LocationRepo, LocationStore, RefreshError};
use crate::map_surface::{
    FormPrefill, Geocoder, MapEvent, MapStyle, MapSurface, MapWidget, MarkerTarget, Place,
};
use crate::session::Session;
use crate::statistics::JourneyStats;
use chrono::NaiveDate;
use entities::geo::Coordinates;
use entities::locations::{Category, Location, LocationId};
use std::sync::Arc;

pub struct Collaborators {
    pub repo: Arc<dyn LocationRepo>,
    pub storage: Arc<dyn BlobStorage>,
    pub geocoder: Arc<dyn Geocoder>,
    pub session: Arc<dyn Session>,
}

/// What a map event led to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interaction {
    Nothing,
    FormOpened,
    PanelOpened(LocationId),
}

/// Wires the store, filter, map, form and panel together. The map is
/// re-rendered from the filtered snapshot after every change.
pub struct Dashboard {
    session: Arc<dyn Session>,
    store: Arc<LocationStore>,
    filter: CategoryFilter,
    map: MapSurface,
    form: LocationForm,
    panel: DetailPanel,
}

impl Dashboard {
    pub fn new(collaborators: Collaborators, widget: Box<dyn MapWidget>) -> Self {
        let Collaborators {
            repo,
            storage,
            geocoder,
            session,
        } = collaborators;
        let store = Arc::new(LocationStore::new(repo.clone(), session.clone()));

        Self {
            form: LocationForm::new(repo.clone(), storage, session.clone(), store.clone()),
            panel: DetailPanel::new(repo, store.clone()),
            map: MapSurface::new(widget, geocoder),
            filter: CategoryFilter::new(),
            session,
            store,
        }
    }

    /// Initial fetch. The map is drawn even when the fetch fails.
    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn load(&mut self) -> Result<usize, RefreshError> {
        let refreshed = self.store.refresh().await;
        let markers = self.sync();
        refreshed.map(|_| markers)
    }

    /// Brings the panel and the markers in line with the latest snapshot.
    pub fn sync(&mut self) -> usize {
        self.panel.sync();
        let visible = self.visible_locations();
        self.map.render(&visible)
    }

    pub fn visible_locations(&self) -> Vec<Location> {
        self.filter.apply(&self.store.snapshot())
    }

    pub fn filter(&self) -> &CategoryFilter {
        &self.filter
    }

    pub fn toggle_category(&mut self, category: Category) -> usize {
        self.filter.toggle(category);
        self.sync()
    }

    /// Fits the map around the visible locations.
    pub fn fit_to_markers(&mut self) -> bool {
        self.map.fit_to_markers()
    }

    pub async fn handle_map_event(&mut self, event: MapEvent) -> Interaction {
        match event {
            MapEvent::BackgroundClicked(coordinates) => {
                let prefill = self.map.click_background(coordinates).await;
                self.form.open_create(prefill);
                Interaction::FormOpened
            }
            MapEvent::MarkerClicked(handle) => match self.map.resolve(handle) {
                Some(MarkerTarget::Saved(id)) => {
                    if self.open_location(id) {
                        Interaction::PanelOpened(id)
                    } else {
                        Interaction::Nothing
                    }
                }
                Some(MarkerTarget::Transient) => match self.map.click_transient() {
                    Some(prefill) => {
                        self.form.open_create(prefill);
                        Interaction::FormOpened
                    }
                    None => Interaction::Nothing,
                },
                None => Interaction::Nothing,
            },
        }
    }

    pub async fn search(&mut self, query: &str) -> Option<Place> {
        self.map.search(query).await
    }

    pub fn open_add_form(&mut self, coordinates: Coordinates) {
        self.form.open_create(FormPrefill {
            coordinates,
            name: None,
        });
    }

    pub async fn submit_form(&mut self) -> Result<SubmitOutcome, FormError> {
        let outcome = self.form.submit().await?;
        self.sync();
        Ok(outcome)
    }

    /// Opens the panel for a record of the latest snapshot. False when the
    /// record is gone.
    pub fn open_location(&mut self, id: LocationId) -> bool {
        match self.store.find(id) {
            Some(location) => {
                self.panel.open(&location);
                true
            }
            None => false,
        }
    }

    pub fn edit_selected(&mut self) -> bool {
        match self.panel.begin_edit() {
            Some(location) => {
                self.form.open_edit(&location);
                true
            }
            None => false,
        }
    }

    pub fn request_delete(&mut self) -> Result<&'static str, PanelError> {
        self.panel.request_delete()
    }

    pub async fn confirm_delete(&mut self) -> Result<LocationId, PanelError> {
        let id = self.panel.confirm_delete().await?;
        self.sync();
        Ok(id)
    }

    /// Statistics over every location, hidden categories included.
    pub fn stats(&self, today: NaiveDate) -> JourneyStats {
        JourneyStats::compute(&self.store.snapshot(), today)
    }

    pub fn locate_user(&mut self, coordinates: Coordinates) {
        self.map.center_on(coordinates);
    }

    pub fn change_style(&mut self, style: MapStyle) {
        self.map.change_style(style);
    }

    pub fn map(&self) -> &MapSurface {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut MapSurface {
        &mut self.map
    }

    pub fn form(&self) -> &LocationForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut LocationForm {
        &mut self.form
    }

    pub fn panel(&self) -> &DetailPanel {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut DetailPanel {
        &mut self.panel
    }

    pub fn store(&self) -> &LocationStore {
        &self.store
    }

    pub fn email(&self) -> String {
        self.session.email()
    }
}

#[cfg(test)]
mod tests {
    use super::{Collaborators, Dashboard, Interaction};
    use crate::location_form::MockBlobStorage;
    use crate::map_surface::{MapEvent, MarkerHandle, MarkerKind, MockGeocoder, Place};
    use crate::test_support::{located, session_for, InMemoryLocationRepo, RecordingWidget};
    use entities::geo::Coordinates;
    use entities::locations::{Category, Location, OwnerId};
    use std::sync::Arc;

    fn dashboard(
        owner: OwnerId,
        records: Vec<Location>,
        geocoder: MockGeocoder,
    ) -> (Arc<InMemoryLocationRepo>, RecordingWidget, Dashboard) {
        let repo = Arc::new(InMemoryLocationRepo::with_records(records));
        let widget = RecordingWidget::default();
        let dashboard = Dashboard::new(
            Collaborators {
                repo: repo.clone(),
                storage: Arc::new(MockBlobStorage::new()),
                geocoder: Arc::new(geocoder),
                session: Arc::new(session_for(owner)),
            },
            Box::new(widget.clone()),
        );
        (repo, widget, dashboard)
    }

    fn ten_locations(owner: OwnerId) -> Vec<Location> {
        (0..10)
            .map(|index| {
                let category = if index < 3 {
                    Category::Nature
                } else {
                    Category::Urban
                };
                located(
                    owner,
                    &format!("Place {index}, Country"),
                    category,
                    None,
                    index as f64,
                    index as f64,
                )
            })
            .collect()
    }

    fn handle_of(widget: &RecordingWidget, wanted: impl Fn(&MarkerKind) -> bool) -> MarkerHandle {
        let state = widget.state.lock().unwrap();
        let (handle, _) = state
            .markers
            .iter()
            .find(|(_, marker)| wanted(&marker.kind))
            .unwrap();
        MarkerHandle(*handle)
    }

    #[tokio::test]
    async fn test_hiding_a_category_removes_its_markers() {
        let owner = OwnerId::new();
        let (_, widget, mut dashboard) =
            dashboard(owner, ten_locations(owner), MockGeocoder::new());

        assert_eq!(dashboard.load().await.unwrap(), 10);
        assert_eq!(dashboard.toggle_category(Category::Nature), 7);
        assert_eq!(widget.marker_count(), 7);

        assert_eq!(dashboard.toggle_category(Category::Nature), 10);
        let today = chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(dashboard.stats(today).locations, 10);
    }

    #[tokio::test]
    async fn test_map_click_to_saved_marker_round_trip() {
        let owner = OwnerId::new();
        let mut geocoder = MockGeocoder::new();
        geocoder.expect_reverse().returning(|coordinates| {
            Ok(vec![Place {
                name: "Paris, France".to_string(),
                coordinates,
            }])
        });
        let (repo, widget, mut dashboard) = dashboard(owner, vec![], geocoder);
        dashboard.load().await.unwrap();

        let paris = Coordinates::new(48.8566, 2.3522).unwrap();
        let interaction = dashboard
            .handle_map_event(MapEvent::BackgroundClicked(paris))
            .await;
        assert_eq!(interaction, Interaction::FormOpened);
        assert_eq!(
            dashboard.form().draft().unwrap().name,
            "Paris, France".to_string()
        );

        dashboard.submit_form().await.unwrap();
        assert_eq!(repo.records().len(), 1);
        assert_eq!(widget.marker_count(), 1);

        let handle = handle_of(&widget, |kind| matches!(kind, MarkerKind::Saved { .. }));
        let interaction = dashboard
            .handle_map_event(MapEvent::MarkerClicked(handle))
            .await;
        let id = repo.records()[0].id;
        assert_eq!(interaction, Interaction::PanelOpened(id));

        dashboard.request_delete().unwrap();
        assert_eq!(dashboard.confirm_delete().await.unwrap(), id);
        assert!(repo.records().is_empty());
        assert_eq!(widget.marker_count(), 0);
        assert!(!dashboard.panel().is_open());
    }

    #[tokio::test]
    async fn test_search_pin_opens_a_prefilled_form() {
        let owner = OwnerId::new();
        let mut geocoder = MockGeocoder::new();
        geocoder.expect_forward().returning(|_| {
            Ok(vec![Place {
                name: "Kyoto, Japan".to_string(),
                coordinates: Coordinates::new(35.0116, 135.7681).unwrap(),
            }])
        });
        let (_, widget, mut dashboard) = dashboard(owner, vec![], geocoder);

        dashboard.search("kyoto").await.unwrap();
        let handle = handle_of(&widget, |kind| *kind == MarkerKind::Transient);
        let interaction = dashboard
            .handle_map_event(MapEvent::MarkerClicked(handle))
            .await;

        assert_eq!(interaction, Interaction::FormOpened);
        assert_eq!(dashboard.form().draft().unwrap().name, "Kyoto, Japan");
        assert_eq!(widget.marker_count(), 0);
    }

    #[tokio::test]
    async fn test_edit_selected_opens_the_form_with_the_record() {
        let owner = OwnerId::new();
        let records = ten_locations(owner);
        let first = records[0].clone();
        let (_, _, mut dashboard) = dashboard(owner, records, MockGeocoder::new());
        dashboard.load().await.unwrap();

        assert!(dashboard.open_location(first.id));
        assert!(dashboard.edit_selected());
        assert!(!dashboard.panel().is_open());
        assert_eq!(dashboard.form().draft().unwrap().name, first.name.inner());
        assert!(!dashboard.edit_selected());
    }

    #[tokio::test]
    async fn test_fit_to_markers_ignores_hidden_categories() {
        let owner = OwnerId::new();
        let (_, widget, mut dashboard) =
            dashboard(owner, ten_locations(owner), MockGeocoder::new());
        assert!(!dashboard.fit_to_markers());

        dashboard.load().await.unwrap();
        dashboard.toggle_category(Category::Nature);
        assert!(dashboard.fit_to_markers());

        // the three nature places sit at 0..=2
        let fitted = widget.state.lock().unwrap().fitted.unwrap();
        assert!((fitted.south - 2.4).abs() < 1e-9);
        assert!((fitted.north - 9.6).abs() < 1e-9);
    }

    #[test]
    fn test_locate_user_flies_to_their_position() {
        let owner = OwnerId::new();
        let (_, widget, mut dashboard) = dashboard(owner, vec![], MockGeocoder::new());

        dashboard.locate_user(Coordinates::new(51.5072, -0.1276).unwrap());

        let viewport = widget.state.lock().unwrap().viewport.unwrap();
        assert_eq!((viewport.latitude, viewport.longitude), (51.5072, -0.1276));
        assert_eq!(viewport.zoom, 10.0);
    }
}
