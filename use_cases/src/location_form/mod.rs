mod draft;
mod upload;

use crate::location_store::{LocationRepo, LocationStore};
use crate::map_surface::FormPrefill;
use crate::session::Session;
use draft::optional_text;
use entities::geo::Coordinates;
use entities::locations::{
    Location, LocationChanges, LocationId, LocationName, NewLocation, PhotoUrl,
};
use std::sync::Arc;
use thiserror::Error;

pub use draft::LocationDraft;
#[cfg(test)]
pub use upload::MockBlobStorage;
pub use upload::{storage_path, upload_photos, BlobStorage, PhotoFile};

#[derive(Error, Debug)]
pub enum FormError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Upload(anyhow::Error),
    #[error("{0}")]
    Save(anyhow::Error),
    #[error("The form is not open")]
    NotOpen,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FormMode {
    Create { coordinates: Coordinates },
    Edit { id: LocationId, coordinates: Coordinates },
}

impl FormMode {
    pub fn coordinates(&self) -> Coordinates {
        match self {
            FormMode::Create { coordinates } | FormMode::Edit { coordinates, .. } => *coordinates,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    Created(Location),
    Updated(LocationId),
}

enum FormState {
    Closed,
    Open {
        mode: FormMode,
        draft: LocationDraft,
        error: Option<String>,
    },
}

/// Create and edit form for a location. Validation happens before anything
/// is sent; photos are uploaded before the record is written.
pub struct LocationForm {
    repo: Arc<dyn LocationRepo>,
    storage: Arc<dyn BlobStorage>,
    session: Arc<dyn Session>,
    store: Arc<LocationStore>,
    state: FormState,
}

impl LocationForm {
    pub fn new(
        repo: Arc<dyn LocationRepo>,
        storage: Arc<dyn BlobStorage>,
        session: Arc<dyn Session>,
        store: Arc<LocationStore>,
    ) -> Self {
        Self {
            repo,
            storage,
            session,
            store,
            state: FormState::Closed,
        }
    }

    pub fn open_create(&mut self, prefill: FormPrefill) {
        self.state = FormState::Open {
            mode: FormMode::Create {
                coordinates: prefill.coordinates,
            },
            draft: LocationDraft::named(prefill.name),
            error: None,
        };
    }

    pub fn open_edit(&mut self, location: &Location) {
        self.state = FormState::Open {
            mode: FormMode::Edit {
                id: location.id,
                coordinates: location.coordinates,
            },
            draft: LocationDraft::from_location(location),
            error: None,
        };
    }

    pub fn close(&mut self) {
        self.state = FormState::Closed;
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, FormState::Open { .. })
    }

    pub fn mode(&self) -> Option<FormMode> {
        match &self.state {
            FormState::Open { mode, .. } => Some(*mode),
            FormState::Closed => None,
        }
    }

    pub fn draft(&self) -> Option<&LocationDraft> {
        match &self.state {
            FormState::Open { draft, .. } => Some(draft),
            FormState::Closed => None,
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut LocationDraft> {
        match &mut self.state {
            FormState::Open { draft, .. } => Some(draft),
            FormState::Closed => None,
        }
    }

    /// The message of the last failed submit, shown until the next attempt.
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            FormState::Open { error, .. } => error.as_deref(),
            FormState::Closed => None,
        }
    }

    /// Uploads new photos, then inserts or updates the record. On success the
    /// form closes and the store refreshes; on failure the form stays open
    /// with the message and the input untouched.
    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn submit(&mut self) -> Result<SubmitOutcome, FormError> {
        let FormState::Open { mode, draft, error } = &mut self.state else {
            return Err(FormError::NotOpen);
        };
        *error = None;
        let mode = *mode;
        let draft = draft.clone();

        let result = self.write(mode, &draft).await;
        match result {
            Ok(outcome) => {
                // dropping the draft also drops the picked files
                self.close();
                self.store.notify_changed().await;
                Ok(outcome)
            }
            Err(err) => {
                if let FormState::Open { error, .. } = &mut self.state {
                    *error = Some(err.to_string());
                }
                Err(err)
            }
        }
    }

    async fn write(
        &self,
        mode: FormMode,
        draft: &LocationDraft,
    ) -> Result<SubmitOutcome, FormError> {
        let name = LocationName::try_from(draft.name.as_str())
            .map_err(|_| FormError::Validation("Name is required".to_string()))?;
        let owner = self.session.user_id();

        let uploaded = upload_photos(self.storage.clone(), owner, draft.new_photos().to_vec())
            .await
            .map_err(FormError::Upload)?;

        match mode {
            FormMode::Create { coordinates } => {
                let location = NewLocation {
                    owner,
                    name,
                    coordinates,
                    category: draft.category,
                    visited_date: draft.visited_date,
                    notes: optional_text(&draft.notes),
                    album_link: optional_text(&draft.album_link),
                    photo_urls: uploaded,
                };
                let created = self.repo.insert(location).await.map_err(FormError::Save)?;
                Ok(SubmitOutcome::Created(created))
            }
            FormMode::Edit { id, .. } => {
                let photo_urls: Vec<PhotoUrl> = draft
                    .existing_photos()
                    .iter()
                    .cloned()
                    .chain(uploaded)
                    .collect();
                let changes = LocationChanges {
                    name,
                    category: draft.category,
                    visited_date: draft.visited_date,
                    notes: optional_text(&draft.notes),
                    album_link: optional_text(&draft.album_link),
                    photo_urls,
                };
                self.repo
                    .update(id, changes)
                    .await
                    .map_err(FormError::Save)?;
                Ok(SubmitOutcome::Updated(id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FormError, LocationForm, MockBlobStorage, SubmitOutcome};
    use crate::location_store::{LocationStore, MockLocationRepo};
    use crate::map_surface::FormPrefill;
    use crate::test_support::{location, photo, session_for, InMemoryLocationRepo};
    use anyhow::anyhow;
    use chrono::NaiveDate;
    use entities::geo::Coordinates;
    use entities::locations::{Category, LocationName, OwnerId, PhotoUrl};
    use std::sync::Arc;

    struct Fixture {
        repo: Arc<InMemoryLocationRepo>,
        store: Arc<LocationStore>,
        form: LocationForm,
    }

    fn fixture(owner: OwnerId, repo: InMemoryLocationRepo, storage: MockBlobStorage) -> Fixture {
        let repo = Arc::new(repo);
        let session = Arc::new(session_for(owner));
        let store = Arc::new(LocationStore::new(repo.clone(), session.clone()));
        let form = LocationForm::new(repo.clone(), Arc::new(storage), session, store.clone());
        Fixture { repo, store, form }
    }

    fn paris_prefill() -> FormPrefill {
        FormPrefill {
            coordinates: Coordinates::new(48.8566, 2.3522).unwrap(),
            name: None,
        }
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected_before_any_network_call() {
        let mut repo = MockLocationRepo::new();
        repo.expect_insert().never();
        let mut storage = MockBlobStorage::new();
        storage.expect_upload().never();
        let owner = OwnerId::new();
        let session = Arc::new(session_for(owner));
        let repo = Arc::new(repo);
        let store = Arc::new(LocationStore::new(repo.clone(), session.clone()));
        let mut form = LocationForm::new(repo, Arc::new(storage), session, store);

        form.open_create(paris_prefill());
        let draft = form.draft_mut().unwrap();
        draft.name = "   ".to_string();
        draft.attach_photos([photo("a.jpg")]);

        let result = form.submit().await;

        assert!(matches!(result, Err(FormError::Validation(_))));
        assert!(form.is_open());
        assert_eq!(form.error(), Some("Name is required"));
    }

    #[tokio::test]
    async fn test_create_adds_exactly_one_record_to_the_store() {
        let owner = OwnerId::new();
        let existing = location(owner, "Rome, Italy", Category::Historical, None);
        let mut fixture = fixture(
            owner,
            InMemoryLocationRepo::with_records(vec![existing]),
            MockBlobStorage::new(),
        );
        fixture.store.refresh().await.unwrap();

        fixture.form.open_create(paris_prefill());
        let draft = fixture.form.draft_mut().unwrap();
        draft.name = "Paris, France".to_string();
        draft.set_category("food").unwrap();
        draft.visited_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        draft.notes = "Croissants".to_string();
        draft.album_link = "https://photos.example.com/paris".to_string();

        let outcome = fixture.form.submit().await.unwrap();

        let SubmitOutcome::Created(created) = outcome else {
            panic!("expected a created record");
        };
        assert!(!fixture.form.is_open());
        let snapshot = fixture.store.snapshot();
        assert_eq!(snapshot.len(), 2);
        let stored = fixture.store.find(created.id).unwrap();
        assert_eq!(stored.name, LocationName::try_from("Paris, France").unwrap());
        assert_eq!(stored.category, Category::Food);
        assert_eq!(stored.visited_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(stored.notes.as_deref(), Some("Croissants"));
        assert_eq!(
            stored.album_link.as_deref(),
            Some("https://photos.example.com/paris")
        );
        assert_eq!(stored.owner, owner);
        assert_eq!(stored.coordinates, paris_prefill().coordinates);
    }

    #[tokio::test]
    async fn test_notes_are_saved_as_typed() {
        let owner = OwnerId::new();
        let mut fixture = fixture(owner, InMemoryLocationRepo::default(), MockBlobStorage::new());

        fixture.form.open_create(paris_prefill());
        let draft = fixture.form.draft_mut().unwrap();
        draft.name = "Paris, France".to_string();
        draft.notes = "  Louvre at 9am\n  then lunch ".to_string();

        fixture.form.submit().await.unwrap();

        let stored = fixture.repo.records().pop().unwrap();
        assert_eq!(stored.notes.as_deref(), Some("  Louvre at 9am\n  then lunch "));
        assert_eq!(stored.album_link, None);
    }

    #[tokio::test]
    async fn test_edit_without_photo_changes_keeps_photo_urls() {
        let owner = OwnerId::new();
        let mut record = location(owner, "Lisbon, Portugal", Category::Urban, None);
        record.notes = Some("Trams".to_string());
        let mut fixture = fixture(
            owner,
            InMemoryLocationRepo::with_records(vec![record.clone()]),
            MockBlobStorage::new(),
        );

        fixture.form.open_edit(&record);
        fixture.form.draft_mut().unwrap().notes = "Trams and tarts".to_string();
        let outcome = fixture.form.submit().await.unwrap();

        assert_eq!(outcome, SubmitOutcome::Updated(record.id));
        let stored = fixture.store.find(record.id).unwrap();
        assert!(stored.photo_urls.is_empty());
        assert_eq!(stored.notes.as_deref(), Some("Trams and tarts"));
    }

    #[tokio::test]
    async fn test_edit_appends_new_photos_after_retained_ones() {
        let owner = OwnerId::new();
        let mut record = location(owner, "Oslo, Norway", Category::Urban, None);
        record.photo_urls = vec![PhotoUrl::from("https://cdn/1.jpg"), PhotoUrl::from("https://cdn/2.jpg")];
        let mut storage = MockBlobStorage::new();
        storage
            .expect_upload()
            .times(1)
            .returning(|_, _| Ok(PhotoUrl::from("https://cdn/3.jpg")));
        let mut fixture = fixture(
            owner,
            InMemoryLocationRepo::with_records(vec![record.clone()]),
            storage,
        );

        fixture.form.open_edit(&record);
        let draft = fixture.form.draft_mut().unwrap();
        draft.remove_existing_photo(0);
        draft.attach_photos([photo("fjord.jpg")]);
        fixture.form.submit().await.unwrap();

        let stored = fixture.store.find(record.id).unwrap();
        assert_eq!(
            stored.photo_urls,
            vec![PhotoUrl::from("https://cdn/2.jpg"), PhotoUrl::from("https://cdn/3.jpg")]
        );
    }

    #[tokio::test]
    async fn test_one_rejected_upload_writes_nothing_and_keeps_the_form_open() {
        let owner = OwnerId::new();
        let mut storage = MockBlobStorage::new();
        storage.expect_upload().times(3).returning(|_, photo| {
            if photo.file_name == "two.jpg" {
                Err(anyhow!("The object exceeded the maximum allowed size"))
            } else {
                Ok(PhotoUrl::new(format!("https://cdn/{}", photo.file_name)))
            }
        });
        let mut fixture = fixture(owner, InMemoryLocationRepo::default(), storage);

        fixture.form.open_create(paris_prefill());
        let draft = fixture.form.draft_mut().unwrap();
        draft.name = "Paris, France".to_string();
        draft.attach_photos([photo("one.jpg"), photo("two.jpg"), photo("three.jpg")]);

        let result = fixture.form.submit().await;

        assert!(matches!(result, Err(FormError::Upload(_))));
        assert!(fixture.repo.records().is_empty());
        assert!(fixture.form.is_open());
        assert_eq!(
            fixture.form.error(),
            Some("The object exceeded the maximum allowed size")
        );
        assert_eq!(fixture.form.draft().unwrap().new_photos().len(), 3);
    }

    #[tokio::test]
    async fn test_save_failure_is_shown_verbatim_and_retry_succeeds() {
        let owner = OwnerId::new();
        let mut fixture = fixture(owner, InMemoryLocationRepo::default(), MockBlobStorage::new());
        fixture
            .repo
            .fail_writes_with("new row violates row-level security policy");

        fixture.form.open_create(paris_prefill());
        fixture.form.draft_mut().unwrap().name = "Paris, France".to_string();

        assert!(matches!(fixture.form.submit().await, Err(FormError::Save(_))));
        assert_eq!(
            fixture.form.error(),
            Some("new row violates row-level security policy")
        );
        assert!(fixture.store.snapshot().is_empty());

        fixture.repo.recover();
        assert!(fixture.form.submit().await.is_ok());
        assert_eq!(fixture.form.error(), None);
        assert_eq!(fixture.store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_on_a_closed_form_is_rejected() {
        let owner = OwnerId::new();
        let mut fixture = fixture(owner, InMemoryLocationRepo::default(), MockBlobStorage::new());
        assert!(matches!(fixture.form.submit().await, Err(FormError::NotOpen)));
    }
}
