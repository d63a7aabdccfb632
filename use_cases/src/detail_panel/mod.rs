mod carousel;

use crate::location_store::{LocationRepo, LocationStore};
use entities::locations::{Location, LocationId};
use std::sync::Arc;
use thiserror::Error;

pub use carousel::PhotoCarousel;

pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this memory?";

#[derive(Error, Debug)]
pub enum PanelError {
    #[error("No location is open")]
    NotOpen,
    #[error("Delete has not been confirmed")]
    NotConfirmed,
    #[error("{0}")]
    Delete(anyhow::Error),
}

enum PanelState {
    Closed,
    Open {
        id: LocationId,
        carousel: PhotoCarousel,
        confirming_delete: bool,
        error: Option<String>,
    },
}

/// Read-only view of one location with its photos.
pub struct DetailPanel {
    repo: Arc<dyn LocationRepo>,
    store: Arc<LocationStore>,
    state: PanelState,
}

impl DetailPanel {
    pub fn new(repo: Arc<dyn LocationRepo>, store: Arc<LocationStore>) -> Self {
        Self {
            repo,
            store,
            state: PanelState::Closed,
        }
    }

    pub fn open(&mut self, location: &Location) {
        self.state = PanelState::Open {
            id: location.id,
            carousel: PhotoCarousel::new(location.photo_urls.clone()),
            confirming_delete: false,
            error: None,
        };
    }

    pub fn close(&mut self) {
        self.state = PanelState::Closed;
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, PanelState::Open { .. })
    }

    pub fn location_id(&self) -> Option<LocationId> {
        match &self.state {
            PanelState::Open { id, .. } => Some(*id),
            PanelState::Closed => None,
        }
    }

    /// The shown record, read from the latest store snapshot.
    pub fn location(&self) -> Option<Location> {
        self.location_id().and_then(|id| self.store.find(id))
    }

    pub fn carousel(&self) -> Option<&PhotoCarousel> {
        match &self.state {
            PanelState::Open { carousel, .. } => Some(carousel),
            PanelState::Closed => None,
        }
    }

    pub fn carousel_mut(&mut self) -> Option<&mut PhotoCarousel> {
        match &mut self.state {
            PanelState::Open { carousel, .. } => Some(carousel),
            PanelState::Closed => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            PanelState::Open { error, .. } => error.as_deref(),
            PanelState::Closed => None,
        }
    }

    pub fn is_confirming_delete(&self) -> bool {
        matches!(
            self.state,
            PanelState::Open {
                confirming_delete: true,
                ..
            }
        )
    }

    /// Closes the panel and hands the record over to the edit form.
    pub fn begin_edit(&mut self) -> Option<Location> {
        let location = self.location();
        self.close();
        location
    }

    /// Asks for confirmation. Returns the question to show.
    pub fn request_delete(&mut self) -> Result<&'static str, PanelError> {
        match &mut self.state {
            PanelState::Open {
                confirming_delete, ..
            } => {
                *confirming_delete = true;
                Ok(DELETE_CONFIRMATION)
            }
            PanelState::Closed => Err(PanelError::NotOpen),
        }
    }

    pub fn cancel_delete(&mut self) {
        if let PanelState::Open {
            confirming_delete, ..
        } = &mut self.state
        {
            *confirming_delete = false;
        }
    }

    #[tracing::instrument(err, skip(self), level = "info")]
    pub async fn confirm_delete(&mut self) -> Result<LocationId, PanelError> {
        let id = match &self.state {
            PanelState::Open {
                confirming_delete: true,
                id,
                ..
            } => *id,
            PanelState::Open { .. } => return Err(PanelError::NotConfirmed),
            PanelState::Closed => return Err(PanelError::NotOpen),
        };

        match self.repo.delete(id).await {
            Ok(()) => {
                self.close();
                self.store.notify_changed().await;
                Ok(id)
            }
            Err(err) => {
                let err = PanelError::Delete(err);
                if let PanelState::Open {
                    confirming_delete,
                    error,
                    ..
                } = &mut self.state
                {
                    *confirming_delete = false;
                    *error = Some(err.to_string());
                }
                Err(err)
            }
        }
    }

    /// Follows a store refresh: closes when the record is gone and restarts the
    /// carousel when its photos changed.
    pub fn sync(&mut self) {
        let Some(id) = self.location_id() else {
            return;
        };
        let Some(location) = self.store.find(id) else {
            self.close();
            return;
        };
        if let PanelState::Open { carousel, .. } = &mut self.state {
            if carousel.photos() != location.photo_urls.as_slice() {
                *carousel = PhotoCarousel::new(location.photo_urls);
            }
        }
    }
}
