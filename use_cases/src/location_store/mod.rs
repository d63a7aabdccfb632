use crate::session::Session;
use arc_swap::ArcSwap;
use async_trait::async_trait;
use entities::locations::{Location, LocationChanges, LocationId, NewLocation, OwnerId};
#[cfg(test)]
use mockall::automock;
use std::sync::Arc;
use thiserror::Error;

/// The structured-record collaborator holding the `locations` collection.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LocationRepo: Send + Sync {
    async fn list_for_owner(&self, owner: OwnerId) -> anyhow::Result<Vec<Location>>;

    async fn insert(&self, location: NewLocation) -> anyhow::Result<Location>;

    async fn update(&self, id: LocationId, changes: LocationChanges) -> anyhow::Result<()>;

    async fn delete(&self, id: LocationId) -> anyhow::Result<()>;
}

#[derive(Error, Debug)]
#[error("Failed to refresh locations: {0}")]
pub struct RefreshError(anyhow::Error);

pub type Snapshot = Arc<Vec<Location>>;

/// Client side copy of the signed in user's locations.
///
/// The list is only ever replaced wholesale by [`LocationStore::refresh`]; readers
/// get an immutable snapshot that stays valid while a refresh swaps in a new one.
pub struct LocationStore {
    repo: Arc<dyn LocationRepo>,
    session: Arc<dyn Session>,
    snapshot: ArcSwap<Vec<Location>>,
}

impl LocationStore {
    pub fn new(repo: Arc<dyn LocationRepo>, session: Arc<dyn Session>) -> Self {
        Self {
            repo,
            session,
            snapshot: ArcSwap::from_pointee(vec![]),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.load_full()
    }

    pub fn find(&self, id: LocationId) -> Option<Location> {
        self.snapshot
            .load()
            .iter()
            .find(|location| location.id == id)
            .cloned()
    }

    /// Re-reads every location of the current user. When the read fails the
    /// previous list is kept.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn refresh(&self) -> Result<Snapshot, RefreshError> {
        let owner = self.session.user_id();
        match self.repo.list_for_owner(owner).await {
            Ok(mut locations) => {
                sort_by_visited_date(&mut locations);
                let snapshot = Arc::new(locations);
                self.snapshot.store(snapshot.clone());
                Ok(snapshot)
            }
            Err(err) => {
                tracing::warn!(error = ?err, "Keeping the previous locations after a failed refresh");
                Err(RefreshError(err))
            }
        }
    }

    /// Called after every successful create, update or delete.
    pub async fn notify_changed(&self) {
        // refresh already logged the failure and kept the old list
        let _ = self.refresh().await;
    }
}

/// Most recent visit first, undated records last. Ties keep their order.
pub fn sort_by_visited_date(locations: &mut [Location]) {
    // `None` sorts below every date, so a descending compare puts it last.
    locations.sort_by(|a, b| b.visited_date.cmp(&a.visited_date));
}
