use crate::headless_map::HeadlessMap;
use crate::session::ConfiguredSession;
use location_searcher::Searcher;
use map_export::ExportOptions;
use postgrest::Repository;
use std::sync::Arc;
use use_cases::dashboard::{Collaborators, Dashboard};

pub struct Application {
    pub dashboard: Dashboard,
}

impl Application {
    /// Builds every adapter from configuration.
    pub fn new() -> anyhow::Result<Self> {
        let repository = Arc::new(Repository::new()?);
        let collaborators = Collaborators {
            repo: repository.clone(),
            storage: repository,
            geocoder: Arc::new(Searcher::new()?),
            session: Arc::new(ConfiguredSession::new()?),
        };
        // snapshots only see markers, which carry no photo counts
        let map = HeadlessMap::new(ExportOptions {
            show_stats: false,
            ..ExportOptions::default()
        });

        Ok(Application {
            dashboard: Dashboard::new(collaborators, Box::new(map)),
        })
    }
}
