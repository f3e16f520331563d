use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use log::{info, warn};

use crate::{
    config::Settings,
    location::{Geolocation, LocationAcquirer},
    map::{MapSurface, MarkerId},
    places::PlacesService,
    search::{SearchHandle, SearchOrchestrator},
    selection::{Selection, SelectionBridge},
    state::{AppState, Store},
};

/// Wires the location acquirer, search orchestrator and selection bridge
/// to one state store and reacts to user events.
pub struct App {
    store: Store,
    acquirer: LocationAcquirer,
    orchestrator: SearchOrchestrator,
    selection: SelectionBridge,
    ready: AtomicBool,
}

impl App {
    pub fn new(
        settings: &Settings,
        geolocation: Arc<dyn Geolocation>,
        places: Arc<dyn PlacesService>,
        surface: MapSurface,
    ) -> App {
        let store = Store::new(&settings.default_keyword);
        App {
            acquirer: LocationAcquirer::new(
                geolocation,
                surface,
                settings.zoom,
                settings.location_timeout,
            ),
            orchestrator: SearchOrchestrator::new(
                places,
                store.clone(),
                settings.search_radius,
                settings.search_timeout,
                settings.details_timeout,
            ),
            selection: SelectionBridge::new(store.clone()),
            store,
            ready: AtomicBool::new(false),
        }
    }

    pub fn snapshot(&self) -> Arc<AppState> {
        self.store.snapshot()
    }

    /// First readiness of the map surface. Only the first call acquires.
    pub async fn on_surface_ready(&self) -> Option<SearchHandle> {
        if self.ready.swap(true, Ordering::SeqCst) {
            return None;
        }
        self.relocate().await
    }

    /// Re-acquires the location. On success the map is replaced and a new
    /// search runs on it; on failure the current map stays as it is.
    pub async fn relocate(&self) -> Option<SearchHandle> {
        let (view, current) = self.acquirer.acquire().await.ok()?;

        self.orchestrator.clear();
        self.store.update(|state| {
            if let (Some(old_view), Some(old)) = (&state.map, &state.current_location) {
                old_view.remove_marker(old.id);
            }
            state.map = Some(view);
            state.current_location = Some(current);
        });
        self.orchestrator.search()
    }

    /// Changes the keyword. Searches again only when it actually changed.
    pub fn set_keyword(&self, keyword: &str) -> Option<SearchHandle> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            warn!("Ignoring empty search keyword");
            return None;
        }
        let changed = self.store.update(|state| {
            if state.keyword == keyword {
                return false;
            }
            state.keyword = keyword.to_owned();
            true
        });
        if !changed {
            return None;
        }
        info!("Keyword changed to {:?}", keyword);
        self.orchestrator.search()
    }

    pub fn toggle_list(&self) -> bool {
        self.selection.toggle_list()
    }

    pub fn select(&self, index: usize) -> Selection {
        self.selection.select_by_index(index)
    }

    pub fn click_marker(&self, marker: MarkerId) -> Selection {
        self.selection.select_by_marker_click(marker)
    }
}
