use std::sync::{Arc, Mutex};

use crate::{
    location::CurrentLocationMarker,
    map::{InfoPanel, MapView, MarkerId},
    places::{PlaceDetail, PlaceSummary},
};

/// Tag identifying one search generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Epoch(u64);

impl Epoch {
    pub fn next(self) -> Epoch {
        Epoch(self.0 + 1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MarkerStage {
    Pending,
    Ready { detail: PlaceDetail, content: String },
}

/// A search-result marker, index-aligned with `AppState::places`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedMarker {
    pub id: MarkerId,
    pub summary: PlaceSummary,
    pub stage: MarkerStage,
}

impl TrackedMarker {
    pub fn pending(id: MarkerId, summary: PlaceSummary) -> TrackedMarker {
        TrackedMarker {
            id,
            summary,
            stage: MarkerStage::Pending,
        }
    }

    pub fn ready(&self, detail: PlaceDetail) -> TrackedMarker {
        let content = detail.render();
        TrackedMarker {
            id: self.id,
            summary: self.summary.clone(),
            stage: MarkerStage::Ready { detail, content },
        }
    }

    pub fn content(&self) -> Option<&str> {
        match &self.stage {
            MarkerStage::Pending => None,
            MarkerStage::Ready { content, .. } => Some(content),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub map: Option<MapView>,
    pub current_location: Option<CurrentLocationMarker>,
    pub keyword: String,
    pub epoch: Epoch,
    pub places: Arc<[PlaceSummary]>,
    pub markers: Arc<[TrackedMarker]>,
    pub info_panel: Option<InfoPanel>,
    pub list_visible: bool,
}

impl AppState {
    fn new(keyword: &str) -> AppState {
        AppState {
            map: None,
            current_location: None,
            keyword: keyword.to_owned(),
            epoch: Epoch::default(),
            places: Arc::from(Vec::new()),
            markers: Arc::from(Vec::new()),
            info_panel: None,
            list_visible: false,
        }
    }
}

/// Snapshot container shared by the acquirer, orchestrator and selection
/// bridge. Every update replaces the stored snapshot.
#[derive(Clone)]
pub struct Store {
    current: Arc<Mutex<Arc<AppState>>>,
}

impl Store {
    pub fn new(keyword: &str) -> Store {
        Store {
            current: Arc::new(Mutex::new(Arc::new(AppState::new(keyword)))),
        }
    }

    pub fn snapshot(&self) -> Arc<AppState> {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Applies `f` to a copy of the current state and stores the copy.
    /// The lock is held throughout, so `f` observes and replaces the state
    /// atomically with respect to other updates.
    pub fn update<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut AppState) -> R,
    {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        let mut next = AppState::clone(&current);
        let result = f(&mut next);
        *current = Arc::new(next);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn updates_replace_the_snapshot() {
        let store = Store::new("golf");
        let before = store.snapshot();

        store.update(|state| state.keyword = "ramen".to_owned());

        assert_eq!(before.keyword, "golf");
        assert_eq!(store.snapshot().keyword, "ramen");
    }

    #[test]
    fn epochs_increase() {
        let first = Epoch::default();
        assert!(first.next() > first);
        assert_eq!(first.next(), Epoch::default().next());
    }
}
