use log::debug;

use crate::{
    map::MarkerId,
    state::{AppState, Store, TrackedMarker},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Opened(MarkerId),
    Ignored,
}

/// Routes list and marker selections to the shared info panel.
pub struct SelectionBridge {
    store: Store,
}

impl SelectionBridge {
    pub fn new(store: Store) -> SelectionBridge {
        SelectionBridge { store }
    }

    /// Selects the `index`-th listed place and collapses the list.
    pub fn select_by_index(&self, index: usize) -> Selection {
        self.store.update(|state| {
            let selection = match state.markers.get(index) {
                Some(tracked) => show(&*state, tracked),
                None => Selection::Ignored,
            };
            if let Selection::Opened(_) = selection {
                state.list_visible = false;
            }
            selection
        })
    }

    pub fn select_by_marker_click(&self, marker: MarkerId) -> Selection {
        self.store
            .update(|state| match state.markers.iter().find(|m| m.id == marker) {
                Some(tracked) => show(&*state, tracked),
                None => Selection::Ignored,
            })
    }

    /// Shows or hides the list panel, returning the new visibility.
    pub fn toggle_list(&self) -> bool {
        self.store.update(|state| {
            state.list_visible = !state.list_visible;
            state.list_visible
        })
    }
}

fn show(state: &AppState, tracked: &TrackedMarker) -> Selection {
    let Some(content) = tracked.content() else {
        debug!("{} has no details yet, ignoring selection", tracked.summary.id);
        return Selection::Ignored;
    };
    let (Some(view), Some(panel)) = (&state.map, &state.info_panel) else {
        return Selection::Ignored;
    };
    let Some(marker) = view.marker(tracked.id) else {
        return Selection::Ignored;
    };

    view.pan_to(marker.position);
    panel.set_content(content);
    if panel.open(tracked.id) {
        Selection::Opened(tracked.id)
    } else {
        Selection::Ignored
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use crate::{
        map::{LatLng, MapSurface, MapView},
        places::StatusCode,
        search::SearchOrchestrator,
        testing::{detail, summary, FakePlaces},
    };

    use super::*;

    async fn searched() -> (Store, MapView, SelectionBridge) {
        let places = Arc::new(FakePlaces::default());
        places.nearby(
            "ramen",
            vec![summary("a", Some(4.5)), summary("b", Some(4.0))],
        );
        places.detail("a", detail("a", Some(true)));
        places.details_failure("b", StatusCode::UnknownError);
        let store = Store::new("ramen");
        let view = MapSurface::new("map").mount(LatLng::new(35.0, 139.0), 15);
        store.update(|state| state.map = Some(view.clone()));
        let orchestrator = SearchOrchestrator::new(
            places,
            store.clone(),
            5000,
            Duration::from_millis(500),
            Duration::from_millis(500),
        );
        orchestrator.search().unwrap().settled().await;
        (store.clone(), view, SelectionBridge::new(store))
    }

    #[tokio::test]
    async fn list_selection_pans_opens_and_collapses() {
        let (store, view, bridge) = searched().await;
        assert!(bridge.toggle_list());
        let target = store.snapshot().markers[0].clone();

        let selection = bridge.select_by_index(0);

        assert_eq!(selection, Selection::Opened(target.id));
        assert_eq!(view.center(), target.summary.location);
        let window = view.info_window().unwrap();
        assert_eq!(window.anchor, target.id);
        assert_eq!(Some(window.content.as_str()), target.content());
        assert!(!store.snapshot().list_visible);
    }

    #[tokio::test]
    async fn marker_click_opens_without_touching_the_list() {
        let (store, view, bridge) = searched().await;
        bridge.toggle_list();
        let target = store.snapshot().markers[0].clone();

        assert_eq!(
            bridge.select_by_marker_click(target.id),
            Selection::Opened(target.id)
        );
        assert_eq!(view.center(), target.summary.location);
        assert_eq!(
            view.info_window().map(|w| w.content),
            target.content().map(str::to_owned)
        );
        assert!(store.snapshot().list_visible);
    }

    #[tokio::test]
    async fn selecting_a_place_without_details_changes_nothing() {
        let (store, view, bridge) = searched().await;
        bridge.toggle_list();
        let inert = store.snapshot().markers[1].id;
        let center = view.center();

        assert_eq!(bridge.select_by_index(1), Selection::Ignored);
        assert_eq!(bridge.select_by_marker_click(inert), Selection::Ignored);
        assert_eq!(bridge.select_by_index(7), Selection::Ignored);

        assert_eq!(view.center(), center);
        assert_eq!(view.info_window(), None);
        assert!(store.snapshot().list_visible);
    }

    #[tokio::test]
    async fn list_toggles_independently() {
        let store = Store::new("golf");
        let bridge = SelectionBridge::new(store.clone());
        assert!(!store.snapshot().list_visible);
        assert!(bridge.toggle_list());
        assert!(!bridge.toggle_list());
    }
}
