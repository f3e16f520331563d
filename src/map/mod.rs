use std::{
    collections::BTreeMap,
    fmt,
    num::ParseIntError,
    str::FromStr,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard,
    },
};

use log::debug;

pub use info_panel::{InfoPanel, PanelId};

mod info_panel;

static NEXT_VIEW_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_MARKER_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> LatLng {
        LatLng { lat, lng }
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(u64);

impl MarkerId {
    fn next() -> MarkerId {
        MarkerId(NEXT_MARKER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MarkerId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim_start_matches('#').parse().map(MarkerId)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    /// Provider default pin, used until a place's details arrive.
    Default,
    CurrentLocation,
    Open,
    Closed,
}

impl Icon {
    pub fn for_open_now(open: bool) -> Icon {
        if open {
            Icon::Open
        } else {
            Icon::Closed
        }
    }

    pub fn url(&self) -> Option<&'static str> {
        match self {
            Icon::Default => None,
            Icon::CurrentLocation => Some("http://maps.google.com/mapfiles/ms/icons/blue-dot.png"),
            Icon::Open => Some("http://maps.google.com/mapfiles/ms/icons/green-dot.png"),
            Icon::Closed => Some("http://maps.google.com/mapfiles/ms/icons/red-dot.png"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MarkerOptions {
    pub position: LatLng,
    pub title: String,
    pub icon: Icon,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: MarkerId,
    pub position: LatLng,
    pub title: String,
    pub icon: Icon,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfoWindow {
    pub panel: PanelId,
    pub anchor: MarkerId,
    pub content: String,
}

struct ViewState {
    center: LatLng,
    zoom: u8,
    markers: BTreeMap<MarkerId, Marker>,
    info_window: Option<InfoWindow>,
    attached: bool,
}

/// Handle to one rendered map. Clones share the same view.
#[derive(Clone)]
pub struct MapView {
    id: ViewId,
    state: Arc<Mutex<ViewState>>,
}

impl MapView {
    fn new(center: LatLng, zoom: u8) -> MapView {
        MapView {
            id: ViewId(NEXT_VIEW_ID.fetch_add(1, Ordering::Relaxed)),
            state: Arc::new(Mutex::new(ViewState {
                center,
                zoom,
                markers: BTreeMap::new(),
                info_window: None,
                attached: true,
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn center(&self) -> LatLng {
        self.state().center
    }

    pub fn zoom(&self) -> u8 {
        self.state().zoom
    }

    pub fn pan_to(&self, position: LatLng) {
        self.state().center = position;
    }

    pub fn is_attached(&self) -> bool {
        self.state().attached
    }

    pub fn add_marker(&self, options: MarkerOptions) -> MarkerId {
        let id = MarkerId::next();
        self.state().markers.insert(
            id,
            Marker {
                id,
                position: options.position,
                title: options.title,
                icon: options.icon,
            },
        );
        id
    }

    pub fn set_icon(&self, id: MarkerId, icon: Icon) -> bool {
        match self.state().markers.get_mut(&id) {
            Some(marker) => {
                marker.icon = icon;
                true
            }
            None => false,
        }
    }

    pub fn set_position(&self, id: MarkerId, position: LatLng) -> bool {
        match self.state().markers.get_mut(&id) {
            Some(marker) => {
                marker.position = position;
                true
            }
            None => false,
        }
    }

    /// Removing a marker also closes an info window anchored to it.
    pub fn remove_marker(&self, id: MarkerId) -> bool {
        let mut state = self.state();
        if state.info_window.as_ref().map(|w| w.anchor) == Some(id) {
            state.info_window = None;
        }
        state.markers.remove(&id).is_some()
    }

    pub fn marker(&self, id: MarkerId) -> Option<Marker> {
        self.state().markers.get(&id).cloned()
    }

    pub fn markers(&self) -> Vec<Marker> {
        self.state().markers.values().cloned().collect()
    }

    pub fn info_window(&self) -> Option<InfoWindow> {
        self.state().info_window.clone()
    }

    fn show_info_window(&self, window: InfoWindow) -> bool {
        let mut state = self.state();
        if !state.markers.contains_key(&window.anchor) {
            return false;
        }
        state.info_window = Some(window);
        true
    }

    fn hide_info_window(&self, panel: PanelId) {
        let mut state = self.state();
        if state.info_window.as_ref().map(|w| w.panel) == Some(panel) {
            state.info_window = None;
        }
    }

    fn detach(&self) {
        let mut state = self.state();
        state.markers.clear();
        state.info_window = None;
        state.attached = false;
    }
}

impl PartialEq for MapView {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for MapView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapView").field("id", &self.id).finish()
    }
}

/// Mount point for map views. At most one view is mounted at a time.
#[derive(Clone)]
pub struct MapSurface {
    name: String,
    mounted: Arc<Mutex<Option<MapView>>>,
}

impl MapSurface {
    pub fn new(name: &str) -> MapSurface {
        MapSurface {
            name: name.to_owned(),
            mounted: Arc::new(Mutex::new(None)),
        }
    }

    pub fn mount(&self, center: LatLng, zoom: u8) -> MapView {
        let view = MapView::new(center, zoom);
        let previous = self
            .mounted
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(view.clone());
        if let Some(previous) = previous {
            debug!("{}: replacing view {:?}", self.name, previous.id());
            previous.detach();
        }
        view
    }

    #[cfg(test)]
    pub fn current(&self) -> Option<MapView> {
        self.mounted
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pin(view: &MapView, title: &str) -> MarkerId {
        view.add_marker(MarkerOptions {
            position: LatLng::new(35.0, 139.0),
            title: title.to_owned(),
            icon: Icon::Default,
        })
    }

    #[test]
    fn mounting_detaches_and_clears_the_previous_view() {
        let surface = MapSurface::new("map");
        let first = surface.mount(LatLng::new(35.0, 139.0), 15);
        pin(&first, "a");

        let second = surface.mount(LatLng::new(34.0, 135.0), 15);

        assert!(!first.is_attached());
        assert!(first.markers().is_empty());
        assert!(second.is_attached());
        assert_eq!(surface.current(), Some(second));
    }

    #[test]
    fn removing_the_anchor_closes_the_info_window() {
        let surface = MapSurface::new("map");
        let view = surface.mount(LatLng::new(35.0, 139.0), 15);
        let id = pin(&view, "a");
        let panel = InfoPanel::new(&view);
        panel.set_content("a");
        assert!(panel.open(id));

        assert!(view.remove_marker(id));
        assert_eq!(view.info_window(), None);
        assert!(!view.set_icon(id, Icon::Open));
    }

    #[test]
    fn markers_can_be_repositioned_and_restyled() {
        let view = MapSurface::new("map").mount(LatLng::new(35.0, 139.0), 15);
        let id = pin(&view, "a");

        assert!(view.set_position(id, LatLng::new(36.0, 140.0)));
        assert!(view.set_icon(id, Icon::Closed));

        let marker = view.marker(id).unwrap();
        assert_eq!(marker.position, LatLng::new(36.0, 140.0));
        assert_eq!(marker.icon, Icon::Closed);
        assert_eq!(Icon::Closed.url(), Some("http://maps.google.com/mapfiles/ms/icons/red-dot.png"));
        assert_eq!(Icon::Default.url(), None);
    }

    #[test]
    fn marker_ids_parse_with_or_without_hash() {
        let surface = MapSurface::new("map");
        let view = surface.mount(LatLng::new(0.0, 0.0), 15);
        let id = pin(&view, "a");
        assert_eq!(id.to_string().parse::<MarkerId>(), Ok(id));
        assert_eq!(format!("#{id}").parse::<MarkerId>(), Ok(id));
    }
}
