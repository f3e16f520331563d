use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex,
};

use super::{InfoWindow, MapView, MarkerId};

static NEXT_PANEL_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PanelId(u64);

/// Shared overlay showing one place's details next to its marker.
#[derive(Clone)]
pub struct InfoPanel {
    id: PanelId,
    view: MapView,
    content: Arc<Mutex<Option<String>>>,
}

impl InfoPanel {
    pub fn new(view: &MapView) -> InfoPanel {
        InfoPanel {
            id: PanelId(NEXT_PANEL_ID.fetch_add(1, Ordering::Relaxed)),
            view: view.clone(),
            content: Arc::new(Mutex::new(None)),
        }
    }

    pub fn set_content(&self, content: &str) {
        *self.content.lock().unwrap_or_else(|e| e.into_inner()) = Some(content.to_owned());
    }

    /// Opens the panel at `anchor`. Fails when there is no content yet or
    /// the anchor is not on this panel's view.
    pub fn open(&self, anchor: MarkerId) -> bool {
        let content = self
            .content
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        match content {
            Some(content) => self.view.show_info_window(InfoWindow {
                panel: self.id,
                anchor,
                content,
            }),
            None => false,
        }
    }

    pub fn close(&self) {
        self.view.hide_info_window(self.id);
    }

    pub fn is_open(&self) -> bool {
        self.view.info_window().map(|w| w.panel) == Some(self.id)
    }
}
