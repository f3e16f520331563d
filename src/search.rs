use std::{convert::identity, sync::Arc, time::Duration};

use log::{debug, info, warn};
use tokio::{task::JoinHandle, task::JoinSet, time::timeout};

use crate::{
    map::{Icon, InfoPanel, MapView, MarkerId, MarkerOptions},
    places::{
        FailureReason, NearbyRequest, PlaceDetail, PlaceSummary, PlacesError, PlacesService,
        StatusCode, DETAIL_FIELDS,
    },
    state::{AppState, Epoch, Store, TrackedMarker},
};

/// Drops unrated places and orders the rest by rating, highest first.
/// Equal ratings keep the provider's order.
pub fn rank(places: Vec<PlaceSummary>) -> Vec<PlaceSummary> {
    let mut rated = places
        .into_iter()
        .filter(|p| p.rating.is_some())
        .collect::<Vec<_>>();
    rated.sort_by(|a, b| {
        let a = a.rating.unwrap_or_default();
        let b = b.rating.unwrap_or_default();
        b.total_cmp(&a)
    });
    rated
}

/// A search in flight. Awaiting it waits for the nearby search and every
/// details fetch it spawned.
pub struct SearchHandle {
    epoch: Epoch,
    task: JoinHandle<()>,
}

impl SearchHandle {
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub async fn settled(self) {
        if let Err(err) = self.task.await {
            warn!("Search task for {:?} failed: {}", self.epoch, err);
        }
    }
}

#[derive(Clone)]
struct Context {
    places: Arc<dyn PlacesService>,
    store: Store,
    details_timeout: Duration,
}

pub struct SearchOrchestrator {
    ctx: Context,
    radius: u32,
    search_timeout: Duration,
}

impl SearchOrchestrator {
    pub fn new(
        places: Arc<dyn PlacesService>,
        store: Store,
        radius: u32,
        search_timeout: Duration,
        details_timeout: Duration,
    ) -> SearchOrchestrator {
        SearchOrchestrator {
            ctx: Context {
                places,
                store,
                details_timeout,
            },
            radius,
            search_timeout,
        }
    }

    /// Removes the tracked markers and starts a new epoch. Completions from
    /// earlier epochs are ignored from here on.
    pub fn clear(&self) -> Epoch {
        self.ctx.store.update(clear_results)
    }

    /// Replaces the current results with a search around the visible map
    /// center. Returns `None` while no map is mounted.
    pub fn search(&self) -> Option<SearchHandle> {
        let (epoch, view, keyword) = self.ctx.store.update(|state| {
            let epoch = clear_results(state);
            let view = state.map.clone()?;
            state.info_panel = Some(InfoPanel::new(&view));
            Some((epoch, view, state.keyword.clone()))
        })?;

        let request = NearbyRequest {
            location: view.center(),
            radius: self.radius,
            keyword,
        };
        info!(
            "Searching {:?} within {}m of {} ({:?})",
            request.keyword, request.radius, request.location, epoch
        );

        let task = tokio::spawn(run(
            self.ctx.clone(),
            epoch,
            view,
            request,
            self.search_timeout,
        ));
        Some(SearchHandle { epoch, task })
    }
}

fn clear_results(state: &mut AppState) -> Epoch {
    if let Some(panel) = state.info_panel.take() {
        panel.close();
    }
    if let Some(view) = &state.map {
        for marker in state.markers.iter() {
            view.remove_marker(marker.id);
        }
    }
    state.markers = Arc::from(Vec::new());
    state.places = Arc::from(Vec::new());
    state.epoch = state.epoch.next();
    state.epoch
}

async fn run(
    ctx: Context,
    epoch: Epoch,
    view: MapView,
    request: NearbyRequest,
    search_timeout: Duration,
) {
    let result = timeout(search_timeout, ctx.places.nearby_search(&request))
        .await
        .map_err(|_| PlacesError::Search(FailureReason::Timeout))
        .and_then(identity);

    let places = match result {
        Ok(places) => rank(places),
        Err(PlacesError::Search(FailureReason::Status(StatusCode::ZeroResults))) => {
            info!("No places found for {:?}", request.keyword);
            return;
        }
        Err(err) => {
            warn!("{} for {:?}, leaving results empty", err, request.keyword);
            return;
        }
    };

    let tracked = ctx.store.update(|state| {
        if state.epoch != epoch {
            return None;
        }
        let tracked = places
            .iter()
            .map(|place| {
                let id = view.add_marker(MarkerOptions {
                    position: place.location,
                    title: place.name.clone(),
                    icon: Icon::Default,
                });
                TrackedMarker::pending(id, place.clone())
            })
            .collect::<Vec<_>>();
        state.places = Arc::from(places);
        state.markers = Arc::from(tracked.clone());
        Some(tracked)
    });
    let Some(tracked) = tracked else {
        debug!("Discarding search results of superseded {:?}", epoch);
        return;
    };

    let mut set = JoinSet::new();
    for (index, marker) in tracked.into_iter().enumerate() {
        set.spawn(fetch_details(
            ctx.clone(),
            epoch,
            view.clone(),
            index,
            marker,
        ));
    }
    while let Some(joined) = set.join_next().await {
        if let Err(err) = joined {
            warn!("Details task failed: {}", err);
        }
    }
}

async fn fetch_details(
    ctx: Context,
    epoch: Epoch,
    view: MapView,
    index: usize,
    marker: TrackedMarker,
) {
    let place = &marker.summary;
    let result = timeout(
        ctx.details_timeout,
        ctx.places.details(&place.id, &DETAIL_FIELDS),
    )
    .await
    .map_err(|_| PlacesError::Details(FailureReason::Timeout))
    .and_then(identity);

    match result {
        Ok(detail) => {
            if !apply_details(&ctx.store, &view, epoch, index, marker.id, detail) {
                debug!("Dropping details of {} from superseded {:?}", place.id, epoch);
            }
        }
        Err(err) => {
            warn!("{} for {}, marker stays without content", err, place.id);
        }
    }
}

/// Upgrades the marker at `index` if it is still the one this fetch was
/// issued for.
fn apply_details(
    store: &Store,
    view: &MapView,
    epoch: Epoch,
    index: usize,
    marker: MarkerId,
    detail: PlaceDetail,
) -> bool {
    store.update(|state| {
        if state.epoch != epoch {
            return false;
        }
        let Some(tracked) = state.markers.get(index).filter(|m| m.id == marker) else {
            return false;
        };
        view.set_icon(marker, Icon::for_open_now(detail.is_open_now()));
        let upgraded = tracked.ready(detail);
        let mut markers = state.markers.to_vec();
        markers[index] = upgraded;
        state.markers = Arc::from(markers);
        true
    })
}
