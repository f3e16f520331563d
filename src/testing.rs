use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::{
    location::{Coordinates, Geolocation, LocationError},
    map::LatLng,
    places::{
        DetailField, FailureReason, NearbyRequest, OpeningHours, PlaceDetail, PlaceId,
        PlaceSummary, PlacesError, PlacesService, StatusCode,
    },
};

pub fn summary(id: &str, rating: Option<f64>) -> PlaceSummary {
    PlaceSummary {
        id: PlaceId::from(id),
        name: format!("Place {id}"),
        rating,
        location: LatLng::new(35.0, 139.0 + id.bytes().map(f64::from).sum::<f64>() / 1000.0),
        vicinity: Some(format!("{id} street")),
    }
}

pub fn detail(id: &str, open_now: Option<bool>) -> PlaceDetail {
    PlaceDetail {
        name: format!("Place {id}"),
        rating: Some(4.0),
        formatted_address: Some(format!("{id} street 1")),
        opening_hours: Some(OpeningHours {
            open_now,
            weekday_text: vec!["Monday: 9:00 AM – 5:00 PM".to_owned()],
        }),
    }
}

/// Yields to spawned tasks until `condition` holds.
pub async fn wait_until<F: Fn() -> bool>(condition: F) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}

async fn pass(gate: Option<Arc<Semaphore>>) {
    if let Some(gate) = gate {
        if let Ok(permit) = gate.acquire().await {
            permit.forget();
        }
    }
}

pub struct FakeGeolocation {
    results: Mutex<VecDeque<Result<Coordinates, LocationError>>>,
    last: Mutex<Result<Coordinates, LocationError>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
    calls: AtomicUsize,
}

impl FakeGeolocation {
    fn with(result: Result<Coordinates, LocationError>) -> FakeGeolocation {
        FakeGeolocation {
            results: Mutex::new(VecDeque::new()),
            last: Mutex::new(result),
            gate: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn at(latitude: f64, longitude: f64) -> FakeGeolocation {
        FakeGeolocation::with(Ok(Coordinates {
            latitude,
            longitude,
        }))
    }

    pub fn failing(err: LocationError) -> FakeGeolocation {
        FakeGeolocation::with(Err(err))
    }

    /// Queues a result served before the default one.
    pub fn then(&self, result: Result<Coordinates, LocationError>) {
        self.results.lock().unwrap().push_back(result);
    }

    pub fn hold(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geolocation for FakeGeolocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().unwrap().clone();
        pass(gate).await;
        let queued = self.results.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| self.last.lock().unwrap().clone())
    }
}

#[derive(Default)]
pub struct FakePlaces {
    nearby: Mutex<HashMap<String, Result<Vec<PlaceSummary>, StatusCode>>>,
    details: Mutex<HashMap<PlaceId, Result<PlaceDetail, StatusCode>>>,
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
    requests: Mutex<Vec<NearbyRequest>>,
}

impl FakePlaces {
    pub fn nearby(&self, keyword: &str, places: Vec<PlaceSummary>) {
        self.nearby
            .lock()
            .unwrap()
            .insert(keyword.to_owned(), Ok(places));
    }

    pub fn nearby_failure(&self, keyword: &str, status: StatusCode) {
        self.nearby
            .lock()
            .unwrap()
            .insert(keyword.to_owned(), Err(status));
    }

    pub fn detail(&self, id: &str, detail: PlaceDetail) {
        self.details
            .lock()
            .unwrap()
            .insert(PlaceId::from(id), Ok(detail));
    }

    pub fn details_failure(&self, id: &str, status: StatusCode) {
        self.details
            .lock()
            .unwrap()
            .insert(PlaceId::from(id), Err(status));
    }

    pub fn hold_nearby(&self, keyword: &str) -> Arc<Semaphore> {
        self.hold(format!("nearby:{keyword}"))
    }

    pub fn hold_details(&self, id: &str) -> Arc<Semaphore> {
        self.hold(format!("details:{id}"))
    }

    fn hold(&self, key: String) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.gates.lock().unwrap().insert(key, gate.clone());
        gate
    }

    fn gate(&self, key: &str) -> Option<Arc<Semaphore>> {
        self.gates.lock().unwrap().get(key).cloned()
    }

    pub fn nearby_requests(&self) -> Vec<NearbyRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlacesService for FakePlaces {
    async fn nearby_search(
        &self,
        request: &NearbyRequest,
    ) -> Result<Vec<PlaceSummary>, PlacesError> {
        self.requests.lock().unwrap().push(request.clone());
        pass(self.gate(&format!("nearby:{}", request.keyword))).await;
        let result = self.nearby.lock().unwrap().get(&request.keyword).cloned();
        match result {
            Some(Ok(places)) => Ok(places),
            Some(Err(status)) => Err(PlacesError::Search(FailureReason::Status(status))),
            None => Err(PlacesError::Search(FailureReason::Status(
                StatusCode::ZeroResults,
            ))),
        }
    }

    async fn details(
        &self,
        place_id: &PlaceId,
        _fields: &[DetailField],
    ) -> Result<PlaceDetail, PlacesError> {
        pass(self.gate(&format!("details:{place_id}"))).await;
        let result = self.details.lock().unwrap().get(place_id).cloned();
        match result {
            Some(Ok(detail)) => Ok(detail),
            Some(Err(status)) => Err(PlacesError::Details(FailureReason::Status(status))),
            None => Err(PlacesError::Details(FailureReason::Status(
                StatusCode::NotFound,
            ))),
        }
    }
}
