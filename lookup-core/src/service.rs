use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::api::{ApiError, WeatherApi};
use crate::model::{LookupOutcome, LookupState, SearchQuery, WeatherReport};

/// Two-hop weather lookup with observable state.
///
/// One `fetch_weather` call geocodes the query, fetches current weather for
/// the first match and stores the validated report. Observers poll the state
/// snapshot; no error ever propagates out of `fetch_weather`.
///
/// Overlapping calls are allowed: each call claims a generation token and
/// only the call holding the latest token may write state. An overtaken call
/// resolves as [`LookupOutcome::Superseded`] without touching anything, so a
/// slow response can never clobber the result of a newer request.
#[derive(Debug)]
pub struct WeatherLookup {
    api: Arc<dyn WeatherApi>,
    state: RwLock<LookupState>,
    generation: AtomicU64,
}

impl WeatherLookup {
    pub fn new(api: impl WeatherApi + 'static) -> Self {
        Self::from_arc(Arc::new(api))
    }

    pub fn from_arc(api: Arc<dyn WeatherApi>) -> Self {
        Self {
            api,
            state: RwLock::new(LookupState::default()),
            generation: AtomicU64::new(0),
        }
    }

    /// Snapshot of the current state.
    pub async fn state(&self) -> LookupState {
        self.state.read().await.clone()
    }

    pub async fn weather(&self) -> WeatherReport {
        self.state.read().await.weather.clone()
    }

    pub async fn loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn not_found(&self) -> bool {
        self.state.read().await.not_found
    }

    /// True iff the stored report holds real data rather than the sentinel.
    pub async fn has_result(&self) -> bool {
        self.state.read().await.weather.has_data()
    }

    /// Run one lookup. Sets `loading` for the duration of the call, resets
    /// the stored report to the sentinel and clears `not_found` up front;
    /// `loading` is cleared again on every exit path.
    pub async fn fetch_weather(&self, query: SearchQuery) -> LookupOutcome {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        {
            let mut state = self.state.write().await;
            // A newer call may claim its token before we get the lock; if so
            // the state is already its to manage, including `loading`.
            if !self.is_current(token) {
                return LookupOutcome::Superseded;
            }
            state.loading = true;
            state.not_found = false;
            state.weather = WeatherReport::default();
        }

        let outcome = self.lookup(token, &query).await;

        // A stale call must not clear `loading`; the newer call owns it now.
        if !self.is_current(token) {
            return LookupOutcome::Superseded;
        }

        self.state.write().await.loading = false;
        outcome
    }

    fn is_current(&self, token: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == token
    }

    async fn lookup(&self, token: u64, query: &SearchQuery) -> LookupOutcome {
        debug!(city = %query.city, country = %query.country, "resolving coordinates");

        let coords = match self.api.geocode(query).await {
            Ok(Some(coords)) => coords,
            Ok(None) => {
                info!(city = %query.city, country = %query.country, "no geocoding match");
                if self.is_current(token) {
                    self.state.write().await.not_found = true;
                }
                return LookupOutcome::NotFound;
            }
            Err(err) => {
                warn!(error = %err, "geocoding request failed");
                return LookupOutcome::TransportFailed;
            }
        };

        debug!(lat = coords.lat, lon = coords.lon, "fetching current weather");

        let report = match self.api.current_weather(coords).await {
            Ok(report) => report,
            Err(ApiError::Decode(err)) => {
                warn!(error = %err, "weather payload failed validation");
                return LookupOutcome::ValidationFailed;
            }
            Err(err) => {
                warn!(error = %err, "weather request failed");
                return LookupOutcome::TransportFailed;
            }
        };

        if self.is_current(token) {
            let mut state = self.state.write().await;
            state.weather = report;
            state.fetched_at = Some(Utc::now());
        }

        LookupOutcome::Found
    }
}
