use std::sync::{Arc, Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::api::ApiClient;

/// What a view renders from one authenticated read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchState<T> {
    pub data: T,
    pub loading: bool,
    pub error: Option<String>,
}

struct Slot<T> {
    state: FetchState<T>,
    url: Option<String>,
    generation: u64,
}

/// Data-fetch hook: one GET per URL change, results of superseded URLs are
/// dropped. No retries.
pub struct FetchHandle<T> {
    api: ApiClient,
    slot: Arc<Mutex<Slot<T>>>,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

impl<T> FetchHandle<T>
where T: DeserializeOwned + Default + Clone + Send + 'static {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            slot: Arc::new(Mutex::new(Slot {
                state: FetchState::default(),
                url: None,
                generation: 0,
            })),
            in_flight: Mutex::new(Vec::new()),
        }
    }

    /// Point the hook at `url`. Same URL as the current one is a no-op.
    pub fn fetch(&self, url: &str) {
        if lock(&self.slot).url.as_deref() == Some(url) {
            return;
        }
        self.start(url.to_string());
    }

    /// Re-run the current URL, if any.
    pub fn reload(&self) {
        let url = lock(&self.slot).url.clone();
        if let Some(url) = url {
            self.start(url);
        }
    }

    fn start(&self, url: String) {
        let generation = {
            let mut slot = lock(&self.slot);
            slot.generation += 1;
            slot.url = Some(url.clone());
            slot.state.loading = true;
            slot.state.error = None;
            slot.generation
        };

        let api = self.api.clone();
        let shared = Arc::clone(&self.slot);
        let handle = tokio::spawn(async move {
            let result = api.get_data::<T>(&url).await;

            let mut slot = lock(&shared);
            if slot.generation != generation {
                debug!("Discarding stale response for {}", url);
                return;
            }
            slot.state.loading = false;
            match result {
                Ok(data) => slot.state.data = data,
                Err(err) => slot.state.error = Some(err.to_string()),
            }
        });

        let mut in_flight = lock(&self.in_flight);
        in_flight.retain(|task| !task.is_finished());
        in_flight.push(handle);
    }

    pub fn state(&self) -> FetchState<T> {
        lock(&self.slot).state.clone()
    }

    /// Requests started and not yet finished or awaited.
    pub fn pending_tasks(&self) -> usize {
        lock(&self.in_flight).len()
    }

    pub fn url(&self) -> Option<String> {
        lock(&self.slot).url.clone()
    }

    /// Wait until every request started so far has finished.
    pub async fn settled(&self) {
        let handles = std::mem::take(&mut *lock(&self.in_flight));
        futures::future::join_all(handles).await;
    }
}

fn lock<S>(mutex: &Mutex<S>) -> MutexGuard<'_, S> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
