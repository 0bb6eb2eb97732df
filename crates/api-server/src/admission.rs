//! Admission control and the blocking worker pool

use html2xlsx_common::{ProcessingError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, warn};
use uuid::Uuid;

type ActiveMap = HashMap<Uuid, Instant>;

fn lock(active: &Mutex<ActiveMap>) -> MutexGuard<'_, ActiveMap> {
    active.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Non-blocking ceiling on in-flight requests
#[derive(Clone)]
pub struct Admission {
    permits: Arc<Semaphore>,
    active: Arc<Mutex<ActiveMap>>,
    max_concurrent: usize,
}

impl Admission {
    #[must_use]
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent)),
            active: Arc::new(Mutex::new(HashMap::with_capacity(max_concurrent))),
            max_concurrent,
        }
    }

    /// Admit a request or fail with [`ProcessingError::ServerBusy`]; never waits.
    pub fn try_admit(&self) -> Result<AdmissionGuard> {
        let permit = self.permits.clone().try_acquire_owned().map_err(|_| {
            warn!("Rejecting request: {} already active", self.max_concurrent);
            ProcessingError::ServerBusy
        })?;

        let id = Uuid::new_v4();
        let active_count = {
            let mut active = lock(&self.active);
            active.insert(id, Instant::now());
            active.len()
        };
        info!("Admitted request {} (active requests: {})", id, active_count);

        Ok(AdmissionGuard {
            id,
            active: Arc::clone(&self.active),
            _permit: permit,
        })
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        lock(&self.active).len()
    }

    #[must_use]
    pub const fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    #[must_use]
    pub fn available_slots(&self) -> usize {
        self.max_concurrent.saturating_sub(self.active_count())
    }

    /// Active share of the ceiling, in percent rounded to one decimal
    #[must_use]
    pub fn load_percentage(&self) -> f64 {
        if self.max_concurrent == 0 {
            return 100.0;
        }
        let load = self.active_count() as f64 / self.max_concurrent as f64 * 100.0;
        (load * 10.0).round() / 10.0
    }
}

/// Holds an admission slot until dropped
pub struct AdmissionGuard {
    id: Uuid,
    active: Arc<Mutex<ActiveMap>>,
    _permit: OwnedSemaphorePermit,
}

impl AdmissionGuard {
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }
}

impl Drop for AdmissionGuard {
    fn drop(&mut self) {
        let mut active = lock(&self.active);
        if let Some(started) = active.remove(&self.id) {
            info!(
                "Request {} finished after {:.2}s (active requests: {})",
                self.id,
                started.elapsed().as_secs_f64(),
                active.len()
            );
        }
    }
}

/// Fixed-size pool of blocking workers
#[derive(Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Idle workers
    #[must_use]
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Wait for a free worker, then run `job` on the blocking pool.
    ///
    /// The worker stays taken until `job` returns, even if the caller stops
    /// waiting for it.
    pub async fn run<T, F>(&self, job: F) -> Result<T>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|e| ProcessingError::Other(format!("Worker pool closed: {e}")))?;
        debug!("Worker acquired ({} idle)", self.permits.available_permits());

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        })
        .await
        .map_err(|e| ProcessingError::Other(format!("Worker failed: {e}")))?
    }
}
