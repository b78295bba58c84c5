use crate::error::VoiceError;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Default number of decode jobs allowed to run at once.
pub const DEFAULT_DECODE_WORKERS: usize = 2;

/// Bounded offload of blocking decode work.
///
/// Each job holds a permit for its whole run on tokio's blocking thread pool,
/// so at most `workers` decodes are in flight. Callers await the job like any
/// other future and the async side never blocks.
#[derive(Debug, Clone)]
pub struct DecodePool {
    permits: Arc<Semaphore>,
    workers: usize,
}

impl DecodePool {
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            permits: Arc::new(Semaphore::new(workers)),
            workers,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Runs `job` on the blocking pool once a permit is free.
    pub async fn run<F, T>(&self, job: F) -> Result<T, VoiceError>
    where
        F: FnOnce() -> Result<T, VoiceError> + Send + 'static,
        T: Send + 'static,
    {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| VoiceError::DecodeFailed("decode pool is shut down".to_string()))?;

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        })
        .await
        .map_err(|e| VoiceError::DecodeFailed(format!("decode task join error: {}", e)))?
    }
}

impl Default for DecodePool {
    fn default() -> Self {
        Self::new(DEFAULT_DECODE_WORKERS)
    }
}
