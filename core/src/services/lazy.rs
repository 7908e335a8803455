use crate::error::Result;
use log::info;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

type Factory<T> = Box<dyn Fn() -> Result<Arc<T>> + Send + Sync>;

/// Service handle created on first use
///
/// Concurrent first callers are serialized so the factory runs at most
/// once per successful initialization; a failed initialization is
/// retried on the next call.
///
/// # Example
///
/// ```
/// use medimage_core::services::{mock::EchoTranslator, LazyService, Translator};
/// use std::sync::Arc;
///
/// let handle: LazyService<dyn Translator> = LazyService::new("translator", || {
///     Ok(Arc::new(EchoTranslator::new("ar")) as Arc<dyn Translator>)
/// });
/// assert!(!handle.is_initialized());
///
/// let translator = handle.get().unwrap();
/// assert_eq!(translator.translate("hello").unwrap(), "[ar] hello");
/// assert!(handle.is_initialized());
/// ```
pub struct LazyService<T: ?Sized> {
    name: &'static str,
    cell: OnceLock<Arc<T>>,
    init: Mutex<()>,
    factory: Factory<T>,
}

impl<T: ?Sized> LazyService<T> {
    pub fn new<F>(name: &'static str, factory: F) -> Self
    where
        F: Fn() -> Result<Arc<T>> + Send + Sync + 'static,
    {
        Self {
            name,
            cell: OnceLock::new(),
            init: Mutex::new(()),
            factory: Box::new(factory),
        }
    }

    /// Handle wrapping an already-built service
    pub fn ready(name: &'static str, service: Arc<T>) -> Self
    where
        T: Send + Sync + 'static,
    {
        let cell = OnceLock::new();
        let _ = cell.set(service.clone());
        Self {
            name,
            cell,
            init: Mutex::new(()),
            factory: Box::new(move || Ok(service.clone())),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Returns the service, initializing it if needed
    pub fn get(&self) -> Result<Arc<T>> {
        if let Some(service) = self.cell.get() {
            return Ok(service.clone());
        }
        // the guard holds no data, so a poisoned lock is still usable
        let _guard = self.init.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(service) = self.cell.get() {
            return Ok(service.clone());
        }
        info!("Initializing {} service", self.name);
        let service = (self.factory)()?;
        Ok(self.cell.get_or_init(|| service).clone())
    }
}

impl<T: ?Sized> fmt::Debug for LazyService<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyService")
            .field("name", &self.name)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MedImageError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_factory_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handle: LazyService<String> = LazyService::new("counter", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new("ready".to_string()))
        });

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(handle.get().unwrap().as_str(), "ready");
        assert_eq!(handle.get().unwrap().as_str(), "ready");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_first_use_initializes_once() {
        const THREADS: usize = 4;
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handle: Arc<LazyService<usize>> = Arc::new(LazyService::new("slow", move || {
            thread::sleep(Duration::from_millis(50));
            Ok(Arc::new(counter.fetch_add(1, Ordering::SeqCst)))
        }));
        let barrier = Arc::new(Barrier::new(THREADS));

        let workers: Vec<_> = (0..THREADS)
            .map(|_| {
                let handle = handle.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    *handle.get().unwrap()
                })
            })
            .collect();
        let seen: Vec<usize> = workers.into_iter().map(|w| w.join().unwrap()).collect();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(seen.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_failed_init_is_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handle: LazyService<u32> = LazyService::new("flaky", move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(MedImageError::Service("model download failed".to_string()))
            } else {
                Ok(Arc::new(7))
            }
        });

        assert!(handle.get().is_err());
        assert!(!handle.is_initialized());
        assert_eq!(*handle.get().unwrap(), 7);
        assert!(handle.is_initialized());
    }

    #[test]
    fn test_ready_handle() {
        let handle = LazyService::ready("fixed", Arc::new(3_u8));
        assert!(handle.is_initialized());
        assert_eq!(handle.name(), "fixed");
        assert_eq!(*handle.get().unwrap(), 3);
        assert_eq!(
            format!("{:?}", handle),
            "LazyService { name: \"fixed\", initialized: true }"
        );
    }
}
