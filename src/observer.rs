//! Diagnostic observers for resolution events.
//!
//! Observers are told when a dependency starts resolving, when it finishes and
//! how long it took, and when resolution fails. The engine itself also emits
//! `tracing` events; [`LoggingObserver`] is a ready-made observer that forwards
//! these hooks to `tracing` at `info`/`warn` level.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::DiError;

/// Observer trait for resolution events.
///
/// Hooks run synchronously inside `Container::get`; keep them cheap. Cache
/// hits are not reported, only actual resolutions.
///
/// # Examples
///
/// ```
/// use ferrous_injector::{Container, ResolutionObserver, Resolver, DiError};
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Recorder {
///     events: Mutex<Vec<String>>,
/// }
///
/// impl ResolutionObserver for Recorder {
///     fn resolving(&self, name: &str) {
///         self.events.lock().unwrap().push(format!("start {}", name));
///     }
///
///     fn resolved(&self, name: &str, _duration: Duration) {
///         self.events.lock().unwrap().push(format!("done {}", name));
///     }
/// }
///
/// let recorder = Arc::new(Recorder::default());
/// let container = Container::builder().observer(recorder.clone()).build();
/// container.register("answer").unwrap().as_constant(42i32).unwrap();
///
/// container.get_required("answer").unwrap();
/// container.get_required("answer").unwrap(); // cached, not observed
///
/// assert_eq!(*recorder.events.lock().unwrap(), ["start answer", "done answer"]);
/// ```
pub trait ResolutionObserver: Send + Sync {
    /// Called after the name entered the resolving-set, before its strategy runs.
    fn resolving(&self, name: &str);

    /// Called after the strategy produced a value, before it is cached.
    fn resolved(&self, name: &str, duration: Duration);

    /// Called when the strategy, or anything it depends on, failed.
    fn failed(&self, name: &str, error: &DiError) {
        let _ = (name, error);
    }
}

/// Collection of observers notified in registration order.
#[derive(Clone, Default)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn ResolutionObserver>>,
}

impl Observers {
    pub(crate) fn add(&mut self, observer: Arc<dyn ResolutionObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    pub(crate) fn resolving(&self, name: &str) {
        for observer in &self.observers {
            observer.resolving(name);
        }
    }

    pub(crate) fn resolved(&self, name: &str, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(name, duration);
        }
    }

    pub(crate) fn failed(&self, name: &str, error: &DiError) {
        for observer in &self.observers {
            observer.failed(name, error);
        }
    }
}

/// Observer that reports resolution events through `tracing`.
///
/// ```
/// use ferrous_injector::{Container, LoggingObserver};
/// use std::sync::Arc;
///
/// let container = Container::builder()
///     .observer(Arc::new(LoggingObserver::with_prefix("[app]")))
///     .build();
/// # let _ = container;
/// ```
#[derive(Debug, Clone)]
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    /// Creates a logging observer with the default prefix.
    pub fn new() -> Self {
        Self {
            prefix: "[ferrous-injector]".to_string(),
        }
    }

    /// Creates a logging observer with a custom prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    /// The prefix attached to every event.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolutionObserver for LoggingObserver {
    fn resolving(&self, name: &str) {
        info!(prefix = %self.prefix, dependency = name, "resolving");
    }

    fn resolved(&self, name: &str, duration: Duration) {
        info!(prefix = %self.prefix, dependency = name, ?duration, "resolved");
    }

    fn failed(&self, name: &str, error: &DiError) {
        warn!(prefix = %self.prefix, dependency = name, %error, "resolution failed");
    }
}
