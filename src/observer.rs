//! Hooks for observing lazy service construction.
//!
//! Observers are registered on the [`ContainerBuilder`](crate::ContainerBuilder)
//! and copied into every container it builds. They are notified when a
//! service starts construction, when it has been built, and when the
//! construction failed. Cached lookups do not notify.

use std::sync::Arc;
use std::time::Duration;

use crate::DiError;

/// Observer of service construction events.
///
/// Calls are made synchronously on the thread that triggered construction.
/// Keep implementations lightweight.
///
/// # Examples
///
/// ```
/// use ferrous_syringe::BuildObserver;
/// use std::sync::Mutex;
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Recorder {
///     built: Mutex<Vec<String>>,
/// }
///
/// impl BuildObserver for Recorder {
///     fn constructing(&self, _key: &str) {}
///
///     fn constructed(&self, key: &str, _duration: Duration) {
///         self.built.lock().unwrap().push(key.to_string());
///     }
/// }
///
/// let recorder = Recorder::default();
/// recorder.constructed("mailer", Duration::from_millis(1));
/// assert_eq!(recorder.built.lock().unwrap().as_slice(), ["mailer"]);
/// ```
pub trait BuildObserver: Send + Sync {
    /// Called before arguments are resolved for `key`.
    fn constructing(&self, key: &str);

    /// Called once `key` has been built and cached.
    fn constructed(&self, key: &str, duration: Duration);

    /// Called when building `key` failed. The key stays unbuilt.
    fn construction_failed(&self, key: &str, error: &DiError) {
        let _ = (key, error);
    }
}

/// Registered observers.
#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn BuildObserver>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, observer: Arc<dyn BuildObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    #[inline]
    pub(crate) fn constructing(&self, key: &str) {
        for observer in &self.observers {
            observer.constructing(key);
        }
    }

    #[inline]
    pub(crate) fn constructed(&self, key: &str, duration: Duration) {
        for observer in &self.observers {
            observer.constructed(key, duration);
        }
    }

    #[inline]
    pub(crate) fn construction_failed(&self, key: &str, error: &DiError) {
        for observer in &self.observers {
            observer.construction_failed(key, error);
        }
    }
}

/// Built-in observer that emits `tracing` events.
///
/// # Examples
///
/// ```
/// use ferrous_syringe::{ClassRegistry, ContainerBuilder, TracingObserver};
/// use std::sync::Arc;
///
/// let mut builder = ContainerBuilder::new(ClassRegistry::new());
/// builder.add_observer(Arc::new(TracingObserver::new()));
/// ```
#[derive(Debug, Clone)]
pub struct TracingObserver {
    prefix: String,
}

impl TracingObserver {
    pub fn new() -> Self {
        Self {
            prefix: "ferrous-syringe".to_string(),
        }
    }

    /// Observer whose events carry `prefix` in their `container` field.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildObserver for TracingObserver {
    fn constructing(&self, key: &str) {
        tracing::debug!(container = %self.prefix, service = key, "constructing service");
    }

    fn constructed(&self, key: &str, duration: Duration) {
        tracing::debug!(
            container = %self.prefix,
            service = key,
            elapsed_us = duration.as_micros() as u64,
            "constructed service"
        );
    }

    fn construction_failed(&self, key: &str, error: &DiError) {
        tracing::warn!(container = %self.prefix, service = key, error = %error, "service construction failed");
    }
}
