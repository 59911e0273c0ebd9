//! Lock-protected container for hosts that share one registry between threads.
//!
//! [`Container`] resolves synchronously and is not `Sync`. `SyncContainer`
//! takes one mutex around each top-level operation, so a factory never runs
//! concurrently with another resolution or registration on the same
//! container.

use std::fmt;

#[cfg(feature = "parking-lot")]
use parking_lot::{Mutex, MutexGuard};
#[cfg(not(feature = "parking-lot"))]
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::builder::DescriptorBuilder;
use crate::container::{Container, Dependencies};
use crate::descriptors::DependencyInfo;
use crate::error::DiResult;
use crate::traits::ResolverCore;
use crate::value::Value;

/// Thread-safe wrapper serializing access to a [`Container`].
///
/// # Examples
///
/// ```
/// use ferrous_injector::{Container, Resolver, SyncContainer, Value};
/// use std::sync::Arc;
///
/// # fn main() -> ferrous_injector::DiResult<()> {
/// let shared = Arc::new(SyncContainer::new(Container::new()));
/// shared.register("answer", |d| d.as_constant(42i32))?;
///
/// let worker = {
///     let shared = shared.clone();
///     std::thread::spawn(move || shared.get_as::<i32>("answer").map(|v| *v))
/// };
/// assert_eq!(worker.join().unwrap()?, 42);
/// # Ok(())
/// # }
/// ```
pub struct SyncContainer {
    inner: Mutex<Container>,
}

impl SyncContainer {
    /// Wraps a container.
    pub fn new(container: Container) -> Self {
        Self {
            inner: Mutex::new(container),
        }
    }

    #[cfg(feature = "parking-lot")]
    fn lock(&self) -> MutexGuard<'_, Container> {
        self.inner.lock()
    }

    // A panicking factory leaves the registry consistent: its slot stays pending.
    #[cfg(not(feature = "parking-lot"))]
    fn lock(&self) -> MutexGuard<'_, Container> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `name` and configures it while holding the lock.
    pub fn register<F>(&self, name: impl Into<String>, configure: F) -> DiResult<()>
    where
        F: FnOnce(DescriptorBuilder<'_>) -> DiResult<()>,
    {
        let container = self.lock();
        configure(container.register(name)?)
    }

    /// Reads a dependency under the lock; see [`Container::get`].
    pub fn get(&self, name: &str) -> DiResult<Option<Value>> {
        self.lock().get(name)
    }

    /// Runs `f` with exclusive access to the container.
    pub fn with<R>(&self, f: impl FnOnce(&Container) -> R) -> R {
        f(&self.lock())
    }

    /// Number of resolved dependencies.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing has been resolved yet.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Snapshot of resolved dependencies.
    pub fn dependencies(&self) -> Dependencies {
        self.lock().dependencies()
    }

    /// Introspection records for every registered dependency.
    pub fn describe(&self) -> Vec<DependencyInfo> {
        self.lock().describe()
    }

    /// Unwraps the container.
    #[cfg(feature = "parking-lot")]
    pub fn into_inner(self) -> Container {
        self.inner.into_inner()
    }

    /// Unwraps the container.
    #[cfg(not(feature = "parking-lot"))]
    pub fn into_inner(self) -> Container {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<Container> for SyncContainer {
    fn from(container: Container) -> Self {
        Self::new(container)
    }
}

impl ResolverCore for SyncContainer {
    fn resolve_name(&self, name: &str) -> DiResult<Option<Value>> {
        self.get(name)
    }

    fn contains_name(&self, name: &str) -> bool {
        self.lock().is_registered(name)
    }
}

impl fmt::Debug for SyncContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncContainer").finish_non_exhaustive()
    }
}
