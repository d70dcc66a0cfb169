//! Fork/join execution of one task per processor.
//!
//! Every dispatch spawns exactly one task per item (per image, in practice),
//! blocks until all of them have finished, and hands back the results indexed
//! by item position. No task outlives the call that spawned it. When a task
//! panics, the panic is re-raised on the calling thread once its siblings have
//! been joined.
//!
//! Two backends are available:
//!
//! - [`RayonPool`] (feature `rayon`, on by default) runs the tasks inside a
//!   rayon scope, on the global pool or on a dedicated one.
//! - [`ScopedThreads`] starts one OS thread per task with `std::thread::scope`.
//!
//! [`Dispatcher`] selects between them at runtime.

pub mod threads;
pub use threads::ScopedThreads;

#[cfg(feature = "rayon")]
pub mod rayon_pool;
#[cfg(feature = "rayon")]
pub use rayon_pool::RayonPool;

use crate::error::SpError;

pub trait Executor {
    /// Number of worker threads the backend runs tasks on. `None` when every
    /// task gets a thread of its own.
    fn threads(&self) -> Option<usize>;

    /// Runs `f(p, &items[p])` for every `p` concurrently; `result[p]` belongs to `items[p]`.
    fn map<I, R, F>(&self, items: &[I], f: F) -> Vec<R>
    where
        I: Sync,
        R: Send,
        F: Fn(usize, &I) -> R + Sync;

    /// Like [`map`](Executor::map), with every task holding the only reference
    /// to its item.
    fn map_mut<I, R, F>(&self, items: &mut [I], f: F) -> Vec<R>
    where
        I: Send,
        R: Send,
        F: Fn(usize, &mut I) -> R + Sync;

    /// Runs `f(p)` for `p` in `0..tasks`.
    fn run<R, F>(&self, tasks: usize, f: F) -> Vec<R>
    where
        R: Send,
        F: Fn(usize) -> R + Sync,
    {
        let ids: Vec<usize> = (0..tasks).collect();
        self.map(&ids, |_, &p| f(p))
    }
}

/// Runtime choice of execution backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[cfg_attr(feature = "rayon", default)]
    Rayon,
    #[cfg_attr(not(feature = "rayon"), default)]
    Threads,
}

#[derive(Debug, Clone)]
pub enum Dispatcher {
    #[cfg(feature = "rayon")]
    Rayon(RayonPool),
    Threads(ScopedThreads),
}

impl Default for Dispatcher {
    fn default() -> Self {
        #[cfg(feature = "rayon")]
        {
            Dispatcher::Rayon(RayonPool::new())
        }
        #[cfg(not(feature = "rayon"))]
        {
            Dispatcher::Threads(ScopedThreads)
        }
    }
}

impl Dispatcher {
    /// Builds a dispatcher for `backend`. `threads` sizes a dedicated rayon
    /// pool and is ignored by the thread-per-task backend.
    pub fn new(backend: Backend, threads: Option<usize>) -> Result<Self, SpError> {
        match backend {
            #[cfg(feature = "rayon")]
            Backend::Rayon => match threads {
                Some(n) => Ok(Dispatcher::Rayon(RayonPool::with_threads(n)?)),
                None => Ok(Dispatcher::Rayon(RayonPool::new())),
            },
            #[cfg(not(feature = "rayon"))]
            Backend::Rayon => Err(SpError::Unsupported("built without the `rayon` feature")),
            Backend::Threads => Ok(Dispatcher::Threads(ScopedThreads)),
        }
    }

    pub fn backend(&self) -> Backend {
        match self {
            #[cfg(feature = "rayon")]
            Dispatcher::Rayon(_) => Backend::Rayon,
            Dispatcher::Threads(_) => Backend::Threads,
        }
    }
}

impl Executor for Dispatcher {
    fn threads(&self) -> Option<usize> {
        match self {
            #[cfg(feature = "rayon")]
            Dispatcher::Rayon(pool) => pool.threads(),
            Dispatcher::Threads(t) => t.threads(),
        }
    }

    fn map<I, R, F>(&self, items: &[I], f: F) -> Vec<R>
    where
        I: Sync,
        R: Send,
        F: Fn(usize, &I) -> R + Sync,
    {
        match self {
            #[cfg(feature = "rayon")]
            Dispatcher::Rayon(pool) => pool.map(items, f),
            Dispatcher::Threads(t) => t.map(items, f),
        }
    }

    fn map_mut<I, R, F>(&self, items: &mut [I], f: F) -> Vec<R>
    where
        I: Send,
        R: Send,
        F: Fn(usize, &mut I) -> R + Sync,
    {
        match self {
            #[cfg(feature = "rayon")]
            Dispatcher::Rayon(pool) => pool.map_mut(items, f),
            Dispatcher::Threads(t) => t.map_mut(items, f),
        }
    }
}
