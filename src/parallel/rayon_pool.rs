// rayon-based fork/join

use std::sync::Arc;

use crate::error::SpError;

/// Runs dispatches inside a rayon scope, one spawned job per item.
///
/// Without a dedicated pool the global pool is used, sized to the number of
/// logical CPUs on first use.
#[derive(Debug, Clone, Default)]
pub struct RayonPool {
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl RayonPool {
    pub fn new() -> Self {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_cpus::get())
            .build_global()
            .ok();
        RayonPool { pool: None }
    }

    /// A dedicated pool of `threads` workers.
    pub fn with_threads(threads: usize) -> Result<Self, SpError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("spartan-{i}"))
            .build()
            .map_err(|e| SpError::ThreadPool(e.to_string()))?;
        Ok(RayonPool { pool: Some(Arc::new(pool)) })
    }

    fn scope<'scope, OP>(&self, op: OP)
    where
        OP: FnOnce(&rayon::Scope<'scope>) + Send,
    {
        match &self.pool {
            Some(pool) => pool.scope(op),
            None => rayon::scope(op),
        }
    }
}

impl super::Executor for RayonPool {
    fn threads(&self) -> Option<usize> {
        Some(match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        })
    }

    fn map<I, R, F>(&self, items: &[I], f: F) -> Vec<R>
    where
        I: Sync,
        R: Send,
        F: Fn(usize, &I) -> R + Sync,
    {
        let mut slots: Vec<Option<R>> = items.iter().map(|_| None).collect();
        let f = &f;
        self.scope(|s| {
            for ((p, item), slot) in items.iter().enumerate().zip(slots.iter_mut()) {
                s.spawn(move |_| *slot = Some(f(p, item)));
            }
        });
        // the scope only returns once every job has stored its result
        slots.into_iter().flatten().collect()
    }

    fn map_mut<I, R, F>(&self, items: &mut [I], f: F) -> Vec<R>
    where
        I: Send,
        R: Send,
        F: Fn(usize, &mut I) -> R + Sync,
    {
        let mut slots: Vec<Option<R>> = items.iter().map(|_| None).collect();
        let f = &f;
        self.scope(|s| {
            for ((p, item), slot) in items.iter_mut().enumerate().zip(slots.iter_mut()) {
                s.spawn(move |_| *slot = Some(f(p, item)));
            }
        });
        slots.into_iter().flatten().collect()
    }
}
