//! Thread-per-task backend.
//!
//! Each dispatch starts one OS thread per item inside `std::thread::scope` and
//! joins all of them before looking at any outcome, so a panicking task never
//! leaves siblings running behind the caller's back.

use std::panic;
use std::thread;

#[derive(Debug, Clone, Copy, Default)]
pub struct ScopedThreads;

impl ScopedThreads {
    fn collect<R>(outcomes: Vec<thread::Result<R>>) -> Vec<R> {
        let mut results = Vec::with_capacity(outcomes.len());
        let mut first_panic = None;
        for outcome in outcomes {
            match outcome {
                Ok(r) => results.push(r),
                Err(payload) => {
                    first_panic.get_or_insert(payload);
                }
            }
        }
        if let Some(payload) = first_panic {
            panic::resume_unwind(payload);
        }
        results
    }
}

impl super::Executor for ScopedThreads {
    fn threads(&self) -> Option<usize> {
        None
    }

    fn map<I, R, F>(&self, items: &[I], f: F) -> Vec<R>
    where
        I: Sync,
        R: Send,
        F: Fn(usize, &I) -> R + Sync,
    {
        let f = &f;
        let outcomes = thread::scope(|s| {
            let handles: Vec<_> = items
                .iter()
                .enumerate()
                .map(|(p, item)| s.spawn(move || f(p, item)))
                .collect();
            handles.into_iter().map(|h| h.join()).collect::<Vec<_>>()
        });
        Self::collect(outcomes)
    }

    fn map_mut<I, R, F>(&self, items: &mut [I], f: F) -> Vec<R>
    where
        I: Send,
        R: Send,
        F: Fn(usize, &mut I) -> R + Sync,
    {
        let f = &f;
        let outcomes = thread::scope(|s| {
            let handles: Vec<_> = items
                .iter_mut()
                .enumerate()
                .map(|(p, item)| s.spawn(move || f(p, item)))
                .collect();
            handles.into_iter().map(|h| h.join()).collect::<Vec<_>>()
        });
        Self::collect(outcomes)
    }
}
