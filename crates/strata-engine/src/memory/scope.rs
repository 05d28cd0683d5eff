use crate::device::AllocationError;

/// Something that can free one unit of device memory on request.
pub trait Evictor {
    /// Frees one unit. Returns `false` if nothing could be freed.
    fn try_evict_one(&mut self) -> bool;
}

impl<F: FnMut() -> bool> Evictor for F {
    fn try_evict_one(&mut self) -> bool {
        self()
    }
}

/// Runs device allocations under a memory-pressure policy.
pub trait AllocationScope {
    /// Runs `thunk` (one device allocation), using `evictor` to make room
    /// when the device is out of memory.
    ///
    /// The allocation error is propagated unchanged once the policy gives up.
    fn allocate<T, F>(
        &mut self,
        evictor: &mut dyn Evictor,
        label: &str,
        thunk: F,
    ) -> Result<T, AllocationError>
    where
        F: FnMut() -> Result<T, AllocationError>;
}

/// Scope that never evicts: one attempt, error propagated as-is.
#[derive(Debug, Default, Copy, Clone)]
pub struct DirectScope;

impl AllocationScope for DirectScope {
    fn allocate<T, F>(
        &mut self,
        _evictor: &mut dyn Evictor,
        _label: &str,
        mut thunk: F,
    ) -> Result<T, AllocationError>
    where
        F: FnMut() -> Result<T, AllocationError>,
    {
        thunk()
    }
}

/// Evict-and-retry scope.
///
/// On out-of-memory the caller's evictor is asked first, then every
/// registered secondary evictor (other caches sharing the device) in
/// registration order. Each successful eviction is followed by a retry.
/// The scope gives up when nobody frees anything or after `max_evictions`.
pub struct RetryScope {
    max_evictions: usize,
    secondary: Vec<Box<dyn Evictor>>,
}

impl RetryScope {
    pub const DEFAULT_MAX_EVICTIONS: usize = 64;

    pub fn new(max_evictions: usize) -> Self {
        Self {
            max_evictions,
            secondary: Vec::new(),
        }
    }

    /// Registers an evictor consulted after the caller's own.
    pub fn register(&mut self, evictor: Box<dyn Evictor>) {
        self.secondary.push(evictor);
    }

    fn evict_one(&mut self, primary: &mut dyn Evictor) -> bool {
        primary.try_evict_one() || self.secondary.iter_mut().any(|e| e.try_evict_one())
    }
}

impl Default for RetryScope {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_EVICTIONS)
    }
}

impl AllocationScope for RetryScope {
    fn allocate<T, F>(
        &mut self,
        evictor: &mut dyn Evictor,
        label: &str,
        mut thunk: F,
    ) -> Result<T, AllocationError>
    where
        F: FnMut() -> Result<T, AllocationError>,
    {
        let mut evictions = 0;
        loop {
            let err = match thunk() {
                Ok(v) => return Ok(v),
                Err(err) if !err.is_out_of_memory() => return Err(err),
                Err(err) => err,
            };

            if evictions >= self.max_evictions {
                log::warn!("{label}: giving up after {evictions} evictions");
                return Err(err);
            }
            if !self.evict_one(evictor) {
                log::debug!("{label}: nothing left to evict");
                return Err(err);
            }
            evictions += 1;
            log::trace!("{label}: retrying after eviction {evictions}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oom() -> AllocationError {
        AllocationError::OutOfMemory {
            label: "test".into(),
            size: 4,
        }
    }

    #[test]
    fn succeeds_without_eviction() {
        let mut evicted = 0;
        let mut evictor = || {
            evicted += 1;
            true
        };
        let out = RetryScope::default().allocate(&mut evictor, "a", || Ok::<_, AllocationError>(7));
        assert_eq!(out, Ok(7));
        assert_eq!(evicted, 0);
    }

    #[test]
    fn retries_after_each_eviction() {
        let mut failures_left = 2;
        let mut evicted = 0;
        let mut evictor = || {
            evicted += 1;
            true
        };
        let out = RetryScope::default().allocate(&mut evictor, "a", || {
            if failures_left > 0 {
                failures_left -= 1;
                Err(oom())
            } else {
                Ok(1)
            }
        });
        assert_eq!(out, Ok(1));
        assert_eq!(evicted, 2);
    }

    #[test]
    fn gives_up_when_nothing_evicts() {
        let mut evictor = || false;
        let out: Result<(), _> = RetryScope::default().allocate(&mut evictor, "a", || Err(oom()));
        assert_eq!(out, Err(oom()));
    }

    #[test]
    fn falls_back_to_secondary_evictors() {
        let mut scope = RetryScope::default();
        let mut budget = 1;
        scope.register(Box::new(move || {
            if budget > 0 {
                budget -= 1;
                true
            } else {
                false
            }
        }));

        let mut attempts = 0;
        let mut primary = || false;
        let out = scope.allocate(&mut primary, "a", || {
            attempts += 1;
            if attempts == 1 { Err(oom()) } else { Ok(()) }
        });
        assert_eq!(out, Ok(()));
        assert_eq!(attempts, 2);
    }

    #[test]
    fn hard_errors_are_not_retried() {
        let too_large = AllocationError::TooLarge {
            label: "a".into(),
            size: 10,
            limit: 5,
        };
        let mut evicted = false;
        let mut evictor = || {
            evicted = true;
            true
        };
        let expected = too_large.clone();
        let out: Result<(), _> =
            RetryScope::default().allocate(&mut evictor, "a", || Err(too_large.clone()));
        assert_eq!(out, Err(expected));
        assert!(!evicted);
    }

    #[test]
    fn eviction_bound_is_respected() {
        let mut evicted = 0;
        let mut evictor = || {
            evicted += 1;
            true
        };
        let out: Result<(), _> = RetryScope::new(3).allocate(&mut evictor, "a", || Err(oom()));
        assert!(out.is_err());
        assert_eq!(evicted, 3);
    }

    #[test]
    fn direct_scope_never_evicts() {
        let mut evicted = false;
        let mut evictor = || {
            evicted = true;
            true
        };
        let out: Result<(), _> = DirectScope.allocate(&mut evictor, "a", || Err(oom()));
        assert!(out.is_err());
        assert!(!evicted);
    }
}
