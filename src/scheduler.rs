//! Scheduler Module - Single-flush-per-batch job coalescing.
//!
//! Derived recomputes and global effect reruns are not executed inline during
//! a mutation. They are scheduled, identity-deduplicated, and run together in
//! one flush, so N synchronous mutations touching the same job yield exactly
//! one execution.
//!
//! There is no event loop assumption. When the scheduler arms a batch it
//! invokes the host waker installed with [`Scheduler::set_waker`]; the host
//! defers a single [`Scheduler::flush`] call however it likes (a microtask in
//! a wasm embedding, the next loop turn in a TUI, or an explicit call in
//! tests). Jobs scheduled *while* a flush is running are deferred to the next
//! batch, which bounds the work of one flush and rules out unbounded
//! synchronous recursion.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use filament::Scheduler;
//!
//! let scheduler = Scheduler::new();
//! let id = scheduler.job_id();
//! let job: Rc<dyn Fn()> = Rc::new(|| println!("recompute"));
//!
//! scheduler.schedule(id, job.clone());
//! scheduler.schedule(id, job.clone()); // coalesced with the first
//! assert_eq!(scheduler.flush(), 1);
//! ```

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use tracing::warn;

use crate::runner;

// =============================================================================
// TYPES
// =============================================================================

/// Identity of a scheduled job, used for coalescing within a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct JobId(u64);

type Job = Rc<dyn Fn()>;

#[derive(Default)]
struct SchedulerState {
    /// Jobs for the next flush, in scheduling order.
    pending: Vec<(JobId, Job)>,
    pending_ids: HashSet<JobId>,
    /// Jobs scheduled during a running flush; promoted afterwards.
    deferred: Vec<(JobId, Job)>,
    deferred_ids: HashSet<JobId>,
    flushing: bool,
    armed: bool,
    next_id: u64,
    waker: Option<Rc<dyn Fn()>>,
}

/// Cheaply clonable handle to one scheduler instance.
///
/// Every [`Scope`](crate::Scope) owns its own scheduler, so independent
/// reactive scopes never share a batch.
#[derive(Clone, Default)]
pub struct Scheduler {
    state: Rc<RefCell<SchedulerState>>,
}

// =============================================================================
// SCHEDULER
// =============================================================================

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh job identity.
    pub fn job_id(&self) -> JobId {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        JobId(state.next_id)
    }

    /// Install the host waker, invoked on every idle-to-armed transition.
    pub fn set_waker(&self, waker: impl Fn() + 'static) {
        self.state.borrow_mut().waker = Some(Rc::new(waker));
    }

    /// Whether a batch is armed and waiting for [`flush`](Self::flush).
    pub fn is_armed(&self) -> bool {
        self.state.borrow().armed
    }

    /// Number of jobs in the batch the next flush will run.
    pub fn pending_jobs(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Add a job to the batch. A job already in the batch (same `JobId`) is
    /// coalesced. During a flush the job lands in the *next* batch instead.
    pub fn schedule(&self, id: JobId, job: Job) {
        let waker = {
            let mut state = self.state.borrow_mut();
            if state.flushing {
                if state.deferred_ids.insert(id) {
                    state.deferred.push((id, job));
                }
                // The flush epilogue re-arms and wakes if needed.
                None
            } else {
                if state.pending_ids.insert(id) {
                    state.pending.push((id, job));
                }
                if state.armed {
                    None
                } else {
                    state.armed = true;
                    state.waker.clone()
                }
            }
        };
        if let Some(waker) = waker {
            waker();
        }
    }

    /// Run every distinct job in the current batch once, in scheduling order,
    /// then clear it. Returns the number of jobs run.
    ///
    /// Each job is isolated: a panicking job is logged and does not stop the
    /// batch. Jobs scheduled by running jobs stay pending for the next flush,
    /// and the waker fires again if any remain.
    pub fn flush(&self) -> usize {
        let jobs = {
            let mut state = self.state.borrow_mut();
            if state.flushing {
                warn!("reentrant flush ignored");
                return 0;
            }
            state.flushing = true;
            state.armed = false;
            state.pending_ids.clear();
            std::mem::take(&mut state.pending)
        };

        for (_, job) in &jobs {
            runner::run_guarded("scheduled job", || job());
        }

        let waker = {
            let mut state = self.state.borrow_mut();
            state.flushing = false;
            state.pending = std::mem::take(&mut state.deferred);
            state.pending_ids = std::mem::take(&mut state.deferred_ids);
            state.armed = !state.pending.is_empty();
            if state.armed { state.waker.clone() } else { None }
        };
        if let Some(waker) = waker {
            waker();
        }

        jobs.len()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn counting_job(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> Job {
        let log = log.clone();
        Rc::new(move || log.borrow_mut().push(name))
    }

    #[test]
    fn test_same_id_coalesces_within_one_flush() {
        let scheduler = Scheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let id = scheduler.job_id();
        let job = counting_job(&log, "a");

        scheduler.schedule(id, job.clone());
        scheduler.schedule(id, job.clone());
        scheduler.schedule(id, job);

        assert_eq!(scheduler.pending_jobs(), 1);
        assert_eq!(scheduler.flush(), 1);
        assert_eq!(*log.borrow(), vec!["a"]);
    }

    #[test]
    fn test_distinct_ids_run_in_scheduling_order() {
        let scheduler = Scheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = scheduler.job_id();
        let b = scheduler.job_id();

        scheduler.schedule(b, counting_job(&log, "b"));
        scheduler.schedule(a, counting_job(&log, "a"));

        assert_eq!(scheduler.flush(), 2);
        assert_eq!(*log.borrow(), vec!["b", "a"]);
    }

    #[test]
    fn test_flush_clears_the_batch() {
        let scheduler = Scheduler::new();
        let id = scheduler.job_id();
        scheduler.schedule(id, Rc::new(|| {}));

        assert!(scheduler.is_armed());
        assert_eq!(scheduler.pending_jobs(), 1);
        assert_eq!(scheduler.flush(), 1);
        assert!(!scheduler.is_armed());
        assert_eq!(scheduler.pending_jobs(), 0);
        assert_eq!(scheduler.flush(), 0);
    }

    #[test]
    fn test_rescheduling_after_flush_runs_again() {
        let scheduler = Scheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let id = scheduler.job_id();

        scheduler.schedule(id, counting_job(&log, "a"));
        scheduler.flush();
        scheduler.schedule(id, counting_job(&log, "a"));
        scheduler.flush();

        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_job_scheduled_during_flush_runs_next_flush() {
        let scheduler = Scheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let inner_id = scheduler.job_id();
        let outer_id = scheduler.job_id();

        let inner = counting_job(&log, "inner");
        let outer: Job = {
            let scheduler = scheduler.clone();
            let log = log.clone();
            Rc::new(move || {
                log.borrow_mut().push("outer");
                scheduler.schedule(inner_id, inner.clone());
            })
        };
        scheduler.schedule(outer_id, outer);

        assert_eq!(scheduler.flush(), 1);
        assert_eq!(*log.borrow(), vec!["outer"]);
        assert!(scheduler.is_armed());

        assert_eq!(scheduler.flush(), 1);
        assert_eq!(*log.borrow(), vec!["outer", "inner"]);
        assert!(!scheduler.is_armed());
    }

    #[test]
    fn test_waker_fires_once_per_arming() {
        let scheduler = Scheduler::new();
        let wakes = Rc::new(RefCell::new(0));
        {
            let wakes = wakes.clone();
            scheduler.set_waker(move || *wakes.borrow_mut() += 1);
        }

        let a = scheduler.job_id();
        let b = scheduler.job_id();
        scheduler.schedule(a, Rc::new(|| {}));
        scheduler.schedule(b, Rc::new(|| {}));
        assert_eq!(*wakes.borrow(), 1);

        scheduler.flush();
        scheduler.schedule(a, Rc::new(|| {}));
        assert_eq!(*wakes.borrow(), 2);
    }

    #[test]
    fn test_waker_fires_again_when_flush_leaves_deferred_work() {
        let scheduler = Scheduler::new();
        let wakes = Rc::new(RefCell::new(0));
        {
            let wakes = wakes.clone();
            scheduler.set_waker(move || *wakes.borrow_mut() += 1);
        }

        let inner_id = scheduler.job_id();
        let outer_id = scheduler.job_id();
        let outer: Job = {
            let scheduler = scheduler.clone();
            Rc::new(move || scheduler.schedule(inner_id, Rc::new(|| {})))
        };
        scheduler.schedule(outer_id, outer);
        assert_eq!(*wakes.borrow(), 1);

        scheduler.flush();
        assert_eq!(*wakes.borrow(), 2); // deferred work re-armed the batch
        scheduler.flush();
        assert_eq!(*wakes.borrow(), 2);
    }

    #[test]
    fn test_panicking_job_does_not_stop_the_batch() {
        let scheduler = Scheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = scheduler.job_id();
        let b = scheduler.job_id();

        scheduler.schedule(a, Rc::new(|| panic!("job boom")));
        scheduler.schedule(b, counting_job(&log, "b"));

        assert_eq!(scheduler.flush(), 2);
        assert_eq!(*log.borrow(), vec!["b"]);
    }
}
