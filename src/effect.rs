//! Global Effect Module - Callbacks re-run when tracked cells change.
//!
//! An effect runs once synchronously at registration, then once per flush in
//! which any of its dependencies reported a change. Triggers route through
//! the scope's scheduler under a single job identity, so several synchronous
//! dependency mutations coalesce into one rerun. Before each rerun the
//! cleanup returned by the previous run, if any, is invoked.
//!
//! Registration lives on [`Scope::use_effect`](crate::Scope::use_effect);
//! this module holds the machinery.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::warn;

use crate::cell::Dep;
use crate::runner::{self, Cleanup};
use crate::scheduler::Scheduler;

struct EffectState {
    callback: Box<dyn FnMut() -> Option<Cleanup>>,
    cleanup: Option<Cleanup>,
}

/// Run the callback once immediately, then subscribe a scheduler-routed rerun
/// to every dependency. An empty dependency list means the effect never
/// re-runs.
pub(crate) fn register(
    scheduler: &Scheduler,
    callback: impl FnMut() -> Option<Cleanup> + 'static,
    deps: Vec<Dep>,
) {
    let state = Rc::new(RefCell::new(EffectState {
        callback: Box::new(callback),
        cleanup: None,
    }));

    // Mount run, before any subscription exists.
    run_once(&state);

    if deps.is_empty() {
        return;
    }

    let id = scheduler.job_id();
    let job: Rc<dyn Fn()> = {
        let state = state.clone();
        Rc::new(move || run_once(&state))
    };
    let trigger: Rc<dyn Fn()> = {
        let scheduler = scheduler.clone();
        Rc::new(move || scheduler.schedule(id, job.clone()))
    };
    for dep in deps {
        dep.subscribe(trigger.clone());
    }
}

fn run_once(state: &Rc<RefCell<EffectState>>) {
    let Ok(mut effect) = state.try_borrow_mut() else {
        warn!("effect re-entered during its own run; skipping");
        return;
    };
    let pending = effect.cleanup.take();
    runner::run_cleanup("effect cleanup", pending);
    effect.cleanup = runner::run_guarded("effect callback", || (effect.callback)()).flatten();
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;
    use crate::value::Value;

    #[test]
    fn test_runs_once_at_registration_with_no_deps() {
        let scheduler = Scheduler::new();
        let runs = Rc::new(RefCell::new(0));
        {
            let runs = runs.clone();
            register(
                &scheduler,
                move || {
                    *runs.borrow_mut() += 1;
                    None
                },
                vec![],
            );
        }
        assert_eq!(*runs.borrow(), 1);
        assert_eq!(scheduler.flush(), 0);
        assert_eq!(*runs.borrow(), 1);
    }

    #[test]
    fn test_reruns_once_per_flush_for_coalesced_triggers() {
        let scheduler = Scheduler::new();
        let a = Cell::new(Value::from(0));
        let b = Cell::new(Value::from(0));

        let runs = Rc::new(RefCell::new(0));
        {
            let runs = runs.clone();
            register(
                &scheduler,
                move || {
                    *runs.borrow_mut() += 1;
                    None
                },
                vec![a.dep(), b.dep()],
            );
        }
        assert_eq!(*runs.borrow(), 1);

        a.set(Value::from(1));
        b.set(Value::from(1));
        assert_eq!(*runs.borrow(), 1); // deferred until the flush

        scheduler.flush();
        assert_eq!(*runs.borrow(), 2); // one rerun, not two
    }

    #[test]
    fn test_equal_value_set_does_not_trigger() {
        let scheduler = Scheduler::new();
        let a = Cell::new(Value::from(1));

        let runs = Rc::new(RefCell::new(0));
        {
            let runs = runs.clone();
            register(
                &scheduler,
                move || {
                    *runs.borrow_mut() += 1;
                    None
                },
                vec![a.dep()],
            );
        }

        a.set(Value::from(1));
        scheduler.flush();
        assert_eq!(*runs.borrow(), 1);
    }

    #[test]
    fn test_cleanup_runs_before_each_rerun() {
        let scheduler = Scheduler::new();
        let a = Cell::new(Value::from(0));

        let log = Rc::new(RefCell::new(Vec::new()));
        {
            let log = log.clone();
            let mut run = 0;
            register(
                &scheduler,
                move || {
                    run += 1;
                    let log = log.clone();
                    log.borrow_mut().push(format!("run:{run}"));
                    Some(Box::new(move || log.borrow_mut().push(format!("cleanup:{run}"))))
                },
                vec![a.dep()],
            );
        }

        a.set(Value::from(1));
        scheduler.flush();
        a.set(Value::from(2));
        scheduler.flush();

        assert_eq!(
            *log.borrow(),
            vec!["run:1", "cleanup:1", "run:2", "cleanup:2", "run:3"]
        );
    }

    #[test]
    fn test_panicking_effect_does_not_poison_later_flushes() {
        let scheduler = Scheduler::new();
        let a = Cell::new(Value::from(0));

        let runs = Rc::new(RefCell::new(0));
        {
            let runs = runs.clone();
            register(
                &scheduler,
                move || {
                    *runs.borrow_mut() += 1;
                    if *runs.borrow() == 2 {
                        panic!("effect boom");
                    }
                    None
                },
                vec![a.dep()],
            );
        }

        a.set(Value::from(1));
        scheduler.flush(); // panicking rerun, isolated
        a.set(Value::from(2));
        scheduler.flush();
        assert_eq!(*runs.borrow(), 3);
    }
}
