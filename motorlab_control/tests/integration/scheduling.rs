//! Task rates of the wired control unit and of the bare scheduler.

use super::{Rig, tuned_config};
use motorlab_common::time::{Clock, Ticks};
use motorlab_control::ControlError;
use motorlab_control::scheduler::{Scheduler, Task};
use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

struct Stamps {
    runs: Rc<RefCell<Vec<u32>>>,
}

impl Task for Stamps {
    fn name(&self) -> &'static str {
        "stamps"
    }

    fn run(&mut self, now: Ticks) -> Result<(), ControlError> {
        self.runs.borrow_mut().push(now.as_micros());
        Ok(())
    }
}

#[test]
fn default_periods_give_expected_run_counts() {
    let mut rig = Rig::new(&tuned_config());
    rig.advance_ms(100);

    let counts: Vec<(&str, u64)> = rig
        .runner
        .scheduler()
        .tasks()
        .iter()
        .map(|task| (task.name(), task.stats().runs))
        .collect();
    assert_eq!(
        counts,
        vec![
            ("encoder 1", 50),
            ("encoder 2", 50),
            ("motor 1", 50),
            ("motor 2", 50),
            ("user", 2),
        ]
    );
}

#[test]
fn deadlines_stay_on_the_period_grid() {
    let mut rig = Rig::new(&tuned_config());
    rig.advance_ms(1_000);

    for task in rig.runner.scheduler().tasks() {
        let last = task
            .stats()
            .last_deadline
            .expect("every task ran")
            .as_micros();
        assert_eq!(last % task.period_us(), 0, "{}", task.name());
        assert_eq!(
            task.next_deadline().as_micros(),
            last + task.period_us(),
            "{}",
            task.name()
        );
    }
}

#[test]
fn stalled_loop_catches_up_one_run_per_poll() {
    let mut rig = Rig::new(&tuned_config());

    // One poll after 10 ms of silence: every task runs exactly once.
    rig.clock.advance(10_000);
    let ran = rig.runner.poll(rig.clock.now()).unwrap();
    assert_eq!(ran, 4);

    // The missed encoder/motor deadlines are served by the following polls.
    let mut extra = 0;
    for _ in 0..4 {
        extra += rig.runner.poll(rig.clock.now()).unwrap();
    }
    assert_eq!(extra, 16);
    assert_eq!(rig.runner.poll(rig.clock.now()).unwrap(), 0);
}

proptest! {
    #[test]
    fn k_periods_give_k_runs_spaced_by_one_period(
        period in 1u32..50_000,
        k in 1u32..40,
        start in any::<u32>(),
    ) {
        let runs = Rc::new(RefCell::new(Vec::new()));
        let origin = Ticks::from_micros(start);
        let mut scheduler = Scheduler::new(origin);
        scheduler
            .add(period, Box::new(Stamps { runs: runs.clone() }))
            .unwrap();

        // Poll exactly at each deadline, jumping through the time base.
        let end = origin.wrapping_add(period * k);
        let mut now = origin;
        while let Some(next) = scheduler.next_deadline(now) {
            if next.diff(end) > 0 {
                break;
            }
            now = next;
            scheduler.poll(now).unwrap();
        }

        let runs = runs.borrow();
        prop_assert_eq!(runs.len(), k as usize);
        for pair in runs.windows(2) {
            prop_assert_eq!(pair[1].wrapping_sub(pair[0]), period);
        }
        prop_assert_eq!(runs[0], start.wrapping_add(period));
    }
}
