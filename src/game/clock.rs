use std::cell::RefCell;
use std::time::Duration;

pub type Task = Box<dyn FnOnce() + 'static>;

/// Source of delayed callbacks for the game engine.
///
/// Tasks run on the thread that scheduled them. There is no cancellation:
/// callers guard their tasks with a generation check instead.
pub trait Clock {
    fn schedule(&self, delay: Duration, task: Task);
}

/// Schedules on the default glib main context.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlibClock;

impl Clock for GlibClock {
    fn schedule(&self, delay: Duration, task: Task) {
        let _ = glib::timeout_add_local_once(delay, task);
    }
}

struct Pending {
    due: Duration,
    seq: u64,
    task: Task,
}

#[derive(Default)]
struct Timeline {
    now: Duration,
    seq: u64,
    pending: Vec<Pending>,
}

/// Virtual timeline advanced by hand.
#[derive(Default)]
pub struct ManualClock {
    timeline: RefCell<Timeline>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.timeline.borrow().now
    }

    pub fn pending(&self) -> usize {
        self.timeline.borrow().pending.len()
    }

    /// Moves time forward, running every task that falls due on the way in
    /// deadline order. Tasks scheduled by those tasks run too if they fall
    /// inside the window.
    pub fn advance(&self, by: Duration) {
        let target = self.now() + by;
        while let Some(task) = self.pop_due(target) {
            task();
        }
        self.timeline.borrow_mut().now = target;
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    fn pop_due(&self, target: Duration) -> Option<Task> {
        let mut tl = self.timeline.borrow_mut();
        let next = tl
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= target)
            .min_by_key(|(_, p)| (p.due, p.seq))
            .map(|(idx, _)| idx)?;
        let entry = tl.pending.swap_remove(next);
        tl.now = entry.due;
        Some(entry.task)
    }
}

impl Clock for ManualClock {
    fn schedule(&self, delay: Duration, task: Task) {
        let mut tl = self.timeline.borrow_mut();
        let due = tl.now + delay;
        let seq = tl.seq;
        tl.seq += 1;
        tl.pending.push(Pending { due, seq, task });
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;

    #[test]
    fn runs_in_deadline_order() {
        let clock = Rc::new(ManualClock::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        for (ms, tag) in [(30, "c"), (10, "a"), (20, "b"), (10, "a2")] {
            let log = log.clone();
            clock.schedule(Duration::from_millis(ms), Box::new(move || log.borrow_mut().push(tag)));
        }

        clock.advance_ms(15);
        assert_eq!(*log.borrow(), vec!["a", "a2"]);
        assert_eq!(clock.pending(), 2);

        clock.advance_ms(100);
        assert_eq!(*log.borrow(), vec!["a", "a2", "b", "c"]);
        assert_eq!(clock.now(), Duration::from_millis(115));
    }

    #[test]
    fn nested_tasks_inside_window_run() {
        let clock = Rc::new(ManualClock::new());
        let hits = Rc::new(RefCell::new(Vec::new()));
        {
            let inner_clock = clock.clone();
            let hits = hits.clone();
            clock.schedule(
                Duration::from_millis(5),
                Box::new(move || {
                    let at = inner_clock.now();
                    hits.borrow_mut().push(at);
                    let hits = hits.clone();
                    let again = inner_clock.clone();
                    inner_clock.schedule(
                        Duration::from_millis(5),
                        Box::new(move || hits.borrow_mut().push(again.now())),
                    );
                }),
            );
        }

        clock.advance_ms(10);
        assert_eq!(
            *hits.borrow(),
            vec![Duration::from_millis(5), Duration::from_millis(10)]
        );
    }
}
