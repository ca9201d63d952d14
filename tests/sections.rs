use std::cell::{Cell, RefCell};
use std::rc::Rc;

use folio::error::SectionError;
use folio::shell::sections::{Activation, Section, SectionManager, SectionState};
use futures::channel::oneshot;
use futures::executor::{LocalPool, block_on};
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;

type Journal = Rc<RefCell<Vec<String>>>;

/// Section that records its hooks into a shared journal, together with what
/// the manager reported as active at that moment.
struct Recorder {
    name: &'static str,
    journal: Journal,
    manager: RefCell<Option<Rc<SectionManager>>>,
    inits: Cell<u32>,
    failures_left: Cell<u32>,
    gate: RefCell<Option<oneshot::Receiver<()>>>,
}

impl Recorder {
    fn new(name: &'static str, journal: &Journal) -> Rc<Self> {
        Rc::new(Recorder {
            name,
            journal: journal.clone(),
            manager: RefCell::new(None),
            inits: Cell::new(0),
            failures_left: Cell::new(0),
            gate: RefCell::new(None),
        })
    }

    fn active(&self) -> String {
        self.manager
            .borrow()
            .as_ref()
            .and_then(|m| m.current_section())
            .unwrap_or_else(|| "-".to_string())
    }
}

impl Section for Recorder {
    fn init(&self) -> LocalBoxFuture<'_, Result<(), SectionError>> {
        Box::pin(async move {
            self.inits.set(self.inits.get() + 1);
            self.journal
                .borrow_mut()
                .push(format!("init {} (active {})", self.name, self.active()));
            let gate = self.gate.borrow_mut().take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            if self.failures_left.get() > 0 {
                self.failures_left.set(self.failures_left.get() - 1);
                return Err(SectionError::Setup(format!("{} unavailable", self.name)));
            }
            Ok(())
        })
    }

    fn cleanup(&self) -> LocalBoxFuture<'_, ()> {
        Box::pin(async move {
            self.journal
                .borrow_mut()
                .push(format!("cleanup {} (active {})", self.name, self.active()));
        })
    }
}

fn setup(names: &[&'static str]) -> (Rc<SectionManager>, Journal, Vec<Rc<Recorder>>) {
    let manager = Rc::new(SectionManager::new());
    let journal: Journal = Rc::default();
    let recorders: Vec<_> = names
        .iter()
        .map(|&name| {
            let rec = Recorder::new(name, &journal);
            *rec.manager.borrow_mut() = Some(manager.clone());
            manager.register(name, rec.clone()).unwrap();
            rec
        })
        .collect();
    (manager, journal, recorders)
}

#[test]
fn switching_back_and_forth_initializes_once() {
    let (manager, journal, recs) = setup(&["a", "b"]);

    assert_eq!(block_on(manager.activate("a")), Activation::Initialized);
    assert_eq!(block_on(manager.activate("b")), Activation::Initialized);
    assert_eq!(block_on(manager.activate("a")), Activation::Resumed);

    assert_eq!(recs[0].inits.get(), 1);
    assert_eq!(recs[1].inits.get(), 1);
    assert_eq!(
        *journal.borrow(),
        vec![
            "init a (active a)",
            "cleanup a (active a)",
            "init b (active b)",
            "cleanup b (active b)",
        ]
    );
    assert_eq!(manager.current_section().as_deref(), Some("a"));
}

#[test]
fn failed_init_is_retried_on_next_activation() {
    let (manager, _journal, recs) = setup(&["a", "b"]);
    recs[1].failures_left.set(1);

    block_on(manager.activate("a"));
    assert_eq!(block_on(manager.activate("b")), Activation::InitFailed);
    assert_eq!(manager.state("b"), Some(SectionState::Uninitialized));
    assert_eq!(manager.current_section().as_deref(), Some("b"));

    assert_eq!(block_on(manager.activate("b")), Activation::Initialized);
    assert_eq!(manager.state("b"), Some(SectionState::Ready));
    assert_eq!(recs[1].inits.get(), 2);

    block_on(manager.activate("a"));
    block_on(manager.activate("b"));
    assert_eq!(recs[1].inits.get(), 2);
}

#[test]
fn activation_during_pending_init_is_dropped() {
    let (manager, _journal, recs) = setup(&["slow"]);
    let (release, gate) = oneshot::channel();
    *recs[0].gate.borrow_mut() = Some(gate);

    let mut pool = LocalPool::new();
    let results: Rc<RefCell<Vec<Activation>>> = Rc::default();
    for _ in 0..2 {
        let manager = manager.clone();
        let results = results.clone();
        pool.spawner()
            .spawn_local(async move {
                let outcome = manager.activate("slow").await;
                results.borrow_mut().push(outcome);
            })
            .unwrap();
    }

    pool.run_until_stalled();
    assert_eq!(manager.state("slow"), Some(SectionState::Loading));
    assert_eq!(*results.borrow(), vec![Activation::InFlight]);

    release.send(()).unwrap();
    pool.run_until_stalled();
    assert_eq!(
        *results.borrow(),
        vec![Activation::InFlight, Activation::Initialized]
    );
    assert_eq!(recs[0].inits.get(), 1);
    assert_eq!(manager.state("slow"), Some(SectionState::Ready));
}

#[test]
fn dropped_activation_does_not_leave_section_loading() {
    let (manager, _journal, recs) = setup(&["slow"]);
    let (_release, gate) = oneshot::channel::<()>();
    *recs[0].gate.borrow_mut() = Some(gate);

    let mut pool = LocalPool::new();
    let handle = {
        let manager = manager.clone();
        pool.spawner()
            .spawn_local_with_handle(async move { manager.activate("slow").await })
            .unwrap()
    };
    pool.run_until_stalled();
    assert_eq!(manager.state("slow"), Some(SectionState::Loading));

    drop(handle);
    pool.run_until_stalled();
    assert_eq!(manager.state("slow"), Some(SectionState::Uninitialized));
}

#[test]
fn navigating_away_from_a_loading_section_cleans_it_up() {
    let (manager, journal, recs) = setup(&["slow", "fast"]);
    let (release, gate) = oneshot::channel();
    *recs[0].gate.borrow_mut() = Some(gate);

    let mut pool = LocalPool::new();
    {
        let manager = manager.clone();
        pool.spawner()
            .spawn_local(async move {
                manager.activate("slow").await;
            })
            .unwrap();
    }
    pool.run_until_stalled();

    assert_eq!(block_on(manager.activate("fast")), Activation::Initialized);
    assert_eq!(manager.current_section().as_deref(), Some("fast"));

    release.send(()).unwrap();
    pool.run_until_stalled();
    assert_eq!(manager.state("slow"), Some(SectionState::Ready));
    assert_eq!(manager.current_section().as_deref(), Some("fast"));
    assert_eq!(
        journal.borrow()[..3],
        [
            "init slow (active slow)".to_string(),
            "cleanup slow (active slow)".to_string(),
            "init fast (active fast)".to_string(),
        ]
    );
}
