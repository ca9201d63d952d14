use std::cell::RefCell;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use tracing::{debug, error, info, warn};

use crate::error::SectionError;

/// One top-level panel of the shell.
///
/// `init` runs on the first activation and again only if it failed before.
/// `cleanup` runs every time the section stops being the active one.
pub trait Section {
    fn init(&self) -> LocalBoxFuture<'_, Result<(), SectionError>>;

    fn cleanup(&self) -> LocalBoxFuture<'_, ()> {
        Box::pin(async {})
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SectionState {
    Uninitialized,
    Loading,
    Ready,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activation {
    /// No section is registered under the id.
    Unknown,
    AlreadyActive,
    /// The section is loading, or another switch is still cleaning up.
    InFlight,
    Initialized,
    /// The section was ready already and only became active.
    Resumed,
    /// The section is active but its init hook failed; the next activation
    /// retries it.
    InitFailed,
}

struct Entry {
    id: String,
    state: SectionState,
    section: Rc<dyn Section>,
}

#[derive(Default)]
struct Registry {
    entries: Vec<Entry>,
    active: Option<usize>,
    switching: Option<usize>,
}

impl Registry {
    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }
}

#[derive(Default)]
pub struct SectionManager {
    registry: RefCell<Registry>,
}

impl SectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, id: impl Into<String>, section: Rc<dyn Section>) -> Result<(), SectionError> {
        let id = id.into();
        let mut reg = self.registry.borrow_mut();
        if reg.position(&id).is_some() {
            return Err(SectionError::Duplicate(id));
        }
        debug!(section = %id, "registered section");
        reg.entries.push(Entry {
            id,
            state: SectionState::Uninitialized,
            section,
        });
        Ok(())
    }

    pub fn current_section(&self) -> Option<String> {
        let reg = self.registry.borrow();
        reg.active.map(|idx| reg.entries[idx].id.clone())
    }

    pub fn state(&self, id: &str) -> Option<SectionState> {
        let reg = self.registry.borrow();
        reg.position(id).map(|idx| reg.entries[idx].state)
    }

    pub fn section_ids(&self) -> Vec<String> {
        self.registry
            .borrow()
            .entries
            .iter()
            .map(|e| e.id.clone())
            .collect()
    }

    /// Makes `id` the active section.
    ///
    /// The outgoing section's cleanup is awaited before `id` is marked
    /// active. Init failures are logged and reported through the returned
    /// [`Activation`], never propagated.
    pub async fn activate(&self, id: &str) -> Activation {
        let (target, section, outgoing) = {
            let reg = self.registry.borrow();
            let Some(target) = reg.position(id) else {
                warn!(section = id, "activation of unknown section ignored");
                return Activation::Unknown;
            };
            if reg.switching.is_some() {
                debug!(section = id, "switch already in progress");
                return Activation::InFlight;
            }
            let entry = &reg.entries[target];
            if entry.state == SectionState::Loading {
                debug!(section = id, "section still loading");
                return Activation::InFlight;
            }
            if reg.active == Some(target) && entry.state == SectionState::Ready {
                return Activation::AlreadyActive;
            }
            let outgoing = reg
                .active
                .filter(|&idx| idx != target)
                .map(|idx| (reg.entries[idx].id.clone(), reg.entries[idx].section.clone()));
            (target, entry.section.clone(), outgoing)
        };

        if let Some((outgoing_id, outgoing_section)) = outgoing {
            self.registry.borrow_mut().switching = Some(target);
            let guard = SwitchGuard {
                registry: &self.registry,
            };
            outgoing_section.cleanup().await;
            drop(guard);
            debug!(section = %outgoing_id, "section deactivated");
        }

        let needs_init = {
            let mut reg = self.registry.borrow_mut();
            reg.active = Some(target);
            let entry = &mut reg.entries[target];
            let needs_init = entry.state == SectionState::Uninitialized;
            if needs_init {
                entry.state = SectionState::Loading;
            }
            needs_init
        };
        info!(section = id, "section active");

        if !needs_init {
            return Activation::Resumed;
        }

        let mut guard = LoadGuard {
            registry: &self.registry,
            target,
            outcome: SectionState::Uninitialized,
        };
        match section.init().await {
            Ok(()) => {
                guard.outcome = SectionState::Ready;
                info!(section = id, "section initialized");
                Activation::Initialized
            }
            Err(err) => {
                error!(section = id, error = %err, "section init failed");
                Activation::InitFailed
            }
        }
    }
}

/// Clears the in-progress switch even if the activation future is dropped
/// while the outgoing cleanup is pending.
struct SwitchGuard<'a> {
    registry: &'a RefCell<Registry>,
}

impl Drop for SwitchGuard<'_> {
    fn drop(&mut self) {
        self.registry.borrow_mut().switching = None;
    }
}

/// Leaves the section `Ready` on success and `Uninitialized` otherwise,
/// including when the init future is dropped half way.
struct LoadGuard<'a> {
    registry: &'a RefCell<Registry>,
    target: usize,
    outcome: SectionState,
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        self.registry.borrow_mut().entries[self.target].state = self.outcome;
    }
}
