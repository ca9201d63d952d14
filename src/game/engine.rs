use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, info, warn};

use super::clock::Clock;
use super::state::{Card, FaceId, FlipOutcome, FlipState, GameConfig, GameState};
use crate::error::GameError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Dealt { pairs: usize, generation: u64 },
    CardChanged { index: usize, face: FaceId, state: FlipState },
    /// Wrong guess feedback; the cards are still face up.
    MismatchFlagged { pair: [usize; 2] },
    /// The mismatched pair is face down again and input is unlocked.
    MismatchCleared { pair: [usize; 2] },
    Won { matched_pairs: usize },
}

pub type Listener = Rc<dyn Fn(&GameEvent)>;

struct Inner {
    state: RefCell<GameState>,
    config: GameConfig,
    clock: Rc<dyn Clock>,
    listeners: RefCell<Vec<Listener>>,
}

/// Handle to one pairs-matching game. Clones share the same game.
///
/// Listeners are called after the state borrow is released, so they may read
/// the game or flip cards from inside a callback.
#[derive(Clone)]
pub struct MatchGame {
    inner: Rc<Inner>,
}

impl MatchGame {
    pub fn new(config: GameConfig, clock: Rc<dyn Clock>) -> Self {
        let state = GameState::new(config.seed);
        MatchGame {
            inner: Rc::new(Inner {
                state: RefCell::new(state),
                config,
                clock,
                listeners: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.inner.config
    }

    pub fn subscribe(&self, listener: impl Fn(&GameEvent) + 'static) {
        self.inner.listeners.borrow_mut().push(Rc::new(listener));
    }

    pub fn subscribe_shared(&self, listener: Listener) {
        self.inner.listeners.borrow_mut().push(listener);
    }

    /// Deals with the configured pair count.
    pub fn start(&self) -> Result<(), GameError> {
        self.new_game(self.inner.config.pairs)
    }

    pub fn new_game(&self, pairs: usize) -> Result<(), GameError> {
        let generation = {
            let mut st = self.inner.state.borrow_mut();
            st.deal(pairs)?;
            st.generation
        };
        info!(pairs, generation, "dealt new deck");
        self.emit(&[GameEvent::Dealt { pairs, generation }]);
        Ok(())
    }

    pub fn flip(&self, index: usize) -> FlipOutcome {
        let (outcome, events, generation) = {
            let mut st = self.inner.state.borrow_mut();
            let first = st.selection.first().copied();
            let outcome = st.flip(index);
            let mut events = Vec::with_capacity(3);
            if outcome != FlipOutcome::Rejected {
                events.push(card_changed(&st.deck, index, FlipState::Revealed));
            }
            match outcome {
                FlipOutcome::Matched | FlipOutcome::Won => {
                    if let Some(first) = first {
                        events.push(card_changed(&st.deck, first, FlipState::Matched));
                    }
                    events.push(card_changed(&st.deck, index, FlipState::Matched));
                }
                _ => {}
            }
            if outcome == FlipOutcome::Won {
                events.push(GameEvent::Won {
                    matched_pairs: st.matched_pairs,
                });
            }
            (outcome, events, st.generation)
        };

        match outcome {
            FlipOutcome::Rejected => {
                debug!(index, "flip rejected");
                return outcome;
            }
            FlipOutcome::Won => info!(generation, "all pairs matched"),
            _ => debug!(index, ?outcome, "card flipped"),
        }

        self.emit(&events);

        match outcome {
            FlipOutcome::Mismatched => self.schedule_mismatch_reset(generation),
            FlipOutcome::Won => self.schedule_win_reset(generation),
            _ => {}
        }
        outcome
    }

    /// Applies whatever resolution is pending right now and invalidates every
    /// outstanding timer. A finished game is re-dealt immediately.
    pub fn settle(&self) {
        let (events, redeal) = {
            let mut st = self.inner.state.borrow_mut();
            st.generation = st.generation.wrapping_add(1);
            let mut events = Vec::new();
            if let Some(pair) = st.clear_mismatch() {
                for idx in pair {
                    events.push(card_changed(&st.deck, idx, FlipState::Hidden));
                }
                events.push(GameEvent::MismatchCleared { pair });
            }
            let redeal = st.win_pending.then_some(st.pairs);
            (events, redeal)
        };
        self.emit(&events);
        if let Some(pairs) = redeal {
            if let Err(err) = self.new_game(pairs) {
                warn!(error = %err, "redeal after settle failed");
            }
        }
    }

    pub fn card(&self, index: usize) -> Option<Card> {
        self.inner.state.borrow().deck.get(index).copied()
    }

    pub fn deck(&self) -> Vec<Card> {
        self.inner.state.borrow().deck.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.state.borrow().deck.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn selection(&self) -> Vec<usize> {
        self.inner.state.borrow().selection.clone()
    }

    pub fn matched_pairs(&self) -> usize {
        self.inner.state.borrow().matched_pairs
    }

    pub fn pair_count(&self) -> usize {
        self.inner.state.borrow().pairs
    }

    pub fn is_locked(&self) -> bool {
        self.inner.state.borrow().input_locked
    }

    pub fn is_complete(&self) -> bool {
        self.inner.state.borrow().is_complete()
    }

    pub fn generation(&self) -> u64 {
        self.inner.state.borrow().generation
    }

    fn emit(&self, events: &[GameEvent]) {
        if events.is_empty() {
            return;
        }
        let listeners: Vec<Listener> = self.inner.listeners.borrow().clone();
        for event in events {
            for listener in &listeners {
                listener(event);
            }
        }
    }

    fn schedule_mismatch_reset(&self, generation: u64) {
        let weak = Rc::downgrade(&self.inner);
        let flag_delay = self.inner.config.mismatch_flag_delay();
        self.inner.clock.schedule(
            flag_delay,
            Box::new(move || {
                let Some(game) = upgrade(&weak) else {
                    return;
                };
                let pair = {
                    let mut st = game.inner.state.borrow_mut();
                    if st.generation != generation {
                        return;
                    }
                    st.flag_mismatch()
                };
                let Some(pair) = pair else {
                    return;
                };
                game.emit(&[GameEvent::MismatchFlagged { pair }]);

                let weak_reset = weak.clone();
                let reset_delay = game.inner.config.mismatch_reset_delay();
                game.inner.clock.schedule(
                    reset_delay,
                    Box::new(move || {
                        if let Some(game) = upgrade(&weak_reset) {
                            game.finish_mismatch(generation);
                        }
                    }),
                );
            }),
        );
    }

    fn finish_mismatch(&self, generation: u64) {
        let events = {
            let mut st = self.inner.state.borrow_mut();
            if st.generation != generation {
                return;
            }
            let Some(pair) = st.clear_mismatch() else {
                return;
            };
            let mut events: Vec<GameEvent> = pair
                .iter()
                .map(|&idx| card_changed(&st.deck, idx, FlipState::Hidden))
                .collect();
            events.push(GameEvent::MismatchCleared { pair });
            events
        };
        debug!(generation, "mismatch resolved");
        self.emit(&events);
    }

    fn schedule_win_reset(&self, generation: u64) {
        let weak = Rc::downgrade(&self.inner);
        self.inner.clock.schedule(
            self.inner.config.win_reset_delay(),
            Box::new(move || {
                let Some(game) = upgrade(&weak) else {
                    return;
                };
                let pairs = {
                    let st = game.inner.state.borrow();
                    if st.generation != generation || !st.win_pending {
                        return;
                    }
                    st.pairs
                };
                if let Err(err) = game.new_game(pairs) {
                    warn!(error = %err, "redeal after win failed");
                }
            }),
        );
    }
}

fn upgrade(weak: &Weak<Inner>) -> Option<MatchGame> {
    weak.upgrade().map(|inner| MatchGame { inner })
}

fn card_changed(deck: &[Card], index: usize, state: FlipState) -> GameEvent {
    GameEvent::CardChanged {
        index,
        face: deck[index].face,
        state,
    }
}
