use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::GameError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FaceId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlipState {
    Hidden,
    Revealed,
    Matched,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Card {
    pub face: FaceId,
    pub state: FlipState,
    /// Set between the mismatch flag and the flip back; not part of `state`.
    pub mismatched: bool,
}

impl Card {
    fn hidden(face: FaceId) -> Self {
        Card {
            face,
            state: FlipState::Hidden,
            mismatched: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub pairs: usize,
    pub mismatch_flag_ms: u64,
    pub mismatch_reset_ms: u64,
    pub win_reset_ms: u64,
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            pairs: 8,
            mismatch_flag_ms: 400,
            mismatch_reset_ms: 800,
            win_reset_ms: 1000,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn mismatch_flag_delay(&self) -> Duration {
        Duration::from_millis(self.mismatch_flag_ms)
    }

    pub fn mismatch_reset_delay(&self) -> Duration {
        Duration::from_millis(self.mismatch_reset_ms)
    }

    pub fn win_reset_delay(&self) -> Duration {
        Duration::from_millis(self.win_reset_ms)
    }
}

/// What a single accepted or rejected flip led to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlipOutcome {
    Rejected,
    Waiting,
    Matched,
    Mismatched,
    Won,
}

/// Pure game state. Timing lives in [`super::engine::MatchGame`].
pub struct GameState {
    pub deck: Vec<Card>,
    pub selection: Vec<usize>,
    pub matched_pairs: usize,
    pub input_locked: bool,
    pub pairs: usize,
    pub generation: u64,
    pub win_pending: bool,
    rng: StdRng,
}

impl GameState {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        GameState {
            deck: Vec::new(),
            selection: Vec::with_capacity(2),
            matched_pairs: 0,
            input_locked: false,
            pairs: 0,
            generation: 0,
            win_pending: false,
            rng,
        }
    }

    pub fn deal(&mut self, pairs: usize) -> Result<(), GameError> {
        if pairs == 0 {
            return Err(GameError::NoPairs);
        }
        self.generation = self.generation.wrapping_add(1);
        self.pairs = pairs;
        self.matched_pairs = 0;
        self.selection.clear();
        self.input_locked = false;
        self.win_pending = false;

        let mut faces: Vec<FaceId> = (0..pairs as u32)
            .flat_map(|face| [FaceId(face), FaceId(face)])
            .collect();
        faces.shuffle(&mut self.rng);

        self.deck = faces.into_iter().map(Card::hidden).collect();
        Ok(())
    }

    pub fn flip(&mut self, index: usize) -> FlipOutcome {
        if self.input_locked || self.selection.len() >= 2 {
            return FlipOutcome::Rejected;
        }
        let Some(card) = self.deck.get_mut(index) else {
            return FlipOutcome::Rejected;
        };
        if card.state != FlipState::Hidden || self.selection.contains(&index) {
            return FlipOutcome::Rejected;
        }

        card.state = FlipState::Revealed;
        self.selection.push(index);

        if self.selection.len() < 2 {
            return FlipOutcome::Waiting;
        }

        self.input_locked = true;
        let (first, second) = (self.selection[0], self.selection[1]);
        if self.deck[first].face != self.deck[second].face {
            return FlipOutcome::Mismatched;
        }

        self.deck[first].state = FlipState::Matched;
        self.deck[second].state = FlipState::Matched;
        self.matched_pairs += 1;
        self.selection.clear();
        self.input_locked = false;

        if self.matched_pairs == self.pairs {
            self.win_pending = true;
            FlipOutcome::Won
        } else {
            FlipOutcome::Matched
        }
    }

    /// Marks the pending pair as mismatched. Returns the pair, or `None`
    /// when nothing is waiting to be resolved.
    pub fn flag_mismatch(&mut self) -> Option<[usize; 2]> {
        let pair = self.pending_pair()?;
        for idx in pair {
            self.deck[idx].mismatched = true;
        }
        Some(pair)
    }

    /// Flips the pending pair face down and unlocks input.
    pub fn clear_mismatch(&mut self) -> Option<[usize; 2]> {
        let pair = self.pending_pair()?;
        for idx in pair {
            let card = &mut self.deck[idx];
            card.state = FlipState::Hidden;
            card.mismatched = false;
        }
        self.selection.clear();
        self.input_locked = false;
        Some(pair)
    }

    fn pending_pair(&self) -> Option<[usize; 2]> {
        match self.selection.as_slice() {
            &[first, second] if self.input_locked => Some([first, second]),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.pairs > 0 && self.matched_pairs == self.pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dealt(pairs: usize) -> GameState {
        let mut st = GameState::new(Some(7));
        st.deal(pairs).unwrap();
        st
    }

    fn partner_of(st: &GameState, index: usize) -> usize {
        let face = st.deck[index].face;
        (0..st.deck.len())
            .find(|&i| i != index && st.deck[i].face == face)
            .unwrap()
    }

    fn stranger_of(st: &GameState, index: usize) -> usize {
        let face = st.deck[index].face;
        (0..st.deck.len()).find(|&i| st.deck[i].face != face).unwrap()
    }

    #[test]
    fn zero_pairs_is_rejected() {
        let mut st = GameState::new(Some(1));
        assert_eq!(st.deal(0), Err(GameError::NoPairs));
        assert!(st.deck.is_empty());
    }

    #[test]
    fn deal_resets_counters_and_bumps_generation() {
        let mut st = dealt(3);
        let first_gen = st.generation;
        let partner = partner_of(&st, 0);
        st.flip(0);
        st.flip(partner);
        assert_eq!(st.matched_pairs, 1);

        st.deal(3).unwrap();
        assert_eq!(st.matched_pairs, 0);
        assert!(st.selection.is_empty());
        assert!(!st.input_locked);
        assert_eq!(st.generation, first_gen + 1);
        assert!(st.deck.iter().all(|c| c.state == FlipState::Hidden));
    }

    #[test]
    fn same_card_twice_is_rejected() {
        let mut st = dealt(4);
        assert_eq!(st.flip(2), FlipOutcome::Waiting);
        assert_eq!(st.flip(2), FlipOutcome::Rejected);
        assert_eq!(st.selection, vec![2]);
    }

    #[test]
    fn out_of_range_is_rejected() {
        let mut st = dealt(2);
        assert_eq!(st.flip(4), FlipOutcome::Rejected);
        assert!(st.selection.is_empty());
    }

    #[test]
    fn third_flip_while_resolving_is_rejected() {
        let mut st = dealt(4);
        let other = stranger_of(&st, 0);
        st.flip(0);
        assert_eq!(st.flip(other), FlipOutcome::Mismatched);
        assert!(st.input_locked);

        let third = (0..st.deck.len()).find(|&i| i != 0 && i != other).unwrap();
        assert_eq!(st.flip(third), FlipOutcome::Rejected);
        assert_eq!(st.deck[third].state, FlipState::Hidden);
    }

    #[test]
    fn mismatch_flag_then_clear() {
        let mut st = dealt(4);
        let other = stranger_of(&st, 0);
        st.flip(0);
        st.flip(other);

        assert_eq!(st.flag_mismatch(), Some([0, other]));
        assert!(st.deck[0].mismatched && st.deck[other].mismatched);
        assert_eq!(st.deck[0].state, FlipState::Revealed);

        assert_eq!(st.clear_mismatch(), Some([0, other]));
        assert_eq!(st.deck[0].state, FlipState::Hidden);
        assert!(!st.deck[other].mismatched);
        assert!(!st.input_locked);
        assert_eq!(st.clear_mismatch(), None);
    }

    #[test]
    fn last_pair_reports_win() {
        let mut st = dealt(1);
        st.flip(0);
        assert_eq!(st.flip(1), FlipOutcome::Won);
        assert!(st.is_complete());
        assert!(st.win_pending);
    }
}
