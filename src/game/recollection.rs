use std::collections::BTreeMap;

use super::engine::GameEvent;
use super::state::{FaceId, FlipState};

/// Memory of every face seen so far. Drives the scripted player in the
/// headless demo: it never forgets, so each pair costs at most one mismatch.
#[derive(Debug, Default)]
pub struct Recollection {
    seen: BTreeMap<usize, FaceId>,
    matched: Vec<bool>,
}

impl Recollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, event: &GameEvent) {
        match *event {
            GameEvent::Dealt { pairs, .. } => {
                self.seen.clear();
                self.matched = vec![false; pairs * 2];
            }
            GameEvent::CardChanged { index, face, state } => match state {
                FlipState::Revealed => {
                    self.seen.insert(index, face);
                }
                FlipState::Matched => {
                    self.seen.remove(&index);
                    if let Some(slot) = self.matched.get_mut(index) {
                        *slot = true;
                    }
                }
                FlipState::Hidden => {}
            },
            _ => {}
        }
    }

    /// Picks the next card to flip given the currently selected ones.
    pub fn next_pick(&self, selection: &[usize]) -> Option<usize> {
        let open = |idx: usize| !self.matched.get(idx).copied().unwrap_or(true);

        if let Some(&first) = selection.first() {
            let known_partner = self.seen.get(&first).and_then(|face| {
                self.seen
                    .iter()
                    .find(|&(&idx, f)| idx != first && f == face && open(idx))
                    .map(|(&idx, _)| idx)
            });
            return known_partner
                .or_else(|| self.first_unseen(|idx| idx != first))
                .or_else(|| self.seen.keys().copied().find(|&idx| idx != first && open(idx)));
        }

        self.known_pair()
            .or_else(|| self.first_unseen(|_| true))
            .or_else(|| self.seen.keys().copied().find(|&idx| open(idx)))
    }

    fn known_pair(&self) -> Option<usize> {
        let mut by_face: BTreeMap<FaceId, usize> = BTreeMap::new();
        for (&idx, &face) in &self.seen {
            if by_face.insert(face, idx).is_some() {
                return Some(idx);
            }
        }
        None
    }

    fn first_unseen(&self, allow: impl Fn(usize) -> bool) -> Option<usize> {
        (0..self.matched.len())
            .find(|&idx| !self.matched[idx] && !self.seen.contains_key(&idx) && allow(idx))
    }
}
