use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gtk4 as gtk;
use gtk4::prelude::*;

use crate::game::{FaceId, FlipState, GameEvent};
use crate::shell::GameSection;

pub const TILE_GAP: i32 = 6;
const BOARD_COLUMNS: usize = 4;
const HIDDEN_LABEL: &str = "?";

const SYMBOLS: [&str; 24] = [
    "🐶", "🐱", "🦊", "🐼", "🐨", "🐯", "🦁", "🐸", "🐙", "🦋", "🐢", "🐬",
    "🍎", "🍋", "🍇", "🍓", "🥝", "🍒", "⚽", "🎨", "🎲", "🚀", "🌙", "⛵",
];

pub fn face_symbol(face: FaceId) -> &'static str {
    SYMBOLS[face.0 as usize % SYMBOLS.len()]
}

/// Card grid for the game section. Purely a view: it redraws from
/// [`GameEvent`]s and forwards clicks to the section's game.
pub struct Board {
    root: gtk::Box,
    status: gtk::Label,
    grid: gtk::Grid,
    buttons: RefCell<Vec<(gtk::Button, gtk::Label)>>,
    section: Weak<GameSection>,
}

impl Board {
    pub fn new(section: &Rc<GameSection>) -> Rc<Self> {
        let root = gtk::Box::new(gtk::Orientation::Vertical, 12);
        root.set_margin_top(12);
        root.set_margin_bottom(12);
        root.set_margin_start(12);
        root.set_margin_end(12);

        let status = gtk::Label::new(None);
        status.add_css_class("title-4");

        let grid = gtk::Grid::new();
        grid.add_css_class("folio-board");
        grid.set_row_spacing(TILE_GAP as u32);
        grid.set_column_spacing(TILE_GAP as u32);
        grid.set_halign(gtk::Align::Center);
        grid.set_valign(gtk::Align::Center);
        grid.set_hexpand(true);
        grid.set_vexpand(true);

        root.append(&status);
        root.append(&grid);

        Rc::new(Board {
            root,
            status,
            grid,
            buttons: RefCell::new(Vec::new()),
            section: Rc::downgrade(section),
        })
    }

    pub fn widget(&self) -> &gtk::Box {
        &self.root
    }

    pub fn apply(&self, event: &GameEvent) {
        match *event {
            GameEvent::Dealt { pairs, .. } => {
                self.rebuild(pairs * 2);
                self.status.set_text("Find the pairs");
            }
            GameEvent::CardChanged { index, face, state } => {
                let buttons = self.buttons.borrow();
                let Some((button, label)) = buttons.get(index) else {
                    return;
                };
                button.remove_css_class("active");
                button.remove_css_class("matched");
                match state {
                    FlipState::Hidden => label.set_text(HIDDEN_LABEL),
                    FlipState::Revealed => {
                        label.set_text(face_symbol(face));
                        button.add_css_class("active");
                    }
                    FlipState::Matched => {
                        label.set_text(face_symbol(face));
                        button.add_css_class("matched");
                    }
                }
            }
            GameEvent::MismatchFlagged { pair } => self.toggle_shake(pair, true),
            GameEvent::MismatchCleared { pair } => self.toggle_shake(pair, false),
            GameEvent::Won { matched_pairs } => {
                self.status
                    .set_text(&format!("All {matched_pairs} pairs found! Dealing again…"));
            }
        }
    }

    fn toggle_shake(&self, pair: [usize; 2], on: bool) {
        let buttons = self.buttons.borrow();
        for idx in pair {
            if let Some((button, _)) = buttons.get(idx) {
                if on {
                    button.add_css_class("mismatch-shake");
                } else {
                    button.remove_css_class("mismatch-shake");
                }
            }
        }
    }

    fn rebuild(&self, cards: usize) {
        while let Some(child) = self.grid.first_child() {
            self.grid.remove(&child);
        }

        let mut buttons = Vec::with_capacity(cards);
        for index in 0..cards {
            let label = gtk::Label::new(Some(HIDDEN_LABEL));
            label.add_css_class("folio-card-label");

            let button = gtk::Button::builder()
                .css_classes(vec!["folio-card"])
                .width_request(72)
                .height_request(72)
                .build();
            button.set_child(Some(&label));

            let section = self.section.clone();
            button.connect_clicked(move |_| {
                if let Some(game) = section.upgrade().and_then(|s| s.game()) {
                    game.flip(index);
                }
            });

            let x = (index % BOARD_COLUMNS) as i32;
            let y = (index / BOARD_COLUMNS) as i32;
            self.grid.attach(&button, x, y, 1, 1);
            buttons.push((button, label));
        }

        *self.buttons.borrow_mut() = buttons;
    }
}
