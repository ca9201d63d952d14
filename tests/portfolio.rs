use std::cell::RefCell;
use std::rc::Rc;

use folio::game::{FlipState, GameConfig, GameEvent, ManualClock};
use folio::shell::catalog::{DRAWING_SECTION, GAME_SECTION, PROFILE_SECTION};
use folio::shell::{Activation, Portfolio, SectionState};
use folio::sketch::{Point, Tool};
use futures::executor::block_on;

fn portfolio() -> (Portfolio, Rc<ManualClock>) {
    let clock = Rc::new(ManualClock::new());
    let config = GameConfig {
        seed: Some(42),
        ..GameConfig::default()
    };
    let portfolio = Portfolio::build(config, clock.clone()).unwrap();
    (portfolio, clock)
}

#[test]
fn starts_on_profile() {
    let (portfolio, _clock) = portfolio();
    assert_eq!(block_on(portfolio.start()), Activation::Initialized);
    assert_eq!(portfolio.manager.current_section().as_deref(), Some(PROFILE_SECTION));
    assert_eq!(portfolio.manager.state(GAME_SECTION), Some(SectionState::Uninitialized));
    assert!(portfolio.game.game().is_none());
}

#[test]
fn game_is_built_once_and_rendered_on_first_visit() {
    let (portfolio, _clock) = portfolio();
    let dealt = Rc::new(RefCell::new(0));
    {
        let dealt = dealt.clone();
        portfolio.game.subscribe(move |event| {
            if matches!(event, GameEvent::Dealt { .. }) {
                *dealt.borrow_mut() += 1;
            }
        });
    }

    block_on(portfolio.start());
    assert_eq!(block_on(portfolio.open(GAME_SECTION)), Activation::Initialized);
    let game = portfolio.game.game().unwrap();
    assert_eq!(game.len(), 16);

    block_on(portfolio.open(PROFILE_SECTION));
    assert_eq!(block_on(portfolio.open(GAME_SECTION)), Activation::Resumed);
    assert_eq!(*dealt.borrow(), 1);
    assert_eq!(game.generation(), portfolio.game.game().unwrap().generation());
}

#[test]
fn leaving_the_game_settles_a_pending_mismatch() {
    let (portfolio, clock) = portfolio();
    block_on(portfolio.open(GAME_SECTION));
    let game = portfolio.game.game().unwrap();

    let face = game.card(0).unwrap().face;
    let other = (0..game.len()).find(|&i| game.card(i).unwrap().face != face).unwrap();
    game.flip(0);
    game.flip(other);
    assert!(game.is_locked());

    block_on(portfolio.open(DRAWING_SECTION));
    assert!(!game.is_locked());
    assert_eq!(game.card(0).unwrap().state, FlipState::Hidden);

    clock.advance_ms(2_000);
    assert!(game.selection().is_empty());
}

#[test]
fn sketch_init_sizes_the_canvas_and_cleanup_drops_the_drag() {
    let (portfolio, _clock) = portfolio();
    portfolio.sketch.set_size(320, 240);
    block_on(portfolio.open(DRAWING_SECTION));
    assert_eq!(portfolio.sketch.pad().borrow().size(), (320, 240));

    {
        let mut pad = portfolio.sketch.pad().borrow_mut();
        pad.tool = Tool::Circle;
        pad.begin(Point::new(10.0, 10.0));
        pad.extend(Point::new(20.0, 10.0));
    }
    block_on(portfolio.open(PROFILE_SECTION));
    assert!(!portfolio.sketch.pad().borrow().is_drawing());
}

#[test]
fn zero_sized_canvas_fails_and_retries() {
    let (portfolio, _clock) = portfolio();
    portfolio.sketch.set_size(0, 0);
    assert_eq!(block_on(portfolio.open(DRAWING_SECTION)), Activation::InitFailed);
    assert_eq!(portfolio.manager.state(DRAWING_SECTION), Some(SectionState::Uninitialized));

    portfolio.sketch.set_size(100, 100);
    assert_eq!(block_on(portfolio.open(DRAWING_SECTION)), Activation::Initialized);
}

#[test]
fn search_navigates() {
    let (portfolio, _clock) = portfolio();
    assert_eq!(block_on(portfolio.search("cards")), Some(Activation::Initialized));
    assert_eq!(portfolio.manager.current_section().as_deref(), Some(GAME_SECTION));
    assert_eq!(block_on(portfolio.search("nothing here")), None);
    assert_eq!(portfolio.manager.current_section().as_deref(), Some(GAME_SECTION));
}
