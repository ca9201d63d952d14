//! Headless run of the portfolio on the glib main loop: walk through the
//! sections, then let a player with perfect recall clear one round.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::game::{Clock, FlipOutcome, GameConfig, GameEvent, GlibClock, MatchGame, Recollection};
use crate::shell::catalog::GAME_SECTION;
use crate::shell::theme::{self, ThemeController};
use crate::shell::Portfolio;

const PLAYER_STEP_MS: u64 = 150;

/// One move of the scripted player. Returns `None` once there is nothing
/// left to pick.
pub fn player_step(game: &MatchGame, memory: &RefCell<Recollection>) -> Option<FlipOutcome> {
    if game.is_complete() {
        return None;
    }
    if game.is_locked() {
        return Some(FlipOutcome::Rejected);
    }
    let pick = memory.borrow().next_pick(&game.selection())?;
    Some(game.flip(pick))
}

pub fn run() -> glib::ExitCode {
    let themes = ThemeController::load(theme::default_path(), false);
    info!(theme = ?themes.current(), "preferences loaded");

    let clock: Rc<dyn Clock> = Rc::new(GlibClock);
    let portfolio = match Portfolio::build(GameConfig::default(), clock) {
        Ok(portfolio) => Rc::new(portfolio),
        Err(err) => {
            error!(error = %err, "failed to assemble sections");
            return glib::ExitCode::FAILURE;
        }
    };

    let main_loop = glib::MainLoop::new(None, false);
    let memory = Rc::new(RefCell::new(Recollection::new()));

    portfolio.game.subscribe({
        let memory = memory.clone();
        let main_loop = main_loop.clone();
        move |event| {
            memory.borrow_mut().observe(event);
            match event {
                GameEvent::Won { matched_pairs } => {
                    info!(matched_pairs, "round cleared");
                    main_loop.quit();
                }
                GameEvent::MismatchFlagged { pair } => debug!(?pair, "wrong guess"),
                other => debug!(?other, "game event"),
            }
        }
    });

    glib::MainContext::default().spawn_local({
        let portfolio = portfolio.clone();
        let main_loop = main_loop.clone();
        async move {
            portfolio.start().await;
            portfolio.search("sketch").await;
            portfolio.open(GAME_SECTION).await;

            let Some(game) = portfolio.game.game() else {
                error!("game section did not produce a game");
                main_loop.quit();
                return;
            };
            glib::timeout_add_local(Duration::from_millis(PLAYER_STEP_MS), move || {
                match player_step(&game, &memory) {
                    Some(_) => glib::ControlFlow::Continue,
                    None => glib::ControlFlow::Break,
                }
            });
        }
    });

    main_loop.run();
    info!(section = ?portfolio.manager.current_section(), "demo finished");
    glib::ExitCode::SUCCESS
}
