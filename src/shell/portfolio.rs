use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use tracing::{debug, info};

use super::catalog::{DRAWING_SECTION, GAME_SECTION, PROFILE_SECTION, SectionCatalog};
use super::sections::{Activation, Section, SectionManager};
use crate::error::SectionError;
use crate::game::{Clock, GameConfig, GameEvent, Listener, MatchGame};
use crate::sketch::SketchPad;

pub const DEFAULT_CANVAS_SIZE: (u32, u32) = (800, 500);

pub struct ProfileSection;

impl Section for ProfileSection {
    fn init(&self) -> LocalBoxFuture<'_, Result<(), SectionError>> {
        Box::pin(async { Ok(()) })
    }
}

pub struct SketchSection {
    pad: RefCell<SketchPad>,
    size: Cell<(u32, u32)>,
}

impl SketchSection {
    pub fn new(size: (u32, u32)) -> Self {
        SketchSection {
            pad: RefCell::new(SketchPad::new()),
            size: Cell::new(size),
        }
    }

    /// Size applied by the next init.
    pub fn set_size(&self, width: u32, height: u32) {
        self.size.set((width, height));
    }

    pub fn pad(&self) -> &RefCell<SketchPad> {
        &self.pad
    }
}

impl Section for SketchSection {
    fn init(&self) -> LocalBoxFuture<'_, Result<(), SectionError>> {
        Box::pin(async move {
            let (width, height) = self.size.get();
            if width == 0 || height == 0 {
                return Err(SectionError::Setup(format!(
                    "canvas has no area ({width}x{height})"
                )));
            }
            self.pad.borrow_mut().resize(width, height);
            Ok(())
        })
    }

    fn cleanup(&self) -> LocalBoxFuture<'_, ()> {
        Box::pin(async move {
            self.pad.borrow_mut().abort();
        })
    }
}

/// Owns the game instance. It is created by the first activation and kept
/// for the rest of the session.
pub struct GameSection {
    config: GameConfig,
    clock: Rc<dyn Clock>,
    listeners: RefCell<Vec<Listener>>,
    game: RefCell<Option<MatchGame>>,
}

impl GameSection {
    pub fn new(config: GameConfig, clock: Rc<dyn Clock>) -> Self {
        GameSection {
            config,
            clock,
            listeners: RefCell::new(Vec::new()),
            game: RefCell::new(None),
        }
    }

    pub fn subscribe(&self, listener: impl Fn(&GameEvent) + 'static) {
        let listener: Listener = Rc::new(listener);
        if let Some(game) = self.game() {
            game.subscribe_shared(listener.clone());
        }
        self.listeners.borrow_mut().push(listener);
    }

    pub fn game(&self) -> Option<MatchGame> {
        self.game.borrow().clone()
    }
}

impl Section for GameSection {
    fn init(&self) -> LocalBoxFuture<'_, Result<(), SectionError>> {
        Box::pin(async move {
            let game = MatchGame::new(self.config.clone(), self.clock.clone());
            for listener in self.listeners.borrow().iter() {
                game.subscribe_shared(listener.clone());
            }
            *self.game.borrow_mut() = Some(game.clone());
            if let Err(err) = game.start() {
                self.game.borrow_mut().take();
                return Err(SectionError::Setup(err.to_string()));
            }
            Ok(())
        })
    }

    fn cleanup(&self) -> LocalBoxFuture<'_, ()> {
        Box::pin(async move {
            if let Some(game) = self.game() {
                debug!("settling game before leaving");
                game.settle();
            }
        })
    }
}

/// The standard set of portfolio sections wired into one manager.
pub struct Portfolio {
    pub manager: Rc<SectionManager>,
    pub catalog: SectionCatalog,
    pub sketch: Rc<SketchSection>,
    pub game: Rc<GameSection>,
}

impl Portfolio {
    pub fn build(config: GameConfig, clock: Rc<dyn Clock>) -> Result<Self, SectionError> {
        let manager = Rc::new(SectionManager::new());
        let catalog = SectionCatalog::portfolio();
        let sketch = Rc::new(SketchSection::new(DEFAULT_CANVAS_SIZE));
        let game = Rc::new(GameSection::new(config, clock));

        manager.register(PROFILE_SECTION, Rc::new(ProfileSection))?;
        manager.register(DRAWING_SECTION, sketch.clone())?;
        manager.register(GAME_SECTION, game.clone())?;

        Ok(Portfolio {
            manager,
            catalog,
            sketch,
            game,
        })
    }

    /// Shows the default section.
    pub async fn start(&self) -> Activation {
        match self.catalog.default_section() {
            Some(id) => self.manager.activate(id).await,
            None => Activation::Unknown,
        }
    }

    pub async fn open(&self, id: &str) -> Activation {
        self.manager.activate(id).await
    }

    /// Navigates to whatever section the query names. `None` when nothing
    /// matches.
    pub async fn search(&self, query: &str) -> Option<Activation> {
        let id = self.catalog.resolve(query)?.to_string();
        info!(query, section = %id, "search resolved");
        Some(self.manager.activate(&id).await)
    }
}
