pub mod demo;
pub mod error;
pub mod game;
pub mod logging;
#[cfg(feature = "gui")]
pub mod render;
pub mod shell;
pub mod sketch;

#[cfg(feature = "gui")]
pub mod ui;
