//! GTK 4 / libadwaita front end over the [`crate::shell`] sections.

pub mod app;
pub mod board;
pub mod canvas;
