//! Navigation shell: section lifecycle, catalog, theme preference.

pub mod catalog;
pub mod portfolio;
pub mod sections;
pub mod theme;

pub use catalog::SectionCatalog;
pub use portfolio::{GameSection, Portfolio, SketchSection};
pub use sections::{Activation, Section, SectionManager, SectionState};
pub use theme::{Preferences, Theme, ThemeController};
