//! Terminal rendering: panel widgets, dashboard chrome, and themes.

pub mod chrome;
pub mod render;
pub mod theme;

pub use theme::{Theme, ThemeName};
