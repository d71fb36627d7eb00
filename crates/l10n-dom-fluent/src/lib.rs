#![doc = include_str!("../README.md")]

pub mod engine;
pub mod fallback;
pub mod inline;
pub mod pseudo;

pub use engine::{FluentEngine, LOCALE_PLACEHOLDER};
pub use pseudo::PseudoStrategy;
