//! CodeCraft Playground - the logic behind the CSS playground widgets
//!
//! Color conversion for the color picker, the selector equivalence checker
//! and the selector quiz built on top of it.

pub mod checker;
pub mod color;
mod error;
pub mod level;
pub mod quiz;

pub use checker::{check, check_with_context, Verdict};
pub use color::{hsl_to_rgb, rgb_to_hex, rgb_to_hsl, rgb_to_hsl_precise, Hsl, PreciseHsl, Rgb};
pub use error::{PlaygroundError, PlaygroundResult};
pub use level::{Level, LevelSet};
pub use quiz::{Advance, Outcome, QuizConfig, QuizSession, HIGHLIGHT_CLASS};
