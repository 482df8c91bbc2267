//! Aggregated display state and its terminal rendering.

mod render;
mod state;

pub use render::{Renderer, problem_summary, status_line};
pub use state::{DisplayState, ProblemCounts};
