//! View rendering modules

mod history;

pub use history::{diff_lines, display_hunks, render_history, DiffStyle};
