pub mod environment;
pub mod paths;
pub mod terminal;

pub use environment::{get_claude_dir, get_projects_dir, get_state_dir};
pub use paths::{expand_tilde, format_path_with_tilde, relative_display};
pub use terminal::{display_line, sanitize_for_terminal};
