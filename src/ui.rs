//! Ratatui front-end. A login screen gates one desk, billing or library,
//! chosen on the command line. Keyboard handling lives in `app`, the raw
//! terminal setup and draw loop in `terminal`.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
