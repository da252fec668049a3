pub mod app;
pub mod ui;
pub mod snapshot;
pub mod widgets;
pub mod keys;

pub use app::TuiApp;
pub use ui::run_tui;
