pub mod filter_input;
pub mod grid_cursor;
pub mod pane_chrome;
pub mod status_bar;
pub mod toast;
