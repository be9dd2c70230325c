pub mod cards;
pub mod header;
pub mod help_overlay;
pub mod listing_pane;
