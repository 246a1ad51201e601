pub mod chrome;
pub mod post_card;
pub mod ui;
