pub mod interaction;
pub mod ui;
