pub mod prefixes;
pub mod refresh;
pub mod setup;
pub mod ui;
