pub mod chrome;
pub mod dashboard;
pub mod detect;
pub mod heatmap;
pub mod history;
