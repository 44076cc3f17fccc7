// App module for civic-dash
// Handles page state, background requests and user input

pub mod actions;
pub mod input;
pub mod page;
pub mod state;

pub use actions::{AppActions, FetchOutcome};
pub use input::handle_input;
pub use page::{LoadState, Page, PageLoad, ViewTicket};
pub use state::{App, HeatmapStats, UrgencyFilter};
