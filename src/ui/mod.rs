pub mod app;
pub mod components;
pub mod controller;
pub mod state;

pub use app::ChatApp;
pub use controller::{ChatController, ScrollSurface};
pub use state::{ScrollMetrics, ViewSettings, ViewState};
