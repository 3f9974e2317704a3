mod app_state;
mod components;
mod frame;

pub use app_state::AppState;
pub use frame::{FrameSink, SharedFrame};
