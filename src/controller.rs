pub mod clock;
pub mod controller_handler;
pub mod types;

pub use clock::CycleClock;
pub use controller_handler::Controller;
pub use types::{CycleReport, MonitorState, MonitorStats};
