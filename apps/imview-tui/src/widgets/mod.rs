//! Custom widgets for the TUI

mod control_indicator;

pub use control_indicator::ControlIndicator;
