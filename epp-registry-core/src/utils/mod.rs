//! 工具模块

pub mod clock;
pub mod datetime;

pub use clock::{Clock, SystemClock};
