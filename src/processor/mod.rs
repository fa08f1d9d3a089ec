pub mod warning_processor;

pub use warning_processor::{PostOutcome, WarningProcessor};
