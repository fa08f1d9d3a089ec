pub mod payload;
pub mod request;
pub mod warning;

pub use request::{QueryKind, WarningRequest};
pub use warning::{ContactInfo, WarningRecord};
