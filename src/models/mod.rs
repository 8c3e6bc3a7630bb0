pub mod anomaly;
pub mod event;

pub use anomaly::{Aggregate, Anomaly, AnomalyKind, Severity, MULTIPLE_USERS};
pub use event::{Action, AuthEvent};
