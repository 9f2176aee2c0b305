pub mod gate;

pub use gate::{decide, AccessDenied, AccessGate, AccessLevel, AccessNeed};
