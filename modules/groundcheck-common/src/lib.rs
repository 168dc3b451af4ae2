pub mod config;
pub mod error;
pub mod text;
pub mod types;
pub mod verdict;

pub use config::{Config, RhetoricMode};
pub use error::GroundcheckError;
pub use text::{truncate_head_tail, Truncated, TRUNCATION_MARKER};
pub use types::*;
pub use verdict::{Verdict, VerdictLabel};
