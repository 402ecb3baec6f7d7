pub mod analyze;
pub mod config;
pub mod heuristics;
pub mod tags;

pub use analyze::*;
pub use config::*;
pub use heuristics::*;
pub use tags::*;
