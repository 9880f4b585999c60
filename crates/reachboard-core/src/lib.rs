pub mod chart;
pub mod config_manager;
pub mod dashboard;
pub mod embed;
pub mod error;
pub mod frames;
pub mod loader;
pub mod series;
pub mod state;
pub mod types;

pub use chart::*;
pub use config_manager::*;
pub use dashboard::*;
pub use embed::*;
pub use error::*;
pub use frames::*;
pub use loader::*;
pub use series::*;
pub use state::*;
pub use types::*;
