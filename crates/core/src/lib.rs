pub mod config;
pub mod error;
pub mod frame;
pub mod level;
pub mod metric;
pub mod state;

pub use config::Config;
pub use error::*;
pub use frame::*;
pub use level::*;
pub use metric::*;
pub use state::*;
