pub mod amount;
pub mod catalog;
pub mod config;
pub mod csv;
pub mod engine;
pub mod model;
pub mod reserve;

pub use amount::Amount;
pub use config::MachineConfig;
pub use engine::{Engine, EngineError};
pub use model::{Command, Denomination, Outcome};
