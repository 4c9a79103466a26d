mod controller;
mod error;
mod prompt;
mod scheduler;
mod state;

pub use controller::Controller;
pub use error::EngineError;
pub use scheduler::{Scheduler, SchedulerConfig};
pub use state::CampaignState;
