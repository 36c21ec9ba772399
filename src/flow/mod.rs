//! Authentication flow: execute an intent, then decide where to land.

pub mod coordinator;
pub mod outcome;
pub mod redirect;

pub use coordinator::FlowCoordinator;
pub use outcome::{AuthOutcome, FlowPhase};
pub use redirect::{Navigation, RedirectPolicy};
