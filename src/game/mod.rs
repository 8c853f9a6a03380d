pub mod controller;
pub mod session;
pub mod simulator;
pub mod state;

pub use controller::SessionController;
pub use hit_test::TapOutcome;
pub use session::{FinishedSession, GameSession, SessionInput, SessionOutput, SessionSnapshot};
pub use state::{SessionState, SessionStatus};
