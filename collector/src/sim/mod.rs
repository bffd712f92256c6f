pub mod model;
pub mod state;

pub use model::{round_to, SimulatedStateModel, LANDING_THRESHOLD};
pub use state::{SimState, BASE_STEP};
