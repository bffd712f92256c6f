use rand::Rng;

pub const BASE_STEP: f64 = 0.002;

/// Physical state of the simulated vehicle. Lives for the whole process and
/// is only touched by the tick that owns the model.
#[derive(Debug, Clone, PartialEq)]
pub struct SimState {
    pub battery_percent: f64,
    pub latitude: f64,
    pub longitude: f64,
    // Initialised but never applied to the position walk.
    pub speed_long: f64,
    pub speed_lat: f64,
}

impl SimState {
    /// Battery starts somewhere between 80% and 100%; the position is fixed.
    pub fn random<R: Rng>(rng: &mut R) -> SimState {
        return SimState {
            battery_percent: (1.0 - rng.gen::<f64>() / 5.0) * 100.0,
            latitude: 11.57549,
            longitude: 48.15743,
            speed_long: rng.gen_range(-BASE_STEP..=BASE_STEP),
            speed_lat: rng.gen_range(-BASE_STEP..=BASE_STEP),
        };
    }
}
