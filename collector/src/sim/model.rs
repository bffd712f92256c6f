use common_data::avionics::data::telemetry::{Location, Motor, Telemetry};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::state::{SimState, BASE_STEP};

/// Strictly below this charge the vehicle is considered landed.
pub const LANDING_THRESHOLD: f64 = 1.8;

const DRIFT: f64 = BASE_STEP * 0.7;

const AIRBORNE_TEMP: f64 = 42.0;
const LANDED_TEMP: f64 = 23.7;

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Evolves a `SimState` once per tick and derives a telemetry record from it.
pub struct SimulatedStateModel {
    thing_name: String,
    state: SimState,
    rng: StdRng,
}

impl SimulatedStateModel {
    pub fn new(thing_name: String) -> SimulatedStateModel {
        let mut rng = StdRng::from_entropy();
        let state = SimState::random(&mut rng);
        Self::with_state(thing_name, state, rng)
    }

    pub fn with_state(thing_name: String, state: SimState, rng: StdRng) -> SimulatedStateModel {
        SimulatedStateModel {
            thing_name,
            state,
            rng,
        }
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn is_landed(&self) -> bool {
        self.state.battery_percent < LANDING_THRESHOLD
    }

    /// Advances the state by one tick and returns the matching record.
    ///
    /// Airborne ticks drain the battery by `U[0, 0.1)` and random-walk the
    /// position by up to `DRIFT` per axis. Landed ticks leave the state alone
    /// and report idle motors.
    pub fn derive_snapshot(&mut self, timestamp_ms: i64) -> Telemetry {
        let health = !self.is_landed();

        let (base_rpm, base_temp) = if health {
            self.state.battery_percent -= self.rng.gen::<f64>() / 10.0;
            self.state.latitude += self.rng.gen_range(-DRIFT..=DRIFT);
            self.state.longitude += self.rng.gen_range(-DRIFT..=DRIFT);
            (1.0, AIRBORNE_TEMP)
        } else {
            (0.0, LANDED_TEMP)
        };

        return Telemetry {
            sample: true,
            timestamp: timestamp_ms,
            thing_name: self.thing_name.clone(),
            health,
            location: Location {
                latitude: round_to(self.state.latitude, 6),
                longitude: round_to(self.state.longitude, 6),
            },
            battery_percent: round_to(self.state.battery_percent, 2),
            motor_a: self.motor(base_rpm, base_temp),
            motor_b: self.motor(base_rpm, base_temp),
            motor_c: self.motor(base_rpm, base_temp),
            motor_d: self.motor(base_rpm, base_temp),
        };
    }

    fn motor(&mut self, base_rpm: f64, base_temp: f64) -> Motor {
        let rpm = (base_rpm * (3065.0 + self.rng.gen::<f64>() * 21.0)).round() as i64;
        let temperature = round_to(base_temp + self.rng.gen::<f64>() * 3.0, 1);
        Motor { rpm, temperature }
    }
}
