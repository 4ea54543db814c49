//! Device context: owns every hardware handle the cycle needs.
//!
//! Built once in `main()` where peripheral ownership is established and
//! passed by `&mut` to the controller on each iteration.  Tests build the
//! same struct out of mock ports.

/// Bundle of port implementations.
pub struct Device<S, A, B, P, L> {
    /// CO2 / T / RH sensor ([`GasSensorPort`](super::ports::GasSensorPort)).
    pub sensor: S,
    /// Buzzer ([`AlertSignaler`](super::ports::AlertSignaler)).
    pub alert: A,
    /// Battery signals ([`BatteryPort`](super::ports::BatteryPort)).
    pub battery: B,
    /// Sleep / reset primitives ([`PlatformPort`](super::ports::PlatformPort)).
    pub platform: P,
    /// Status light ([`IndicatorPort`](super::ports::IndicatorPort)).
    pub indicator: L,
}

impl<S, A, B, P, L> Device<S, A, B, P, L> {
    pub fn new(sensor: S, alert: A, battery: B, platform: P, indicator: L) -> Self {
        Self {
            sensor,
            alert,
            battery,
            platform,
            indicator,
        }
    }
}
