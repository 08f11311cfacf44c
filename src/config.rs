//! System configuration parameters
//!
//! All tunable timing constants, thresholds and sensor calibration for the
//! hood controller.  Nothing is persisted: the firmware starts from
//! [`VentConfig::default()`], optionally overridden by a JSON document
//! baked in at build time (see [`VentConfig::from_json`]).

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::scheduler::Millis;

/// ACS712 hall-effect current sensor transfer function.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentCalibration {
    /// ADC full-scale count (10-bit ADC = 1023).
    pub adc_max: u16,
    /// ADC reference voltage.
    pub vref_volts: f32,
    /// Sensor output at zero current (VCC / 2).
    pub zero_volts: f32,
    /// Sensitivity in volts per ampere (185 mV/A for the 5 A part).
    pub volts_per_amp: f32,
}

impl Default for CurrentCalibration {
    fn default() -> Self {
        Self {
            adc_max: 1023,
            vref_volts: 5.0,
            zero_volts: 2.5,
            volts_per_amp: 0.185,
        }
    }
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VentConfig {
    // --- Relay timing ---
    /// Delay after activation before the first vent pulse.
    pub flap_opening_ms: Millis,
    /// Nominal on-time before auto-off is considered.
    pub run_time_ms: Millis,
    /// Margin after the run time when scheduling a follow-up pulse.
    pub wait_time_ms: Millis,
    /// Length of one vent actuator pulse.
    pub pulse_duration_ms: Millis,

    // --- Sampling ---
    pub humidity_readout_period_ms: Millis,
    /// Current sampling period.  Keep it off multiples of the 20 ms mains
    /// period so samples walk across the waveform.
    pub current_readout_period_ms: Millis,
    /// Window over which the peak current decides whether RE3 releases.
    pub current_window_ms: Millis,

    // --- Switches ---
    pub button_debounce_ms: Millis,
    /// Continuous press longer than this turns everything off.
    pub hold_threshold_ms: Millis,

    // --- Thresholds ---
    /// Relative humidity (%) above which RE1 is triggered.
    pub humidity_threshold_pct: f32,
    /// Motor current (mA) above which RE3 is triggered / held.
    pub current_threshold_ma: f32,
    pub current_calibration: CurrentCalibration,

    // --- Behaviour ---
    /// Poll the humidity sensor at all (board variants without a BME280).
    pub humidity_sensor_enabled: bool,
    /// Emergency all-off also cuts an in-flight vent pulse short.  When
    /// false the actuator output is forced closed but the pulse timer is
    /// left to expire on its own.
    pub all_off_aborts_pulse: bool,
}

impl Default for VentConfig {
    fn default() -> Self {
        Self {
            // Relay timing
            flap_opening_ms: 5_000,
            run_time_ms: 120_000, // 2 min
            wait_time_ms: 10_000,
            pulse_duration_ms: 1_000,

            // Sampling
            humidity_readout_period_ms: 10_000,
            current_readout_period_ms: 25,
            current_window_ms: 10_000,

            // Switches
            button_debounce_ms: 50,
            hold_threshold_ms: 3_000,

            // Thresholds.  Measured hood draw (raw ADC): idle 517-519,
            // light only 522-526, fan only 527-530.  396 mA sits between
            // raw 526 and 527.
            humidity_threshold_pct: 70.0,
            current_threshold_ma: 396.0,
            current_calibration: CurrentCalibration::default(),

            // Behaviour
            humidity_sensor_enabled: true,
            all_off_aborts_pulse: true,
        }
    }
}

impl VentConfig {
    /// Parse a (possibly partial) JSON document and validate the result.
    /// Fields missing from the document keep their default value.
    pub fn from_json(doc: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(doc).map_err(|_| ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject parameter sets the controller cannot run safely with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            (self.flap_opening_ms, "flap_opening_ms must be > 0"),
            (self.run_time_ms, "run_time_ms must be > 0"),
            (self.wait_time_ms, "wait_time_ms must be > 0"),
            (self.pulse_duration_ms, "pulse_duration_ms must be > 0"),
            (self.humidity_readout_period_ms, "humidity_readout_period_ms must be > 0"),
            (self.current_readout_period_ms, "current_readout_period_ms must be > 0"),
            (self.current_window_ms, "current_window_ms must be > 0"),
            (self.hold_threshold_ms, "hold_threshold_ms must be > 0"),
        ];
        if let Some((_, msg)) = durations.iter().find(|(ms, _)| *ms == 0) {
            return Err(ConfigError::Invalid(*msg));
        }

        if self.pulse_duration_ms >= self.wait_time_ms {
            return Err(ConfigError::Invalid(
                "pulse_duration_ms must be shorter than wait_time_ms",
            ));
        }
        if self.current_window_ms < self.current_readout_period_ms {
            return Err(ConfigError::Invalid(
                "current_window_ms must cover at least one readout period",
            ));
        }
        if self.button_debounce_ms >= self.hold_threshold_ms {
            return Err(ConfigError::Invalid(
                "button_debounce_ms must be shorter than hold_threshold_ms",
            ));
        }
        if !(0.0..=100.0).contains(&self.humidity_threshold_pct) {
            return Err(ConfigError::Invalid(
                "humidity_threshold_pct must be within 0-100",
            ));
        }
        if self.current_threshold_ma.is_nan() || self.current_threshold_ma <= 0.0 {
            return Err(ConfigError::Invalid("current_threshold_ma must be > 0"));
        }

        let cal = &self.current_calibration;
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if cal.adc_max == 0 || !positive(cal.vref_volts) || !positive(cal.volts_per_amp) {
            return Err(ConfigError::Invalid(
                "current_calibration needs adc_max, vref_volts and volts_per_amp > 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(VentConfig::default().validate(), Ok(()));
    }

    #[test]
    fn timing_ratios_make_sense() {
        let c = VentConfig::default();
        assert!(
            c.flap_opening_ms < c.run_time_ms,
            "first pulse must land inside the run window"
        );
        assert!(c.current_readout_period_ms % 20 != 0, "must not alias the 50 Hz mains");
        assert!(c.current_readout_period_ms < c.current_window_ms);
    }

    #[test]
    fn zero_duration_rejected() {
        let c = VentConfig {
            pulse_duration_ms: 0,
            ..VentConfig::default()
        };
        assert_eq!(
            c.validate(),
            Err(ConfigError::Invalid("pulse_duration_ms must be > 0"))
        );
    }

    #[test]
    fn pulse_longer_than_wait_rejected() {
        let c = VentConfig {
            pulse_duration_ms: 20_000,
            ..VentConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn nan_threshold_rejected() {
        let c = VentConfig {
            current_threshold_ma: f32::NAN,
            ..VentConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn partial_json_overrides_only_named_fields() {
        let c = VentConfig::from_json(
            r#"{ "run_time_ms": 60000, "current_calibration": { "volts_per_amp": 0.1 } }"#,
        )
        .unwrap();
        assert_eq!(c.run_time_ms, 60_000);
        assert_eq!(c.flap_opening_ms, 5_000);
        assert!((c.current_calibration.volts_per_amp - 0.1).abs() < 1e-6);
        assert_eq!(c.current_calibration.adc_max, 1023);
    }

    #[test]
    fn malformed_json_is_parse_error() {
        assert!(matches!(
            VentConfig::from_json("{ run_time_ms: "),
            Err(ConfigError::Parse)
        ));
    }

    #[test]
    fn invalid_json_values_fail_validation() {
        assert!(matches!(
            VentConfig::from_json(r#"{ "humidity_threshold_pct": 140.0 }"#),
            Err(ConfigError::Invalid(_))
        ));
    }
}
