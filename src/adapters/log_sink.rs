//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing controller events through the
//! `log` facade (ESP-IDF logger on UART / USB-CDC in production).

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => info!("START | all relays idle"),
            AppEvent::RelayActivated { relay, cause } => {
                info!("RELAY | {} on ({:?})", relay, cause);
            }
            AppEvent::PulseQueued { relay, pending } => {
                info!("RELAY | {} queued vent pulse, pending={}", relay, pending);
            }
            AppEvent::RelayDeactivated { relay, reason } => {
                info!("RELAY | {} off ({:?})", relay, reason);
            }
            AppEvent::VentPulseStarted { relay } => info!("VENT  | pulse for {}", relay),
            AppEvent::VentPulseCompleted => info!("VENT  | pulse done"),
            AppEvent::AllOff { aborted_pulse } => {
                info!("ALLOFF| aborted_pulse={}", aborted_pulse);
            }
            AppEvent::HumiditySample { percent } => debug!("SENSE | RH={:.1}%", percent),
            AppEvent::HumidityUnavailable => warn!("SENSE | humidity unavailable"),
            AppEvent::CurrentWindowClosed { peak_ma, released } => {
                debug!("SENSE | RE3 window peak={:.0}mA released={}", peak_ma, released);
            }
        }
    }
}
