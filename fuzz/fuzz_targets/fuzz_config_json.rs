//! Fuzz target: `VentConfig::from_json`
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - Every accepted document also passes `validate()`
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use hoodvent::config::VentConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(doc) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = VentConfig::from_json(doc) {
        assert!(config.validate().is_ok(), "accepted config must validate");
    }
});
