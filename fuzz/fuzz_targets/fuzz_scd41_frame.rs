//! Fuzz target: SCD41 response decoding
//!
//! Feeds arbitrary bytes to the word decoder at every response width the
//! driver uses and checks that accepted frames convert to finite readings.
//!
//! cargo fuzz run fuzz_scd41_frame

#![no_main]

use co2monitor::sensors::scd41::{convert_measurement, crc8, decode_words};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = decode_words::<1>(data);

    if let Ok(words) = decode_words::<3>(data) {
        for (i, w) in words.iter().enumerate() {
            assert_eq!(crc8(&w.to_be_bytes()), data[i * 3 + 2], "accepted a bad CRC");
        }
        let r = convert_measurement(words);
        assert!(r.temperature_c.is_finite() && (-45.0..=130.0).contains(&r.temperature_c));
        assert!(r.humidity_pct.is_finite() && (0.0..=100.0).contains(&r.humidity_pct));
    }
});
