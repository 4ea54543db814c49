//! Fuzz target: RTC retention slot decoding
//!
//! RTC memory can hold anything after a brown-out; decoding garbage must
//! never panic, and whatever decodes must re-encode into the slot.
//!
//! cargo fuzz run fuzz_rtc_slot

#![no_main]

use co2monitor::adapters::rtc_store::{self, SLOT_LEN};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut slot = [0u8; SLOT_LEN];
    let n = data.len().min(SLOT_LEN);
    slot[..n].copy_from_slice(&data[..n]);

    if let Some(state) = rtc_store::decode(&slot) {
        let mut again = [0u8; SLOT_LEN];
        assert!(rtc_store::encode(&state, &mut again));
        assert_eq!(rtc_store::decode(&again), Some(state));
    }
});
