//! Cycle-state retention across deep sleep.
//!
//! Deep sleep powers the CPU down and the chip boots from scratch on wake,
//! so the [`CycleState`] is parked in RTC slow memory beforehand.  The slot
//! holds a magic word, a length byte and a postcard-encoded state:
//!
//! ```text
//! ┌────────────┬─────┬──────────────────────────┐
//! │ MAGIC (LE) │ len │ postcard(CycleState) ... │
//! └────────────┴─────┴──────────────────────────┘
//! ```
//!
//! A cold boot reloads `.rtc.data` from the image, which wipes the magic.
//! On host the slot is a plain `Mutex`-guarded array.

use log::{debug, warn};

use crate::cycle::state::CycleState;

const MAGIC: u32 = 0xC0_2D_5E_ED;
const HEADER_LEN: usize = 5;
/// Worst-case postcard size of `CycleState` is 22 bytes.
const PAYLOAD_MAX: usize = 27;
pub const SLOT_LEN: usize = HEADER_LEN + PAYLOAD_MAX;

// ── Slot codec ────────────────────────────────────────────────

/// Write `state` into `slot`.  Returns `false` if it does not fit.
pub fn encode(state: &CycleState, slot: &mut [u8; SLOT_LEN]) -> bool {
    let (header, payload) = slot.split_at_mut(HEADER_LEN);
    let used = match postcard::to_slice(state, payload) {
        Ok(bytes) => bytes.len(),
        Err(e) => {
            warn!("rtc_store: encode failed ({})", e);
            return false;
        }
    };
    header[..4].copy_from_slice(&MAGIC.to_le_bytes());
    header[4] = used as u8;
    true
}

/// Read a state back, or `None` for an empty or corrupt slot.
pub fn decode(slot: &[u8; SLOT_LEN]) -> Option<CycleState> {
    let magic = u32::from_le_bytes([slot[0], slot[1], slot[2], slot[3]]);
    if magic != MAGIC {
        return None;
    }
    let len = usize::from(slot[4]);
    let payload = slot.get(HEADER_LEN..HEADER_LEN + len)?;
    match postcard::from_bytes(payload) {
        Ok(state) => Some(state),
        Err(e) => {
            warn!("rtc_store: retained state corrupt ({})", e);
            None
        }
    }
}

fn wipe(slot: &mut [u8; SLOT_LEN]) {
    slot.fill(0);
}

// ── Backing storage ───────────────────────────────────────────

#[cfg(target_os = "espidf")]
#[unsafe(link_section = ".rtc.data")]
static mut RTC_SLOT: [u8; SLOT_LEN] = [0; SLOT_LEN];

/// SAFETY: only the main task touches the slot, and never re-entrantly.
#[cfg(target_os = "espidf")]
fn with_slot<R>(f: impl FnOnce(&mut [u8; SLOT_LEN]) -> R) -> R {
    f(unsafe { &mut *(&raw mut RTC_SLOT) })
}

#[cfg(not(target_os = "espidf"))]
static SIM_SLOT: std::sync::Mutex<[u8; SLOT_LEN]> = std::sync::Mutex::new([0; SLOT_LEN]);

#[cfg(not(target_os = "espidf"))]
fn with_slot<R>(f: impl FnOnce(&mut [u8; SLOT_LEN]) -> R) -> R {
    let mut guard = SIM_SLOT.lock().unwrap_or_else(|p| p.into_inner());
    f(&mut guard)
}

// ── Public API ────────────────────────────────────────────────

pub fn save(state: &CycleState) {
    if with_slot(|slot| encode(state, slot)) {
        debug!("rtc_store: state retained (loop {})", state.loop_count);
    }
}

pub fn load() -> Option<CycleState> {
    with_slot(|slot| decode(slot))
}

pub fn clear() {
    with_slot(wipe);
}
