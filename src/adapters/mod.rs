//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements    | Connects to                 |
//! |-------------|---------------|-----------------------------|
//! | `hardware`  | BatteryPort   | ESP32 ADC, charger GPIO     |
//! |             | PlatformPort  | ESP-IDF sleep / reset       |
//! | `log_sink`  | EventSink     | Serial log output           |
//! | `rtc_store` | (helper)      | RTC slow memory             |

pub mod hardware;
pub mod log_sink;
pub mod rtc_store;
