//! Interrupt-driven DHT22 Sensor Driver for Embedded Rust
//!
//! This crate reads the DHT22 (AM2302) temperature and humidity sensor by
//! timestamping the falling edges of its data line from a GPIO interrupt,
//! instead of busy-polling the pin. The bit value of each pulse is recovered
//! afterwards from the time between consecutive falling edges.
//!
//! # Features
//! - Async API built on `embedded-hal-async`; every wait yields to other tasks
//! - Interrupt handler that never blocks or allocates
//! - Designed for `no_std` environments
//! - Optional logging support via `defmt` or `log`
//!
//! # Wiring it up
//!
//! The crate does not configure the GPIO or the interrupt controller. The
//! application has to:
//! 1. configure the data pin as open-drain with an external pull-up,
//! 2. enable a falling-edge interrupt on it whose handler calls
//!    [`EdgeCapture::on_falling_edge`] with a microsecond [`MicrosClock`],
//! 3. create the [`Dht22`] driver once, then call [`Dht22::read`] no more
//!    often than every 2 seconds.
//!
//! ```ignore
//! static CAPTURE: EdgeCapture = EdgeCapture::new();
//!
//! // in the GPIO interrupt handler
//! CAPTURE.on_falling_edge(&timer);
//!
//! // in a task
//! let mut dht = Dht22::new(pin, delay, &CAPTURE, Config::default())?;
//! loop {
//!     match dht.read().await {
//!         Ok(reading) => info!("{}", reading),
//!         Err(e) => error!("DHT22 read failed: {}", e),
//!     }
//!     Timer::after_secs(5).await;
//! }
//! ```
//!
//! # Optional Features
//! - `defmt`: Implements `defmt::Format` and logs through `defmt`
//! - `log`: Logs through the `log` facade

#![cfg_attr(not(test), no_std)]

mod fmt;

pub mod capture;
pub mod decode;
pub mod dht22;
pub mod error;

pub use capture::{EdgeCapture, Edges, MicrosClock};
pub use decode::Reading;
pub use dht22::{Config, Dht22};
pub use error::{DecodeError, DhtError};
