use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;

use crate::capture::EdgeCapture;
use crate::decode::{DEFAULT_BIT_THRESHOLD_US, Reading};
use crate::error::DhtError;

/// Timing parameters of a transaction.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// How long the host holds the bus low to request a transmission.
    ///
    /// The datasheet asks for at least 1 ms, but some sensor revisions do
    /// not answer below ~10 ms.
    pub start_low_ms: u32,
    /// How long to wait for the sensor's edges after releasing the bus.
    ///
    /// A transmission is 41 pulses of at most ~200us each, so it must stay
    /// above ~8.2 ms.
    pub capture_window_ms: u32,
    /// Intervals between falling edges longer than this decode as a `1`.
    pub bit_threshold_us: i64,
}

impl Config {
    pub const DEFAULT: Self = Config {
        start_low_ms: 12,
        capture_window_ms: 10,
        bit_threshold_us: DEFAULT_BIT_THRESHOLD_US,
    };
}

impl Default for Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Driver for a DHT22 whose data line raises an interrupt on falling edges.
///
/// The pin must be configured as open-drain with an external pull-up, and
/// the application's falling-edge interrupt handler must forward to
/// [`EdgeCapture::on_falling_edge`] on the same capture passed to
/// [`Dht22::new`].
pub struct Dht22<'a, PIN, D> {
    pin: PIN,
    delay: D,
    capture: &'a EdgeCapture,
    config: Config,
}

impl<'a, PIN, DELAY, E> Dht22<'a, PIN, DELAY>
where
    PIN: OutputPin<Error = E>,
    DELAY: DelayNs,
{
    /// Creates a new instance of the DHT22 driver and leaves the bus idle.
    ///
    /// # Arguments
    ///
    /// * `pin` - The open-drain GPIO pin connected to the DHT22 data line.
    /// * `delay` - An async delay provider; waits must yield to other tasks.
    /// * `capture` - The edge capture fed by the pin's interrupt handler.
    /// * `config` - Transaction timings.
    pub fn new(
        mut pin: PIN,
        delay: DELAY,
        capture: &'a EdgeCapture,
        config: Config,
    ) -> Result<Self, DhtError<E>> {
        pin.set_high()?;
        Ok(Dht22 {
            pin,
            delay,
            capture,
            config,
        })
    }

    /// Reads a temperature and humidity measurement from the DHT22 sensor.
    ///
    /// Requests a transmission, waits for the capture window to close and
    /// decodes the captured edges. Takes roughly
    /// `start_low_ms + capture_window_ms`, all of it spent in cooperative
    /// waits.
    ///
    /// The sensor must not be read more than once every 2 seconds; pacing
    /// the calls is up to the caller. No retry is done here.
    ///
    /// # Returns
    ///
    /// * `Ok(Reading)` if enough edges were captured and the checksum is valid.
    /// * `Err(DhtError)` otherwise. No partial reading is ever returned.
    pub async fn read(&mut self) -> Result<Reading, DhtError<E>> {
        self.start().await?;

        let edges = self.capture.finish();
        debug!("pulse count {}", edges.count());

        let reading = edges
            .decode(self.config.bit_threshold_us)
            .map_err(DhtError::Decode)?;
        debug!(
            "temperature {} humidity {}",
            reading.temperature, reading.humidity
        );
        Ok(reading)
    }

    /// Sends the start signal and waits out the sensor's response.
    ///
    /// The capture is reset before the bus is touched and only armed once
    /// the bus is released, so the host's own falling edge is not counted.
    async fn start(&mut self) -> Result<(), DhtError<E>> {
        trace!("requesting transmission");
        self.capture.reset();

        self.pin.set_low()?;
        self.delay.delay_ms(self.config.start_low_ms).await;
        self.pin.set_high()?;
        self.capture.arm();

        // Edges are recorded by the interrupt handler meanwhile.
        self.delay.delay_ms(self.config.capture_window_ms).await;
        Ok(())
    }

    /// Returns the timings this driver was created with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Releases the pin and the delay provider.
    pub fn release(self) -> (PIN, DELAY) {
        (self.pin, self.delay)
    }
}
