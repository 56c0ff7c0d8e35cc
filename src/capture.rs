//! Falling-edge capture shared between the GPIO interrupt and the driver.
//!
//! The interrupt handler only ever calls [`EdgeCapture::on_falling_edge`]
//! (or [`EdgeCapture::record`]). The driver resets and arms the capture at
//! the start of a transaction and takes an [`Edges`] snapshot once the
//! capture window has elapsed.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::decode::{self, Reading};
use crate::error::DecodeError;

/// Number of edge timestamps the capture can hold.
pub const CAPACITY: usize = 64;

/// A free-running timer with microsecond resolution.
pub trait MicrosClock {
    /// Microseconds since some fixed point, usually boot.
    fn now_micros(&self) -> i64;
}

impl<T: MicrosClock + ?Sized> MicrosClock for &T {
    fn now_micros(&self) -> i64 {
        T::now_micros(self)
    }
}

struct EdgeLog {
    timestamps: [i64; CAPACITY],
    count: usize,
    armed: bool,
}

/// Timestamp buffer and pulse counter written from interrupt context.
///
/// Usually placed in a `static` so that the interrupt handler can reach it:
///
/// ```ignore
/// static CAPTURE: EdgeCapture = EdgeCapture::new();
/// ```
pub struct EdgeCapture {
    log: Mutex<RefCell<EdgeLog>>,
}

impl EdgeCapture {
    /// Creates an empty, disarmed capture.
    pub const fn new() -> Self {
        EdgeCapture {
            log: Mutex::new(RefCell::new(EdgeLog {
                timestamps: [0; CAPACITY],
                count: 0,
                armed: false,
            })),
        }
    }

    /// Records a falling edge at `timestamp` microseconds.
    ///
    /// Meant to be called from the GPIO interrupt handler. Edges are only
    /// recorded while a transaction is in progress. Once the buffer is full
    /// the counter keeps counting without storing, so an overrun can be
    /// detected when decoding.
    pub fn record(&self, timestamp: i64) {
        critical_section::with(|cs| {
            let mut log = self.log.borrow_ref_mut(cs);
            if !log.armed {
                return;
            }
            let index = log.count;
            if index < CAPACITY {
                log.timestamps[index] = timestamp;
            }
            log.count = index.saturating_add(1);
        });
    }

    /// Records a falling edge at the current time of `clock`.
    pub fn on_falling_edge<C: MicrosClock>(&self, clock: &C) {
        self.record(clock.now_micros());
    }

    /// Number of edges counted since the last transaction started.
    pub fn count(&self) -> usize {
        critical_section::with(|cs| self.log.borrow_ref(cs).count)
    }

    /// Clears the counter and stops recording.
    pub(crate) fn reset(&self) {
        critical_section::with(|cs| {
            let mut log = self.log.borrow_ref_mut(cs);
            log.count = 0;
            log.armed = false;
        });
    }

    /// Starts accepting edges.
    pub(crate) fn arm(&self) {
        critical_section::with(|cs| self.log.borrow_ref_mut(cs).armed = true);
    }

    /// Stops recording and copies out what was captured.
    pub(crate) fn finish(&self) -> Edges {
        critical_section::with(|cs| {
            let mut log = self.log.borrow_ref_mut(cs);
            log.armed = false;
            Edges {
                timestamps: log.timestamps,
                count: log.count,
            }
        })
    }
}

impl Default for EdgeCapture {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of a finished capture.
#[derive(Clone, Debug)]
pub struct Edges {
    timestamps: [i64; CAPACITY],
    count: usize,
}

impl Edges {
    /// Number of edges counted, including any beyond [`CAPACITY`].
    pub fn count(&self) -> usize {
        self.count
    }

    /// The timestamps that were actually stored.
    pub fn recorded(&self) -> &[i64] {
        &self.timestamps[..self.count.min(CAPACITY)]
    }

    /// Decodes the captured edges into a reading.
    pub fn decode(&self, bit_threshold_us: i64) -> Result<Reading, DecodeError> {
        decode::decode(&self.timestamps, self.count, bit_threshold_us)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    struct FakeClock(Cell<i64>);

    impl MicrosClock for FakeClock {
        fn now_micros(&self) -> i64 {
            let now = self.0.get();
            self.0.set(now + 100);
            now
        }
    }

    #[test]
    fn test_disarmed_ignores_edges() {
        let capture = EdgeCapture::new();
        capture.record(10);
        capture.record(20);
        assert_eq!(capture.count(), 0);
        assert!(capture.finish().recorded().is_empty());
    }

    #[test]
    fn test_records_in_order() {
        let capture = EdgeCapture::new();
        let clock = FakeClock(Cell::new(1_000));
        capture.reset();
        capture.arm();
        for _ in 0..3 {
            capture.on_falling_edge(&clock);
        }

        let edges = capture.finish();
        assert_eq!(edges.count(), 3);
        assert_eq!(edges.recorded(), &[1_000, 1_100, 1_200]);
    }

    #[test]
    fn test_counts_past_capacity() {
        let capture = EdgeCapture::new();
        capture.reset();
        capture.arm();
        for i in 0..(CAPACITY as i64 + 6) {
            capture.record(i);
        }

        let edges = capture.finish();
        assert_eq!(edges.count(), CAPACITY + 6);
        assert_eq!(edges.recorded().len(), CAPACITY);
        assert_eq!(edges.recorded()[CAPACITY - 1], CAPACITY as i64 - 1);
        assert_eq!(
            edges.decode(110).unwrap_err(),
            DecodeError::Overrun {
                count: CAPACITY + 6
            }
        );
    }

    #[test]
    fn test_finish_disarms() {
        let capture = EdgeCapture::new();
        capture.reset();
        capture.arm();
        capture.record(5);
        let _ = capture.finish();

        capture.record(6);
        assert_eq!(capture.count(), 1);
    }

    #[test]
    fn test_reset_clears_previous_transaction() {
        let capture = EdgeCapture::new();
        capture.reset();
        capture.arm();
        for i in 0..50 {
            capture.record(i);
        }
        capture.reset();
        assert_eq!(capture.count(), 0);

        capture.arm();
        capture.record(99);
        assert_eq!(capture.finish().recorded(), &[99]);
    }
}
