//! Real-Time Database
//!
//! A single shared record holding the latest speed estimate, bearing fault
//! flag and (reserved) direction. Every accessor takes the lock for one field
//! access only; fields are individually consistent, not jointly.

use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::info;

/// Rotation direction (reserved, no producer yet)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Not determined
    #[default]
    Unknown,
    /// Clockwise
    Clockwise,
    /// Counter-clockwise
    CounterClockwise,
}

/// Copy of the record, read field by field
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RtdbSnapshot {
    /// Latest dominant frequency (Hz)
    pub speed_hz: f64,
    /// Latest bearing fault verdict
    pub bearing_fault: bool,
    /// Rotation direction
    pub direction: Direction,
}

impl RtdbSnapshot {
    /// Speed in revolutions per minute
    pub fn rpm(&self) -> f64 {
        self.speed_hz * 60.0
    }
}

/// Shared monitoring record behind one lock
#[derive(Debug, Default)]
pub struct Rtdb {
    record: Mutex<RtdbSnapshot>,
}

impl Rtdb {
    /// Create a database with zeroed fields
    pub fn new() -> Self {
        info!("Creating real-time database");
        Self::default()
    }

    fn record(&self) -> MutexGuard<'_, RtdbSnapshot> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store the latest speed estimate (Hz)
    pub fn set_speed(&self, hz: f64) {
        self.record().speed_hz = hz;
    }

    /// Latest speed estimate (Hz)
    pub fn speed(&self) -> f64 {
        self.record().speed_hz
    }

    /// Store the latest bearing verdict
    pub fn set_bearing_fault(&self, fault: bool) {
        self.record().bearing_fault = fault;
    }

    /// Latest bearing verdict
    pub fn bearing_fault(&self) -> bool {
        self.record().bearing_fault
    }

    /// Store the rotation direction
    pub fn set_direction(&self, direction: Direction) {
        self.record().direction = direction;
    }

    /// Rotation direction
    pub fn direction(&self) -> Direction {
        self.record().direction
    }

    /// Read every field, each under its own lock scope
    pub fn snapshot(&self) -> RtdbSnapshot {
        RtdbSnapshot {
            speed_hz: self.speed(),
            bearing_fault: self.bearing_fault(),
            direction: self.direction(),
        }
    }
}
