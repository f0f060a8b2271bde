//! Rotating Machinery Monitoring Pipeline
//!
//! Threads and shared state between audio capture and the RTDB:
//! - Capture writes blocks into a two-slot double buffer
//! - The dispatcher low-pass filters each block and fans a descriptor out
//!   to one drop-oldest queue per consumer
//! - Periodic consumers estimate shaft speed, flag bearing faults and drain
//!   the direction queue, releasing each block when done
//!
//! A slot returns to the producer once every consumer has released it.

mod capture;
mod config;
pub mod consumers;
mod context;
mod dispatcher;
mod error;
pub mod periodic;
pub mod priority;
mod runner;

pub use capture::{CaptureWriter, Pacing, SyntheticConfig, SyntheticSource};
pub use config::{PipelineConfig, PriorityHints};
pub use context::{ConsumerKind, ConsumerQueues, PipelineContext};
pub use dispatcher::Dispatcher;
pub use error::{ConfigError, PipelineError};
pub use runner::{Pipeline, PipelineHandle, RunSummary};

pub use rtdb::{Direction, Rtdb, RtdbSnapshot};
pub use spectral::signal::Tone;
