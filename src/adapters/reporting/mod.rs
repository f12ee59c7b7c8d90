//! Failure reporting and notification adapters.

mod recording;
mod tracing_sink;

pub use recording::{RecordingNotifier, RecordingReporter};
pub use tracing_sink::{TracingNotifier, TracingSyncReporter};
