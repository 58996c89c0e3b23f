//! Structured workflow event logging.
//!
//! Provides [`JsonlEventLogger`], a JSONL file writer that implements the
//! [`ProgressNotifier`](warroom_application::ProgressNotifier) port.

mod jsonl_event_logger;

pub use jsonl_event_logger::JsonlEventLogger;
