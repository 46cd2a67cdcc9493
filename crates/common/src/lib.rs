//! Utilities shared by the based sequencer binaries.

pub mod logging;
