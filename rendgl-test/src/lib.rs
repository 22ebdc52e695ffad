//! Test utilities for rendgl: a driver which records instead of rendering, and a
//! runner building a [`rendgl::Context`] on top of it.

mod driver;
mod runner;

pub use driver::{DriverCall, MockState, RecordingDriver};
pub use runner::{TestRunner, TestRunnerBuilder};
