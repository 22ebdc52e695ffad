use std::ops::{Deref, DerefMut};

use anyhow::{Context as _, Result};
use rendgl::{types::VsyncMode, util::typedefs::FastHashSet, Context, DriverInfo};

use crate::{DriverCall, MockState, RecordingDriver};

pub struct TestRunnerBuilder {
    version: (u32, u32),
    extensions: Vec<String>,
    size: (i32, i32),
    adaptive_vsync: bool,
    vsync: VsyncMode,
}

impl TestRunnerBuilder {
    pub fn new() -> Self {
        Self {
            version: (4, 6),
            extensions: rendgl::REQUIRED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            size: (800, 600),
            adaptive_vsync: false,
            vsync: VsyncMode::Off,
        }
    }

    pub fn version(mut self, major: u32, minor: u32) -> Self {
        self.version = (major, minor);
        self
    }

    pub fn extensions(mut self, extensions: &[&str]) -> Self {
        self.extensions = extensions.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Size of the default framebuffer, which the initial viewport covers.
    pub fn size(mut self, width: i32, height: i32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn adaptive_vsync(mut self, supported: bool) -> Self {
        self.adaptive_vsync = supported;
        self
    }

    pub fn vsync(mut self, vsync: VsyncMode) -> Self {
        self.vsync = vsync;
        self
    }

    /// The driver a runner would be built on, for tests creating the context themselves.
    pub fn build_driver(&self) -> RecordingDriver {
        let info = DriverInfo {
            version: self.version,
            vendor: String::from("rendgl"),
            renderer: String::from("RecordingDriver"),
            extensions: self.extensions.iter().cloned().collect::<FastHashSet<_>>(),
        };
        RecordingDriver::new(info, self.adaptive_vsync, MockState::new(self.size.0, self.size.1))
    }

    pub fn build(self) -> Result<TestRunner> {
        let _ = env_logger::builder().is_test(true).try_init();

        let context = Context::new(self.build_driver(), self.vsync).context("Context creation failed")?;
        context.driver().take_calls();

        Ok(TestRunner { context })
    }
}

impl Default for TestRunnerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A [`Context`] over a [`RecordingDriver`], with the calls made during creation already discarded.
pub struct TestRunner {
    pub context: Context<RecordingDriver>,
}

impl Deref for TestRunner {
    type Target = Context<RecordingDriver>;

    fn deref(&self) -> &Self::Target {
        &self.context
    }
}

impl DerefMut for TestRunner {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.context
    }
}

impl TestRunner {
    pub fn builder() -> TestRunnerBuilder {
        TestRunnerBuilder::new()
    }

    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn take_calls(&self) -> Vec<DriverCall> {
        self.context.driver().take_calls()
    }

    /// Render state calls since the last [`TestRunner::take_calls`], which are then discarded.
    pub fn take_state_calls(&self) -> Vec<DriverCall> {
        let calls = self.context.driver().state_calls();
        self.context.driver().take_calls();
        calls
    }
}
