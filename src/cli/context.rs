use crate::cli::output::OutputFormat;
use crate::config::{ConfigSource, HarnessConfig};

pub struct CliContext {
    config: &'static HarnessConfig,
    source: ConfigSource,
    output: OutputFormat,
}

impl CliContext {
    pub fn new(config: &'static HarnessConfig, source: ConfigSource, output: OutputFormat) -> Self {
        Self {
            config,
            source,
            output,
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        self.config
    }

    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    pub fn output(&self) -> OutputFormat {
        self.output
    }
}
