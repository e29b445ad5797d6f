use std::sync::Arc;
use std::time::Duration;

use adbscope_adb::LogSource;

use crate::buffer::LogBuffer;
use crate::error::{ConfigError, IngestError};
use crate::filter::FilterCriteria;
use crate::ingest::{DEFAULT_STOP_TIMEOUT, IngestState, IngestionController, StartOptions, StopOutcome};
use crate::view::{LogView, ViewProjector};

/// Sizing and timing of an ingestion session
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Maximum retained entries
    pub capacity: usize,

    /// Entries dropped below capacity when the buffer is trimmed
    pub eviction_slack: usize,

    /// Maximum entries in the rendered view
    pub display_limit: usize,

    /// Bound on waiting for the source to exit on stop
    pub stop_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            eviction_slack: 1,
            display_limit: 150,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.display_limit == 0 {
            return Err(ConfigError::ZeroDisplayLimit);
        }
        Ok(())
    }
}

/// One log viewing session: buffer, ingestion, filter state and view.
///
/// Sessions are independent of each other; nothing is shared through
/// global state.
pub struct IngestionSession {
    config: SessionConfig,
    buffer: LogBuffer,
    controller: IngestionController,
    criteria: FilterCriteria,
    projector: ViewProjector,
}

impl IngestionSession {
    pub fn new(config: SessionConfig, source: Arc<dyn LogSource>) -> Result<Self, ConfigError> {
        config.validate()?;

        let buffer = LogBuffer::new(config.capacity).with_eviction_slack(config.eviction_slack);
        let controller = IngestionController::new(source, buffer.clone())
            .with_stop_timeout(config.stop_timeout);
        let projector = ViewProjector::new(config.display_limit);

        Ok(Self {
            config,
            buffer,
            controller,
            criteria: FilterCriteria::new(),
            projector,
        })
    }

    pub async fn start(&mut self, options: &StartOptions) -> Result<(), IngestError> {
        self.controller.start(options).await
    }

    pub async fn stop(&mut self) -> StopOutcome {
        self.controller.stop().await
    }

    /// Empty the buffer. Ingestion keeps running if it was.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn state(&self) -> IngestState {
        self.controller.state()
    }

    pub fn controller(&self) -> &IngestionController {
        &self.controller
    }

    pub fn buffer(&self) -> &LogBuffer {
        &self.buffer
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn criteria_mut(&mut self) -> &mut FilterCriteria {
        &mut self.criteria
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Project the buffer through the current criteria
    pub fn refresh_view(&mut self) -> &LogView {
        self.projector.project(&self.buffer, &self.criteria)
    }

    /// The view from the last `refresh_view`
    pub fn view(&self) -> &LogView {
        self.projector.view()
    }
}
