use std::time::Duration;

use crate::config::PipelineConfig;
use crate::data::{BbrSource, SyntheticSource};
use crate::domain::{RawTable, Season, SourceKind};
use crate::error::AppError;

/// Something that can produce one season's raw advanced-stats table.
pub trait SeasonSource {
    /// Short name for logs and reports.
    fn name(&self) -> &str;

    fn fetch_season(&self, season: Season) -> Result<RawTable, AppError>;

    /// Pause to observe between consecutive requests.
    fn request_delay(&self) -> Duration {
        Duration::ZERO
    }
}

pub fn source_from_config(
    kind: SourceKind,
    config: &PipelineConfig,
) -> Result<Box<dyn SeasonSource>, AppError> {
    match kind {
        SourceKind::Bbr => Ok(Box::new(BbrSource::new(&config.fetch)?)),
        SourceKind::Synthetic => Ok(Box::new(SyntheticSource::new(config.synthetic.clone()))),
    }
}
