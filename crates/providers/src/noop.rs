use crate::{MetadataError, MetadataSource, Probe};
use std::path::Path;

/// Stands in for the external tool when it is disabled.
#[derive(Debug, Default)]
pub struct NoopProvider;

impl MetadataSource for NoopProvider {
    fn probe(&self, _path: &Path) -> Result<Probe, MetadataError> {
        Err(MetadataError::unavailable("external metadata tool disabled"))
    }
}
