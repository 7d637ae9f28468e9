//! Embedded reader first, external tool second.

use crate::{MetadataError, MetadataSource, Probe};
use std::path::Path;
use tracing::warn;

pub struct FallbackSource<P, S> {
    primary: P,
    secondary: S,
}

impl<P, S> FallbackSource<P, S>
where
    P: MetadataSource,
    S: MetadataSource,
{
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

impl<P, S> MetadataSource for FallbackSource<P, S>
where
    P: MetadataSource,
    S: MetadataSource,
{
    /// Tags from the primary reader win. Otherwise the secondary source is
    /// asked; when it cannot produce anything the primary's verdict
    /// (`NotMedia` or `NoAttributes`) stands. Errors from the primary reader
    /// are never masked by the fallback.
    fn probe(&self, path: &Path) -> Result<Probe, MetadataError> {
        let first = self.primary.probe(path)?;
        if let Probe::Tags(_) = first {
            return Ok(first);
        }

        match self.secondary.probe(path) {
            Ok(probe) => Ok(probe),
            Err(e) if e.is_unavailable() => {
                warn!(path = %path.display(), error = %e, "falling back to embedded result");
                Ok(first)
            }
            Err(e) => Err(e),
        }
    }
}
