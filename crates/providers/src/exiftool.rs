//! Adapter for the external `exiftool` program.

use crate::{MetadataError, MetadataSource, Probe, TagMap};
use serde_json::Value;
use std::path::Path;
use std::process::Command;
use tracing::{debug, error, info};

const REQUESTED_TAGS: [&str; 5] = [
    TagMap::MIME_TYPE,
    TagMap::MEDIA_CREATE_DATE,
    TagMap::DATE_TIME,
    TagMap::DATE_TIME_ORIGINAL,
    TagMap::DATE_TIME_DIGITIZED,
];

#[derive(Debug, Clone)]
pub struct ExiftoolProvider {
    program: String,
}

impl Default for ExiftoolProvider {
    fn default() -> Self {
        Self::new("exiftool")
    }
}

impl ExiftoolProvider {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn command(&self, path: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        // numeric values, short names, JSON array output
        cmd.args(["-n", "-S", "-j"]).arg(path);
        cmd.args(REQUESTED_TAGS.iter().map(|t| format!("-{t}")));
        cmd
    }
}

impl MetadataSource for ExiftoolProvider {
    fn probe(&self, path: &Path) -> Result<Probe, MetadataError> {
        let output = self.command(path).output().map_err(|e| {
            error!(program = %self.program, path = %path.display(), error = %e, "exiftool call failed");
            MetadataError::unavailable(format!("{}: {e}", self.program))
        })?;

        if !output.stderr.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr).replace('\n', " ");
            error!(path = %path.display(), "exiftool: {}", stderr.trim());
        }
        if !output.status.success() {
            return Err(MetadataError::unavailable(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }

        let probe = parse_output(&String::from_utf8_lossy(&output.stdout))?;
        log_found(path, &probe);
        Ok(probe)
    }
}

/// Interpret exiftool's `-j` output. Only the first array element is used;
/// a result without a MIME type is not media.
pub fn parse_output(stdout: &str) -> Result<Probe, MetadataError> {
    let parsed: Value = serde_json::from_str(stdout)
        .map_err(|e| MetadataError::unavailable(format!("malformed exiftool output: {e}")))?;
    let first = parsed
        .as_array()
        .and_then(|items| items.first())
        .and_then(Value::as_object)
        .ok_or_else(|| MetadataError::unavailable("empty exiftool output"))?;

    if !first.contains_key(TagMap::MIME_TYPE) {
        return Ok(Probe::NotMedia);
    }

    let mut tags = TagMap::default();
    for name in REQUESTED_TAGS {
        match first.get(name) {
            Some(Value::String(s)) => tags.set(name, s.as_str()),
            Some(Value::Null) | None => {}
            Some(other) => tags.set(name, other.to_string()),
        }
    }
    Ok(Probe::Tags(tags))
}

fn log_found(path: &Path, probe: &Probe) {
    let Probe::Tags(tags) = probe else {
        debug!(path = %path.display(), "exiftool: not media");
        return;
    };
    let found = [
        (TagMap::MEDIA_CREATE_DATE, &tags.media_create_date),
        (TagMap::DATE_TIME_ORIGINAL, &tags.date_time_original),
        (TagMap::DATE_TIME_DIGITIZED, &tags.date_time_digitized),
        (TagMap::DATE_TIME, &tags.date_time),
    ]
    .into_iter()
    .find(|(_, value)| value.is_some())
    .map(|(name, _)| name);

    match found {
        Some(tag) => info!(path = %path.display(), tag, "exiftool: found date"),
        None => info!(path = %path.display(), "exiftool: checked, but no proper date"),
    }
}
