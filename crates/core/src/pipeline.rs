use crate::classifier::{date_from_filename, Classifier};
use crate::config::{AppConfig, MetadataConfig};
use crate::models::Verdict;
use crate::rules::NameFilter;
use crate::scanner;
use anyhow::Context;
use providers::{ExifReader, ExiftoolProvider, FallbackSource, MetadataSource, NoopProvider};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use storage::{Category, Index, Manifest, StatSignature};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub root: PathBuf,
    pub index_file: PathBuf,
    /// Files handed to [`Rummage::process`].
    pub discovered: usize,
    /// Unchanged files answered from the index.
    pub cached: usize,
    /// Files whose metadata was read.
    pub probed: usize,
    /// Records written, each with a fresh content hash.
    pub stored: usize,
    /// Files that vanished or could not be read mid-run.
    pub skipped: usize,
    pub pruned: usize,
    /// Records per category after the run.
    pub categories: BTreeMap<Category, usize>,
}

/// One pass over a scan root, feeding every file through the index and the
/// classifier.
pub struct Rummage<S> {
    root: PathBuf,
    index: Index,
    classifier: Classifier,
    source: S,
    summary: RunSummary,
}

impl<S: MetadataSource> Rummage<S> {
    pub fn new(root: PathBuf, index: Index, classifier: Classifier, source: S) -> Self {
        let summary = RunSummary {
            root: root.clone(),
            index_file: index.file().to_path_buf(),
            ..RunSummary::default()
        };
        Self {
            root,
            index,
            classifier,
            source,
            summary,
        }
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Classify one file unless the index already holds a verdict for it.
    /// Returns `None` when the file had to be skipped.
    pub fn process(&mut self, path: &Path) -> Option<Category> {
        self.summary.discovered += 1;

        let meta = match fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot stat, skipping");
                self.summary.skipped += 1;
                return None;
            }
        };
        let stat = StatSignature::from_metadata(&meta);

        if let Some(category) = self.index.lookup(path, &stat) {
            debug!(path = %path.display(), %category, "file already there");
            self.summary.cached += 1;
            return Some(category);
        }

        let basename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let verdict = match self.classifier.screen(&basename) {
            Some(verdict) => verdict,
            None => self.inspect(path, &basename),
        };

        let category = verdict.category();
        match self.index.store(
            category,
            path,
            stat,
            verdict.detail(),
            date_from_filename(&basename),
        ) {
            Ok(_) => {
                self.summary.stored += 1;
                Some(category)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot store, skipping");
                self.summary.skipped += 1;
                None
            }
        }
    }

    fn inspect(&mut self, path: &Path, basename: &str) -> Verdict {
        self.summary.probed += 1;
        match self.source.probe(path) {
            Ok(probe) => {
                let verdict = self.classifier.classify(basename, &probe);
                if let Verdict::UnrecognizedEntry { .. } = verdict {
                    warn!(path = %path.display(), detail = %verdict.detail(), "unparseable date");
                }
                verdict
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "metadata read failed");
                Verdict::Rejected {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Prune, persist the index and register it in `manifest`.
    pub fn finish(mut self, mut manifest: Manifest) -> anyhow::Result<(Index, RunSummary)> {
        self.summary.pruned = self.index.prune();
        self.index.persist().context("persist index")?;

        if manifest
            .record_if_absent(&self.root, &self.index.id())
            .context("update manifest")?
        {
            info!(manifest = %manifest.path().display(), root = %self.root.display(), "registered in manifest");
        }

        self.summary.categories = Category::ALL
            .into_iter()
            .map(|c| (c, self.index.count(c)))
            .filter(|(_, n)| *n > 0)
            .collect();
        Ok((self.index, self.summary))
    }
}

pub fn build_source(config: &MetadataConfig) -> Box<dyn MetadataSource> {
    let embedded = ExifReader::new(config.max_image_pixels);
    match config.exiftool.as_deref().map(str::trim) {
        Some(program) if !program.is_empty() => Box::new(FallbackSource::new(
            embedded,
            ExiftoolProvider::new(program),
        )),
        _ => Box::new(FallbackSource::new(embedded, NoopProvider)),
    }
}

/// Scan `root` with the configured collaborators.
pub fn run(config: &AppConfig, root: &Path) -> anyhow::Result<(Index, RunSummary)> {
    let root = scanner::resolve_root(root)?;
    let index = Index::open(Path::new(&config.storage.index_dir), &root).context("open index")?;
    let classifier = Classifier::new(NameFilter::from(&config.ignore));
    let source = build_source(&config.metadata);
    run_with(config, root, index, classifier, source)
}

pub fn run_with<S: MetadataSource>(
    config: &AppConfig,
    root: PathBuf,
    index: Index,
    classifier: Classifier,
    source: S,
) -> anyhow::Result<(Index, RunSummary)> {
    info!(root = %root.display(), loaded = index.is_loaded(), "starting scan");
    let manifest = Manifest::read(Path::new(&config.storage.manifest)).context("read manifest")?;
    let mut rummage = Rummage::new(root.clone(), index, classifier, source);
    for path in scanner::walk(&root, &config.scan.exclude)? {
        rummage.process(&path);
    }
    let (index, summary) = rummage.finish(manifest)?;
    info!(
        discovered = summary.discovered,
        cached = summary.cached,
        stored = summary.stored,
        pruned = summary.pruned,
        "scan complete"
    );
    Ok((index, summary))
}
