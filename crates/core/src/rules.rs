use crate::config::IgnoreConfig;

/// Name-based filter applied before any metadata is read.
#[derive(Debug, Clone)]
pub struct NameFilter {
    prefixes: Vec<String>,
    suffixes: Vec<String>,
    substrings: Vec<String>,
}

impl Default for NameFilter {
    fn default() -> Self {
        Self::from(&IgnoreConfig::default())
    }
}

impl From<&IgnoreConfig> for NameFilter {
    fn from(cfg: &IgnoreConfig) -> Self {
        Self {
            prefixes: cfg.prefixes.clone(),
            suffixes: cfg.suffixes.clone(),
            substrings: cfg.substrings.clone(),
        }
    }
}

impl NameFilter {
    /// Prefix/suffix rules are checked first, substring rules second.
    pub fn is_ignored(&self, basename: &str) -> bool {
        self.matches_edges(basename) || self.matches_substring(basename)
    }

    fn matches_edges(&self, basename: &str) -> bool {
        self.prefixes.iter().any(|p| basename.starts_with(p.as_str()))
            || self.suffixes.iter().any(|s| basename.ends_with(s.as_str()))
    }

    fn matches_substring(&self, basename: &str) -> bool {
        self.substrings.iter().any(|s| basename.contains(s.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules() {
        let filter = NameFilter::default();
        assert!(filter.is_ignored(".DS_Store"));
        assert!(filter.is_ignored("Thumbs.db"));
        assert!(filter.is_ignored("scan.pdf"));
        assert!(filter.is_ignored("notes.txt"));
        assert!(filter.is_ignored("notes.txt.jpg"));
        assert!(!filter.is_ignored("IMG_0001.JPG"));
        assert!(!filter.is_ignored("report.pdf.jpg"));
        // suffixes are case sensitive
        assert!(!filter.is_ignored("SCAN.PDF"));
    }

    #[test]
    fn empty_rules_ignore_nothing() {
        let filter = NameFilter::from(&IgnoreConfig {
            prefixes: vec![],
            suffixes: vec![],
            substrings: vec![],
        });
        assert!(!filter.is_ignored(".hidden"));
    }
}
