// ABOUTME: SSH client config scanner collecting literal Host aliases into a deduplicated set
// ABOUTME: Follows Include directives recursively with home expansion, a visited set and a depth bound

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Unique host aliases, iterated alphabetically.
pub type HostSet = BTreeSet<String>;

/// Include nesting limit used by OpenSSH itself.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 16;

pub const SYSTEM_CONFIG_PATH: &str = "/etc/ssh/ssh_config";
pub const USER_CONFIG_PATH: &str = "~/.ssh/config";

#[derive(Debug, Clone)]
pub struct ConfigScanner {
    home: Option<PathBuf>,
    max_depth: usize,
}

impl Default for ConfigScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigScanner {
    pub fn new() -> Self {
        Self {
            home: dirs::home_dir(),
            max_depth: DEFAULT_MAX_INCLUDE_DEPTH,
        }
    }

    /// Use `home` instead of the real home directory for `~` expansion.
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Scan the system-wide config followed by the per-user config.
    pub fn scan_default(&self) -> HostSet {
        self.scan([SYSTEM_CONFIG_PATH, USER_CONFIG_PATH])
    }

    /// Scan each path in order and merge every literal host alias found.
    ///
    /// Missing or unreadable files are skipped. The visited set spans the
    /// whole pass, so a file included from several places is read once.
    pub fn scan<I, P>(&self, paths: I) -> HostSet
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let mut hosts = HostSet::new();
        let mut visited = HashSet::new();

        for path in paths {
            let path = self.expand_home(path.as_ref());
            let base_dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            self.scan_file(&path, &base_dir, 0, &mut visited, &mut hosts);
        }

        debug!("Scanned {} ssh hosts", hosts.len());
        hosts
    }

    fn scan_file(
        &self,
        path: &Path,
        base_dir: &Path,
        depth: usize,
        visited: &mut HashSet<PathBuf>,
        hosts: &mut HostSet,
    ) {
        let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        if !visited.insert(key) {
            debug!("Skipping already scanned ssh config: {}", path.display());
            return;
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                debug!("Skipping unreadable ssh config {}: {}", path.display(), e);
                return;
            }
        };

        for line in content.lines() {
            let fields: Vec<&str> = line
                .split_whitespace()
                .take_while(|field| !field.starts_with('#'))
                .collect();
            if fields.len() < 2 {
                continue;
            }

            match fields[0] {
                "Host" => {
                    hosts.extend(
                        fields[1..]
                            .iter()
                            .filter(|alias| is_literal_alias(alias))
                            .map(|alias| alias.to_string()),
                    );
                }
                "Include" => {
                    if depth >= self.max_depth {
                        warn!(
                            "Include depth limit ({}) reached in {}, skipping {}",
                            self.max_depth,
                            path.display(),
                            fields[1..].join(" ")
                        );
                        continue;
                    }
                    for raw in &fields[1..] {
                        for include in self.resolve_include(raw, base_dir) {
                            self.scan_file(&include, base_dir, depth + 1, visited, hosts);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// Paths named by one `Include` argument. Wildcard patterns expand to
    /// the matching files in sorted order; no match yields nothing.
    fn resolve_include(&self, raw: &str, base_dir: &Path) -> Vec<PathBuf> {
        let expanded = self.expand_home(raw);
        let path = if expanded.is_absolute() {
            expanded
        } else {
            base_dir.join(expanded)
        };

        let pattern = path.to_string_lossy().into_owned();
        if !pattern.contains(['*', '?', '[']) {
            return vec![path];
        }

        match glob::glob(&pattern) {
            Ok(entries) => {
                let mut paths: Vec<PathBuf> = entries.filter_map(|entry| entry.ok()).collect();
                paths.sort();
                paths
            }
            Err(e) => {
                debug!("Invalid Include pattern {}: {}", pattern, e);
                Vec::new()
            }
        }
    }

    fn expand_home(&self, raw: &str) -> PathBuf {
        let Some(rest) = raw.strip_prefix('~') else {
            return PathBuf::from(raw);
        };
        match &self.home {
            Some(home) => home.join(rest.trim_start_matches('/')),
            None => PathBuf::from(raw),
        }
    }
}

fn is_literal_alias(alias: &str) -> bool {
    !alias.is_empty() && !alias.contains('*') && !alias.contains('?')
}
