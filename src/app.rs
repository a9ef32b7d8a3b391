// ABOUTME: Core launcher state tying the host set snapshot, template cache and query pipeline together
// ABOUTME: Turns a raw query into ranked result records and hands the chosen command to a runner

use crate::config::Config;
use crate::query::{self, SYNOPSIS};
use crate::ranker::{Match, MatchRanker};
use crate::settings::Templates;
use crate::ssh::{CommandRunner, ConfigScanner, HostSet};
use anyhow::Result;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

pub const ITEM_DESCRIPTION: &str = "SSH host";
pub const ITEM_ICON: &str = ":ssh";
pub const ACTION_ID: &str = "c";
pub const ACTION_CONNECT: &str = "Connect";
pub const ACTION_RUN: &str = "Run";

#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub id: String,
    pub label: String,
    /// Fully rendered command line for the terminal.
    pub command: String,
}

/// One entry of the ranked result list.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultItem {
    pub id: String,
    pub text: String,
    pub description: String,
    pub icon: String,
    pub actions: Vec<Action>,
    /// Always empty: completing a host would drop the typed user and script.
    pub completion: String,
    pub score: f64,
}

impl ResultItem {
    fn from_match(m: Match, action_label: &str) -> Self {
        Self {
            id: m.host.clone(),
            text: m.label,
            description: ITEM_DESCRIPTION.to_string(),
            icon: ITEM_ICON.to_string(),
            actions: vec![Action {
                id: ACTION_ID.to_string(),
                label: action_label.to_string(),
                command: m.command,
            }],
            completion: String::new(),
            score: m.score,
        }
    }
}

pub struct AppState {
    scanner: ConfigScanner,
    config_paths: Vec<String>,
    hosts: RwLock<Arc<HostSet>>,
    templates: Templates,
    max_results: Option<usize>,
}

impl AppState {
    /// Scan the configured ssh config files once and keep the result.
    pub fn new(config: &Config, templates: Templates) -> Self {
        let scanner = ConfigScanner::new().with_max_depth(config.parsing.max_include_depth);
        let state = Self::with_scanner(
            scanner,
            config.ssh.config_paths.clone(),
            templates,
            config.ui.max_results,
        );
        info!("Found {} ssh hosts", state.hosts().len());
        state
    }

    pub fn with_scanner(
        scanner: ConfigScanner,
        config_paths: Vec<String>,
        templates: Templates,
        max_results: Option<usize>,
    ) -> Self {
        let hosts = scanner.scan(&config_paths);
        Self {
            scanner,
            config_paths,
            hosts: RwLock::new(Arc::new(hosts)),
            templates,
            max_results,
        }
    }

    /// Use an already built host set, e.g. in tests. `rescan` will replace it
    /// with whatever `config_paths` yields, which here is nothing.
    pub fn from_hosts(hosts: HostSet, templates: Templates) -> Self {
        Self {
            scanner: ConfigScanner::new(),
            config_paths: Vec::new(),
            hosts: RwLock::new(Arc::new(hosts)),
            templates,
            max_results: None,
        }
    }

    pub fn synopsis(&self) -> &'static str {
        SYNOPSIS
    }

    pub fn hosts(&self) -> Arc<HostSet> {
        self.hosts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    /// Re-read the ssh config files and swap in the new host set.
    pub fn rescan(&self) -> usize {
        let fresh = self.scanner.scan(&self.config_paths);
        let count = fresh.len();
        *self.hosts.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(fresh);
        info!("Rescanned ssh config, found {} hosts", count);
        count
    }

    /// Ranked results for `raw`. `triggered` says whether the launcher was
    /// invoked explicitly, which is required for trailing script text.
    pub fn handle_query(&self, raw: &str, triggered: bool) -> Vec<ResultItem> {
        let Some(parsed) = query::parse(raw) else {
            debug!("Query not tokenizable: {:?}", raw);
            return Vec::new();
        };

        if !parsed.is_applicable(triggered) {
            debug!("Trailing text not allowed for query: {:?}", raw);
            return Vec::new();
        }

        let hosts = self.hosts();
        let templates = self.templates.pair();
        let action_label = if parsed.script().is_some() {
            ACTION_RUN
        } else {
            ACTION_CONNECT
        };

        MatchRanker::new(&hosts, &templates)
            .rank(&parsed, self.max_results)
            .into_iter()
            .map(|m| ResultItem::from_match(m, action_label))
            .collect()
    }

    /// Run the first action of the best match. Returns the launched host, if any.
    pub fn activate(
        &self,
        raw: &str,
        triggered: bool,
        runner: &dyn CommandRunner,
    ) -> Result<Option<String>> {
        let Some(item) = self.handle_query(raw, triggered).into_iter().next() else {
            return Ok(None);
        };
        if let Some(action) = item.actions.first() {
            runner.run_terminal(&action.command)?;
        }
        Ok(Some(item.id))
    }
}
