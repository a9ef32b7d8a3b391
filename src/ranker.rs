// ABOUTME: Case-insensitive prefix ranking of SSH hosts against a parsed launcher query
// ABOUTME: Scores by how much of the host name the typed fragment covers and renders a command per match

use crate::query::ParsedQuery;
use crate::ssh::HostSet;
use crate::template::TemplatePair;

#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub host: String,
    /// `chars(fragment) / chars(host)`, so exact names rank first.
    pub score: f64,
    pub command: String,
    pub label: String,
}

pub struct MatchRanker<'a> {
    hosts: &'a HostSet,
    templates: &'a TemplatePair,
}

impl<'a> MatchRanker<'a> {
    pub fn new(hosts: &'a HostSet, templates: &'a TemplatePair) -> Self {
        Self { hosts, templates }
    }

    /// Matches sorted by descending score. Equal scores keep the host set's
    /// alphabetical order. `max_results` of `None` returns everything.
    pub fn rank(&self, query: &ParsedQuery, max_results: Option<usize>) -> Vec<Match> {
        let fragment = query.host_fragment.to_lowercase();
        let fragment_len = query.host_fragment.chars().count();
        let script = query.script();

        let mut results: Vec<Match> = self
            .hosts
            .iter()
            .filter(|host| host.to_lowercase().starts_with(&fragment))
            .map(|host| Match {
                host: host.clone(),
                score: prefix_score(fragment_len, host),
                command: self
                    .templates
                    .command_line(&query.target_for(host), script),
                label: host.clone(),
            })
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score));

        if let Some(limit) = max_results {
            results.truncate(limit);
        }
        results
    }
}

fn prefix_score(fragment_len: usize, host: &str) -> f64 {
    let host_len = host.chars().count();
    if host_len == 0 {
        return 0.0;
    }
    fragment_len as f64 / host_len as f64
}
