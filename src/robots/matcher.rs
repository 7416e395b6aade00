//! Allow/deny evaluation over a parsed rule set
//!
//! Semantics follow the robots exclusion protocol as implemented by Google's matcher:
//! - groups naming the crawler win over the `*` group; all matching groups are merged
//! - within the chosen groups, the longest matching pattern decides
//! - on equal length `Allow` wins
//! - a matching specific group without any matching rule allows everything

use crate::robots::parser::{RobotsRuleSet, RuleGroup, RuleKind};
use robotstxt::get_path_params_query;
use robotstxt::matcher::{LongestMatchRobotsMatchStrategy, RobotsMatchStrategy};

impl RobotsRuleSet {
    /// Checks if a URL is allowed for the given user agent
    ///
    /// # Arguments
    ///
    /// * `user_agent` - A product token (`Googlebot`) or a full User-Agent header
    /// * `url` - An absolute URL or a bare path (`/page.html`)
    ///
    /// # Returns
    ///
    /// * `true` - If the URL may be crawled
    /// * `false` - If a rule disallows it
    pub fn is_allowed(&self, user_agent: &str, url: &str) -> bool {
        let path = get_path_params_query(url);
        if path == "/robots.txt" {
            return true;
        }

        let tokens = agent_tokens(user_agent);
        let specific: Vec<&RuleGroup> = self
            .groups
            .iter()
            .filter(|g| g.agents.iter().any(|a| tokens.contains(a)))
            .collect();

        if !specific.is_empty() {
            return decide(&specific, &path).unwrap_or(true);
        }

        let global: Vec<&RuleGroup> = self.groups.iter().filter(|g| g.is_global()).collect();
        decide(&global, &path).unwrap_or(true)
    }

    /// Gets the crawl delay that applies to the given user agent
    ///
    /// A delay declared for the crawler's own group is preferred over the `*` group.
    pub fn crawl_delay(&self, user_agent: &str) -> Option<f64> {
        let tokens = agent_tokens(user_agent);
        let specific = self
            .groups
            .iter()
            .filter(|g| g.agents.iter().any(|a| tokens.contains(a)))
            .find_map(|g| g.crawl_delay);

        specific.or_else(|| {
            self.groups
                .iter()
                .filter(|g| g.is_global())
                .find_map(|g| g.crawl_delay)
        })
    }
}

/// Returns `Some(allowed)` when a rule of `groups` matches `path`, `None` otherwise
fn decide(groups: &[&RuleGroup], path: &str) -> Option<bool> {
    let strategy = LongestMatchRobotsMatchStrategy;
    let mut best_allow: i32 = -1;
    let mut best_disallow: i32 = -1;

    for rule in groups.iter().flat_map(|g| g.rules.iter()) {
        // An empty pattern never grants or denies anything
        if rule.pattern.is_empty() {
            continue;
        }
        match rule.kind {
            RuleKind::Allow => {
                best_allow = best_allow.max(strategy.match_allow(path, &rule.pattern));
            }
            RuleKind::Disallow => {
                best_disallow = best_disallow.max(strategy.match_disallow(path, &rule.pattern));
            }
        }
    }

    match (best_allow >= 0, best_disallow >= 0) {
        (false, false) => None,
        (true, false) => Some(true),
        (false, true) => Some(false),
        (true, true) => Some(best_allow >= best_disallow),
    }
}

/// Lower-cased product tokens of a user agent
///
/// A bare token (`Googlebot`) yields itself; a browser-style header such as
/// `Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)` yields
/// `mozilla`, `compatible` and `googlebot`.
fn agent_tokens(user_agent: &str) -> Vec<String> {
    user_agent
        .split(|c: char| c.is_whitespace() || c == ';' || c == '(' || c == ')' || c == ',')
        .map(|piece| {
            piece
                .chars()
                .take_while(|c| c.is_ascii_alphabetic() || *c == '-' || *c == '_')
                .collect::<String>()
                .to_ascii_lowercase()
        })
        .filter(|token| !token.is_empty())
        .collect()
}
