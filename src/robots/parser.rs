//! Robots.txt parser implementation
//!
//! The robotstxt crate tokenizes the body (including its tolerance for typos such as
//! `Dissalow` and its pattern escaping); this module collects the callbacks into an
//! owned [`RobotsRuleSet`] that can be evaluated any number of times without
//! re-parsing.

use crate::robots::RobotsError;
use robotstxt::{parse_robotstxt, RobotsParseHandler};

/// Kind of an access rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Allow,
    Disallow,
}

/// A single `Allow`/`Disallow` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotsRule {
    pub kind: RuleKind,
    /// Path pattern, may contain `*` and a trailing `$`
    pub pattern: String,
    /// Line number in the source body
    pub line: u32,
}

/// Consecutive `User-agent` lines and the rules that follow them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleGroup {
    /// Lower-cased product tokens; `*` for the global group
    pub agents: Vec<String>,
    pub rules: Vec<RobotsRule>,
    /// Non-standard `Crawl-delay` value in seconds
    pub crawl_delay: Option<f64>,
}

impl RuleGroup {
    /// Returns true if this group addresses every crawler
    pub fn is_global(&self) -> bool {
        self.agents.iter().any(|a| a == "*")
    }
}

/// Parsed robots.txt, ready for repeated evaluation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RobotsRuleSet {
    pub(crate) groups: Vec<RuleGroup>,
    pub(crate) sitemaps: Vec<String>,
}

impl RobotsRuleSet {
    /// Parses a robots.txt body
    ///
    /// The grammar is permissive: unknown directives and rules outside any
    /// `User-agent` group are ignored. Only a body that is not text at all (it
    /// contains NUL bytes) is rejected.
    ///
    /// # Arguments
    ///
    /// * `body` - The raw robots.txt file content
    ///
    /// # Returns
    ///
    /// * `Ok(RobotsRuleSet)` - The parsed groups
    /// * `Err(RobotsError::Parse)` - The body is binary
    pub fn parse(body: &str) -> Result<Self, RobotsError> {
        if let Some(offset) = body.find('\0') {
            return Err(RobotsError::Parse(format!(
                "body contains a NUL byte at offset {}, not a text file",
                offset
            )));
        }

        let mut builder = RuleSetBuilder::default();
        parse_robotstxt(body, &mut builder);
        let rule_set = builder.finish();

        tracing::debug!(
            "Parsed robots.txt: {} groups, {} sitemaps",
            rule_set.groups.len(),
            rule_set.sitemaps.len()
        );
        Ok(rule_set)
    }

    /// Creates a permissive rule set that allows everything
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Returns the parsed groups in document order
    pub fn groups(&self) -> &[RuleGroup] {
        &self.groups
    }

    /// Returns the `Sitemap:` URLs declared in the body
    pub fn sitemaps(&self) -> &[String] {
        &self.sitemaps
    }
}

/// Accumulates parser callbacks into groups
#[derive(Default)]
struct RuleSetBuilder {
    groups: Vec<RuleGroup>,
    sitemaps: Vec<String>,
    current: Option<RuleGroup>,
    /// True while we are still reading the `User-agent` lines of `current`
    in_agent_block: bool,
}

impl RuleSetBuilder {
    fn close_group(&mut self) {
        if let Some(group) = self.current.take() {
            self.groups.push(group);
        }
        self.in_agent_block = false;
    }

    /// Returns the open group, ending its agent block; `None` before any `User-agent`
    fn group_for_directive(&mut self) -> Option<&mut RuleGroup> {
        self.in_agent_block = false;
        self.current.as_mut()
    }

    fn push_rule(&mut self, kind: RuleKind, line: u32, value: &str) {
        if let Some(group) = self.group_for_directive() {
            group.rules.push(RobotsRule {
                kind,
                pattern: value.to_string(),
                line,
            });
        }
    }

    fn finish(mut self) -> RobotsRuleSet {
        self.close_group();
        RobotsRuleSet {
            groups: self.groups,
            sitemaps: self.sitemaps,
        }
    }
}

impl RobotsParseHandler for RuleSetBuilder {
    fn handle_robots_start(&mut self) {}

    fn handle_robots_end(&mut self) {}

    fn handle_user_agent(&mut self, _line_num: u32, user_agent: &str) {
        if !self.in_agent_block {
            self.close_group();
            self.current = Some(RuleGroup::default());
            self.in_agent_block = true;
        }
        if let Some(group) = self.current.as_mut() {
            group.agents.push(group_agent_token(user_agent));
        }
    }

    fn handle_allow(&mut self, line_num: u32, value: &str) {
        self.push_rule(RuleKind::Allow, line_num, value);
    }

    fn handle_disallow(&mut self, line_num: u32, value: &str) {
        self.push_rule(RuleKind::Disallow, line_num, value);
    }

    fn handle_sitemap(&mut self, _line_num: u32, value: &str) {
        if !value.is_empty() {
            self.sitemaps.push(value.to_string());
        }
    }

    fn handle_unknown_action(&mut self, line_num: u32, action: &str, value: &str) {
        if !action.eq_ignore_ascii_case("crawl-delay") {
            tracing::trace!("Ignoring robots.txt directive '{}' on line {}", action, line_num);
            return;
        }
        if let Some(group) = self.group_for_directive() {
            if let Ok(delay) = value.trim().parse::<f64>() {
                group.crawl_delay = Some(delay);
            }
        }
    }
}

/// Reduces a `User-agent:` value to its lower-cased product token
///
/// `Googlebot/2.1` becomes `googlebot`; `*` stays `*`.
fn group_agent_token(value: &str) -> String {
    let value = value.trim();
    if value == "*" || value.starts_with("* ") || value.starts_with("*\t") {
        return "*".to_string();
    }
    value
        .chars()
        .take_while(|c| c.is_ascii_alphabetic() || *c == '-' || *c == '_')
        .collect::<String>()
        .to_ascii_lowercase()
}
