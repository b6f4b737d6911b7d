use indexmap::map::Entry;
use indexmap::IndexMap;
use regex::bytes::Regex;
use std::borrow::Cow;
use tracing::{debug, trace};

use crate::case::CaseStyle;
use crate::errors::{GsubError, GsubResult};

/// One compiled search pattern paired with its replacement template
#[derive(Debug, Clone)]
pub struct Rule {
    search: String,
    pattern: Regex,
    replacement: String,
}

impl Rule {
    fn compile(search: String, pattern_text: &str, replacement: String) -> GsubResult<Self> {
        let pattern = Regex::new(pattern_text)
            .map_err(|e| GsubError::invalid_pattern(format!("{}: {}", pattern_text, e)))?;
        Ok(Self {
            search,
            pattern,
            replacement,
        })
    }

    /// The unescaped search text this rule was derived from
    pub fn search(&self) -> &str {
        &self.search
    }

    /// The pattern source text, which is also the rule's identity in a set
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    pub fn is_match(&self, haystack: &[u8]) -> bool {
        self.pattern.is_match(haystack)
    }

    /// Replaces every non-overlapping match, expanding capture references
    pub fn replace_all<'h>(&self, haystack: &'h [u8]) -> Cow<'h, [u8]> {
        self.pattern.replace_all(haystack, self.replacement.as_bytes())
    }
}

/// The rules for one invocation, in application order.
///
/// The base rule comes first, followed by one rule per requested case style
/// in `CaseStyle` declaration order. Rules whose pattern text is identical
/// are stored once, so a search term whose snake, kebab and camel forms
/// collapse to the same string is not substituted repeatedly.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Builds the rule set for a search/replace pair.
    ///
    /// Fails if the base pattern or any derived pattern is not a valid
    /// regular expression. Case transforms are not escaping-aware, so a
    /// derivation of a valid regex may itself be invalid; that fails the
    /// whole build rather than skipping the rule.
    pub fn build(
        search: &str,
        replacement: &str,
        fixed_string: bool,
        case_styles: &[CaseStyle],
    ) -> GsubResult<Self> {
        let mut styles = case_styles.to_vec();
        styles.sort_unstable();
        styles.dedup();

        let mut rules: IndexMap<String, Rule> = IndexMap::new();
        insert_rule(
            &mut rules,
            search.to_string(),
            replacement.to_string(),
            fixed_string,
        )?;

        for style in styles {
            let derived_search = style.apply(search);
            if derived_search.is_empty() {
                debug!(
                    "Skipping {} rule: {:?} has no {} form",
                    style.name(),
                    search,
                    style.name()
                );
                continue;
            }
            let derived_replacement = style.apply(replacement);
            debug!(
                "Derived {} rule: {:?} -> {:?}",
                style.name(),
                derived_search,
                derived_replacement
            );
            insert_rule(&mut rules, derived_search, derived_replacement, fixed_string)?;
        }

        debug!("Built rule set with {} rules", rules.len());
        for rule in rules.values() {
            trace!("Rule {:?} -> {:?}", rule.pattern(), rule.replacement());
        }
        Ok(Self {
            rules: rules.into_values().collect(),
        })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Unescaped search texts, for handing to a literal prefilter
    pub fn literals(&self) -> Vec<&str> {
        self.rules.iter().map(Rule::search).collect()
    }

    /// Applies every rule in order, each one seeing the previous rule's
    /// output. Returns `None` if no rule matched.
    pub fn apply(&self, input: &[u8]) -> Option<Vec<u8>> {
        let mut current = Cow::Borrowed(input);
        let mut dirty = false;
        for rule in &self.rules {
            if rule.is_match(&current) {
                dirty = true;
                current = Cow::Owned(rule.replace_all(&current).into_owned());
            }
        }
        dirty.then(|| current.into_owned())
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn insert_rule(
    rules: &mut IndexMap<String, Rule>,
    search: String,
    replacement: String,
    fixed_string: bool,
) -> GsubResult<()> {
    let pattern_text = if fixed_string {
        regex::escape(&search)
    } else {
        escape_stray_braces(&search).into_owned()
    };
    if let Entry::Vacant(entry) = rules.entry(pattern_text) {
        let rule = Rule::compile(search, entry.key(), replacement)?;
        entry.insert(rule);
    }
    Ok(())
}

/// Escapes every `{` that does not open a counted repetition (`{n}`, `{n,}`
/// or `{n,m}`), so such braces match literally. Escape sequences that take a
/// braced argument (`\p{..}`, `\x{..}`, `\u{..}`) are copied as they are.
fn escape_stray_braces(pattern: &str) -> Cow<'_, str> {
    if !pattern.contains('{') {
        return Cow::Borrowed(pattern);
    }

    let mut out = String::with_capacity(pattern.len() + 4);
    let mut rest = pattern;
    while let Some(c) = rest.chars().next() {
        match c {
            '\\' => {
                let end = match rest[1..].chars().next() {
                    Some('p' | 'P' | 'x' | 'u' | 'U') if rest[2..].starts_with('{') => {
                        rest.find('}').map_or(rest.len(), |close| close + 1)
                    }
                    Some(next) => 1 + next.len_utf8(),
                    None => rest.len(),
                };
                out.push_str(&rest[..end]);
                rest = &rest[end..];
            }
            '{' => match counted_repetition_len(rest) {
                Some(end) => {
                    out.push_str(&rest[..end]);
                    rest = &rest[end..];
                }
                None => {
                    out.push_str("\\{");
                    rest = &rest[1..];
                }
            },
            _ => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    Cow::Owned(out)
}

/// Length of the `{n}`, `{n,}` or `{n,m}` quantifier at the start of `text`
fn counted_repetition_len(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let mut pos = 1;
    let min = digits(pos);
    if min == 0 {
        return None;
    }
    pos += min;
    if bytes.get(pos) == Some(&b',') {
        pos += 1;
        pos += digits(pos);
    }
    (bytes.get(pos) == Some(&b'}')).then_some(pos + 1)
}
