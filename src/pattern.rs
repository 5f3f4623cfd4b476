use regex::Regex;

use crate::error::Log2CsvError;

/// A compiled extraction pattern: the regular expression plus the named
/// capture groups it declares, in textual order. The group names become the
/// CSV header, so a pattern without any named group is rejected.
#[derive(Debug)]
pub struct Pattern {
    regex: Regex,
    group_names: Vec<String>,
}

impl Pattern {
    /// Compile a pattern string. Syntax errors surface before the
    /// named-group check, so an unparsable pattern is always reported as
    /// invalid syntax rather than as missing groups.
    pub fn compile(pattern: &str) -> Result<Self, Log2CsvError> {
        let regex = Regex::new(pattern)?;
        let group_names: Vec<String> = regex
            .capture_names()
            .flatten()
            .map(|name| name.to_string())
            .collect();
        if group_names.is_empty() {
            return Err(Log2CsvError::NoNamedGroups);
        }
        Ok(Pattern { regex, group_names })
    }

    /// Named group identifiers in the order they appear in the pattern text.
    pub fn group_names(&self) -> &[String] {
        &self.group_names
    }

    /// Apply the pattern to a line. Returns one value per named group, or
    /// `None` when the line does not match at all. A named group that did
    /// not participate in the match yields an empty string. Anonymous
    /// groups are skipped but still occupy their capture slots, keeping the
    /// name-to-slot alignment intact.
    pub fn match_line(&self, line: &str) -> Option<Vec<String>> {
        let caps = self.regex.captures(line)?;
        let mut values = Vec::with_capacity(self.group_names.len());
        for (idx, name) in self.regex.capture_names().enumerate().skip(1) {
            if name.is_none() {
                continue;
            }
            let value = caps.get(idx).map(|m| m.as_str()).unwrap_or("");
            values.push(value.to_string());
        }
        Some(values)
    }
}
