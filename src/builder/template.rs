//! Template substitution.
//!
//! Applies a plan's substitutions to the chosen base configuration
//! file. Patterns match against the original template text only - all
//! matches are collected first, then spliced - so replacements are
//! never re-scanned by later rules and rule order cannot change the
//! output beyond first-claim-wins on overlapping lines.

use std::path::Path;

use anyhow::{Context, Result};
use regex::RegexBuilder;

use crate::core::plan::Substitution;
use crate::util::fs::{read_to_string, write_string};

/// Apply substitutions to template text. Replacements are literal;
/// capture-group references are not expanded.
pub fn apply_substitutions(original: &str, subs: &[Substitution]) -> Result<String> {
    // (start, end, replacement) claims over the original text.
    let mut claims: Vec<(usize, usize, &str)> = Vec::new();

    for sub in subs {
        let pattern = if sub.literal {
            regex::escape(&sub.pattern)
        } else {
            sub.pattern.clone()
        };
        let re = RegexBuilder::new(&pattern)
            .multi_line(true)
            .build()
            .with_context(|| format!("invalid substitution pattern: {}", sub.pattern))?;

        let mut matched = false;
        for m in re.find_iter(original) {
            let overlaps = claims
                .iter()
                .any(|(start, end, _)| m.start() < *end && *start < m.end());
            if overlaps {
                tracing::debug!("substitution `{}` overlaps an earlier rule; skipped", sub.pattern);
                continue;
            }
            claims.push((m.start(), m.end(), &sub.replacement));
            matched = true;
        }

        if !matched {
            tracing::debug!("substitution `{}` matched nothing", sub.pattern);
        }
    }

    claims.sort_by_key(|(start, _, _)| *start);

    let mut output = String::with_capacity(original.len());
    let mut cursor = 0;
    for (start, end, replacement) in claims {
        output.push_str(&original[cursor..start]);
        output.push_str(replacement);
        cursor = end;
    }
    output.push_str(&original[cursor..]);

    Ok(output)
}

/// Read `template`, apply `subs`, and write the result to `output`.
pub fn apply_to_file(template: &Path, subs: &[Substitution], output: &Path) -> Result<()> {
    let original = read_to_string(template)?;
    let edited = apply_substitutions(&original, subs)?;
    write_string(output, &edited)
}
