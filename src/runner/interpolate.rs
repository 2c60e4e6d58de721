//! `${var}` interpolation in manifest commands
//!
//! Names are looked up in the parsed task options first, then in the process
//! environment. Unknown names are left in place for the shell to see.

use crate::error::{InterpolationError, InterpolationResult};
use regex::Regex;
use std::collections::HashMap;
use std::env;
use std::sync::OnceLock;

/// Upper bound on substitution passes before assuming a cycle
const MAX_PASSES: usize = 32;

fn var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid interpolation pattern"))
}

fn lookup(name: &str, vars: &HashMap<String, String>) -> Option<String> {
    vars.get(name).cloned().or_else(|| env::var(name).ok())
}

/// Interpolate variables in a string
///
/// Values may themselves contain `${...}` references; these are expanded in
/// further passes.
pub fn interpolate(s: &str, vars: &HashMap<String, String>) -> InterpolationResult<String> {
    let re = var_pattern();
    let mut result = s.to_string();

    for _ in 0..MAX_PASSES {
        let mut changed = false;
        let next = re
            .replace_all(&result, |caps: &regex::Captures| match lookup(&caps[1], vars) {
                Some(value) => {
                    changed = true;
                    value
                }
                None => caps[0].to_string(),
            })
            .into_owned();

        if !changed {
            return Ok(next);
        }
        result = next;
    }

    Err(InterpolationError::RecursiveInterpolation(s.to_string()))
}
