//! Parsed command-line arguments

use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A typed option value
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    String(String),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl OptionValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptionValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            OptionValue::Float(f) => Some(*f),
            OptionValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::String(s) => write!(f, "{}", s),
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Int(i) => write!(f, "{}", i),
            OptionValue::Float(x) => write!(f, "{}", x),
        }
    }
}

/// Result of parsing a task's command line
///
/// Holds the positional list (the task name, normally) and the named option
/// values. Lookups accept an option's key or any of its aliases.
#[derive(Debug, Clone, Default)]
pub struct ParsedArgs {
    positionals: Vec<String>,
    values: BTreeMap<String, OptionValue>,
    aliases: HashMap<String, String>,
    help: bool,
}

impl ParsedArgs {
    pub fn new<I, S>(positionals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ParsedArgs {
            positionals: positionals.into_iter().map(Into::into).collect(),
            ..ParsedArgs::default()
        }
    }

    pub fn with_value(mut self, key: impl Into<String>, value: OptionValue) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>, key: impl Into<String>) -> Self {
        self.aliases.insert(alias.into(), key.into());
        self
    }

    pub fn with_help(mut self, help: bool) -> Self {
        self.help = help;
        self
    }

    /// Positional tokens (`_`)
    pub fn positionals(&self) -> &[String] {
        &self.positionals
    }

    /// Whether `--help` / `-h` was given
    pub fn help(&self) -> bool {
        self.help
    }

    /// Look up an option by key or alias
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        let key = self.aliases.get(name).map(String::as_str).unwrap_or(name);
        self.values.get(key)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(OptionValue::as_str)
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(OptionValue::as_int)
    }

    pub fn get_float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(OptionValue::as_float)
    }

    /// A boolean flag; absent counts as false
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).and_then(OptionValue::as_bool).unwrap_or(false)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Option values keyed by option key
    pub fn values(&self) -> &BTreeMap<String, OptionValue> {
        &self.values
    }

    /// Option values rendered as strings, for interpolation and environments
    pub fn vars(&self) -> HashMap<String, String> {
        self.values
            .iter()
            .map(|(key, value)| (key.clone(), value.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_alias() {
        let args = ParsedArgs::new(["blank"])
            .with_value("foo", OptionValue::String("bar".to_string()))
            .with_alias("f", "foo");
        assert_eq!(args.get_str("foo"), Some("bar"));
        assert_eq!(args.get_str("f"), Some("bar"));
        assert_eq!(args.get_str("g"), None);
        assert_eq!(args.positionals(), ["blank"]);
    }

    #[test]
    fn test_flag_defaults_false() {
        let args = ParsedArgs::default().with_value("release", OptionValue::Bool(true));
        assert!(args.flag("release"));
        assert!(!args.flag("debug"));
    }

    #[test]
    fn test_vars() {
        let args = ParsedArgs::default()
            .with_value("jobs", OptionValue::Int(4))
            .with_value("release", OptionValue::Bool(false));
        let vars = args.vars();
        assert_eq!(vars.get("jobs").map(String::as_str), Some("4"));
        assert_eq!(vars.get("release").map(String::as_str), Some("false"));
    }
}
