//! Common test utilities

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use taskchain::task::TaskDefinition;

/// Create a temporary directory with a taskchain.yml file
pub fn create_test_manifest(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let manifest_path = temp_dir.path().join("taskchain.yml");
    fs::write(&manifest_path, content).unwrap();
    (temp_dir, manifest_path)
}

/// Create a test manifest with a subdirectory to run from
pub fn create_test_manifest_in_subdir(content: &str) -> (TempDir, PathBuf, PathBuf) {
    let (temp_dir, manifest_path) = create_test_manifest(content);
    let sub_dir = temp_dir.path().join("subdir");
    fs::create_dir(&sub_dir).unwrap();
    (temp_dir, manifest_path, sub_dir)
}

/// An invocation: program name, then `tokens`
pub fn argv(tokens: &[&str]) -> Vec<String> {
    std::iter::once("my-process")
        .chain(tokens.iter().copied())
        .map(String::from)
        .collect()
}

/// A definition with a description and prerequisites only
pub fn blank(prerequisites: &[&str]) -> TaskDefinition {
    TaskDefinition {
        prerequisite_tasks: prerequisites.iter().map(|s| s.to_string()).collect(),
        ..TaskDefinition::new("A blank task")
    }
}

/// Shared log of hook calls
#[derive(Clone, Default)]
pub struct Calls(Arc<Mutex<Vec<String>>>);

impl Calls {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}
