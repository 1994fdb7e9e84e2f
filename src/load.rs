//! Loading content from disk: flow trees and episode catalogues.
//!
//! Parsing only. Structural checks belong to [`crate::validate`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::episodes::{Episode, EpisodeRecord, catalogue};
use crate::types::FlowNode;

/// Extension of tree files picked up when validating a directory.
const TREE_EXTENSION: &str = "json";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read and parse one tree file.
///
/// # Errors
/// If the file cannot be read or is not a tree in the serialized form.
pub fn load_tree(path: &Path) -> Result<FlowNode, LoadError> {
    let flow: FlowNode = read_json(path)?;
    debug!(path = %path.display(), "loaded flow tree");
    Ok(flow)
}

/// Find tree files under `root`, sorted by path.
///
/// A file path is returned as-is. Hidden entries are skipped.
///
/// # Errors
/// If the directory cannot be walked.
pub fn find_trees(root: &Path, max_depth: Option<usize>) -> Result<Vec<PathBuf>, LoadError> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut walker = WalkDir::new(root).follow_links(false);
    if let Some(depth) = max_depth {
        walker = walker.max_depth(depth);
    }

    let mut found = Vec::new();
    for entry in walker
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()))
    {
        let entry = entry.map_err(|e| LoadError::Io {
            path: e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf()),
            source: e.into(),
        })?;
        let path = entry.path();
        if entry.file_type().is_file()
            && path.extension().and_then(|s| s.to_str()) == Some(TREE_EXTENSION)
        {
            found.push(path.to_path_buf());
        }
    }

    found.sort();
    info!(root = %root.display(), count = found.len(), "discovered tree files");
    Ok(found)
}

/// Read an episode catalogue: a JSON array in broadcast order.
///
/// # Errors
/// If the file cannot be read or parsed.
pub fn load_catalogue(path: &Path) -> Result<Vec<Episode>, LoadError> {
    let records: Vec<EpisodeRecord> = read_json(path)?;
    debug!(path = %path.display(), count = records.len(), "loaded catalogue");
    Ok(catalogue(records))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_unbounded(&content).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse with no nesting cap. Each tree level is three JSON levels deep, so
/// serde_json's default limit would cap trees at about 40 steps; the stack
/// grows on demand instead.
fn parse_unbounded<T: DeserializeOwned>(content: &str) -> Result<T, serde_json::Error> {
    let mut de = serde_json::Deserializer::from_str(content);
    de.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().is_some_and(|s| s.starts_with('.'))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::FlowTree;
    use crate::validate::{ValidateConfig, validate};
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn load_tree_parses_serialized_form() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            tmp.path(),
            "tree.json",
            r#"{"prompt": ["Hurt?"], "options": [{"name": "Yes", "flow": {"prompt": ["Call."]}}]}"#,
        );
        let flow = load_tree(&path).unwrap();
        assert_eq!(flow.prompt, vec!["Hurt?".to_string()]);
        assert_eq!(flow.options.as_ref().unwrap()[0].name, "Yes");
    }

    /// A yes-chain `depth` selections deep, in the serialized form.
    fn nested_chain(depth: usize) -> String {
        let mut json = String::new();
        for i in 0..depth {
            json.push_str(&format!(
                r#"{{"prompt": ["Step {}?"], "options": [{{"name": "Yes", "flow": "#,
                i
            ));
        }
        json.push_str(r#"{"prompt": ["Done."]}"#);
        for _ in 0..depth {
            json.push_str("}]}");
        }
        json
    }

    fn loaded_depth(json: &str) -> usize {
        let tmp = TempDir::new().unwrap();
        let path = write(tmp.path(), "deep.json", json);
        let flow = load_tree(&path).unwrap();
        let tree = validate(FlowTree::from_flow(&flow), &ValidateConfig::default()).unwrap();
        tree.stats().depth
    }

    #[test]
    fn load_tree_accepts_fifty_levels() {
        assert_eq!(loaded_depth(&nested_chain(50)), 50);
    }

    #[test]
    fn load_tree_accepts_thousands_of_levels() {
        assert_eq!(loaded_depth(&nested_chain(5_000)), 5_000);
    }

    #[test]
    fn load_tree_rejects_trailing_content() {
        let tmp = TempDir::new().unwrap();
        let path = write(tmp.path(), "twice.json", r#"{"prompt": ["A"]} {"prompt": ["B"]}"#);
        assert!(matches!(load_tree(&path), Err(LoadError::Json { .. })));
    }

    #[test]
    fn load_tree_reports_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = load_tree(&tmp.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("nope.json"));
    }

    #[test]
    fn load_tree_reports_bad_json_with_path() {
        let tmp = TempDir::new().unwrap();
        let path = write(tmp.path(), "bad.json", r#"{"prompt": "not a list"}"#);
        let err = load_tree(&path).unwrap_err();
        assert!(matches!(err, LoadError::Json { .. }));
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn find_trees_walks_sorted_and_skips_hidden() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "b.json", "{}");
        write(tmp.path(), "a.json", "{}");
        write(tmp.path(), "notes.txt", "");
        write(tmp.path(), "nested/c.json", "{}");
        write(tmp.path(), ".drafts/d.json", "{}");

        let found = find_trees(tmp.path(), None).unwrap();
        let names: Vec<String> = found
            .iter()
            .map(|p| p.strip_prefix(tmp.path()).unwrap().display().to_string())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json", "nested/c.json"]);
    }

    #[test]
    fn find_trees_respects_max_depth() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.json", "{}");
        write(tmp.path(), "nested/c.json", "{}");
        assert_eq!(find_trees(tmp.path(), Some(1)).unwrap().len(), 1);
    }

    #[test]
    fn find_trees_accepts_a_single_file() {
        let tmp = TempDir::new().unwrap();
        let path = write(tmp.path(), "only.json", "{}");
        assert_eq!(find_trees(&path, None).unwrap(), vec![path]);
    }

    #[test]
    fn load_catalogue_numbers_and_reverses() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            tmp.path(),
            "episodes.json",
            r#"[
                {"edition": "Owl Edition", "broadcast": "2021-03-01T18:00:00Z", "classification": "aves"},
                {"edition": "Fox Edition", "broadcast": "2021-09-01T18:00:00Z", "classification": "mammalia"}
            ]"#,
        );
        let episodes = load_catalogue(&path).unwrap();
        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].number, 2);
        assert_eq!(episodes[0].edition, "Fox Edition");
    }
}
