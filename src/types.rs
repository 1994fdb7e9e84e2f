//! Domain types for sanctuary-guide.
//!
//! The serialized flow tree (what content authors write), plus the
//! report records produced by the CLI commands.

use serde::{Deserialize, Serialize};

// ============================================================================
// SERIALIZED FLOW TREE
// ============================================================================

/// One step of the guidance dialogue, in its authored (nested) form.
///
/// `options: None` means terminal. `Some(vec![])` deserializes as-is so the
/// validator can reject it instead of silently treating it as terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowNode {
    /// Lines shown together as one step.
    pub prompt: Vec<String>,
    /// Named branches out of this step. Absent on terminal nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FlowOption>>,
}

/// A named branch leading to a child step it owns exclusively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowOption {
    /// Short label shown to the user ("Yes", "Bird").
    pub name: String,
    /// The step this option leads to.
    pub flow: FlowNode,
}

impl FlowNode {
    /// A terminal step: a final recommendation.
    pub fn terminal(prompt: Vec<String>) -> Self {
        FlowNode {
            prompt,
            options: None,
        }
    }

    /// A branching step.
    pub fn branching(prompt: Vec<String>, options: Vec<FlowOption>) -> Self {
        FlowNode {
            prompt,
            options: Some(options),
        }
    }
}

// Children are unhooked onto a heap stack so deep chains drop without recursion.
impl Drop for FlowNode {
    fn drop(&mut self) {
        let mut pending = self.options.take().unwrap_or_default();
        while let Some(mut option) = pending.pop() {
            if let Some(children) = option.flow.options.take() {
                pending.extend(children);
            }
        }
    }
}

impl FlowOption {
    pub fn new(name: impl Into<String>, flow: FlowNode) -> Self {
        FlowOption {
            name: name.into(),
            flow,
        }
    }
}

// ============================================================================
// PRIMITIVES
// ============================================================================

/// Fingerprint of a flow tree's canonical serialized form.
///
/// Wraps a 32-byte BLAKE3 hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeDigest(pub [u8; 32]);

impl TreeDigest {
    /// Returns the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// First eight hex characters, enough to tell tree versions apart.
    pub fn short(&self) -> String {
        self.to_hex()[..8].to_string()
    }
}

impl Serialize for TreeDigest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for TreeDigest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        let bytes = hex_to_bytes(&hex_str).map_err(serde::de::Error::custom)?;
        Ok(TreeDigest(bytes))
    }
}

/// Parse a 64-character hex string into 32 bytes.
fn hex_to_bytes(hex: &str) -> Result<[u8; 32], String> {
    if hex.len() != 64 {
        return Err(format!("Expected 64 hex chars, got {}", hex.len()));
    }
    let mut bytes = [0u8; 32];
    for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
        let s = std::str::from_utf8(chunk).map_err(|e| e.to_string())?;
        bytes[i] = u8::from_str_radix(s, 16).map_err(|e| e.to_string())?;
    }
    Ok(bytes)
}

// ============================================================================
// REPORTS
// ============================================================================

/// Shape summary of a validated tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    /// Nodes reachable from the root.
    pub nodes: usize,
    /// Reachable nodes with no options.
    pub terminals: usize,
    /// Longest root-to-leaf path, counted in selections.
    pub depth: usize,
}

/// Outcome of validating one tree source.
#[derive(Debug, Clone, Serialize)]
pub struct TreeReport {
    /// Where the tree came from: a file path, or "bundled".
    pub source: String,
    /// Canonical digest, absent when the source could not be parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<TreeDigest>,
    /// Shape of the tree. Only present when it passed validation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<TreeStats>,
    /// Human-readable defects (structural, or the load failure).
    pub defects: Vec<String>,
}

impl TreeReport {
    pub fn is_valid(&self) -> bool {
        self.defects.is_empty()
    }
}

/// Where a scripted walk ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalkReport {
    /// Option names taken from the root.
    pub path: Vec<String>,
    /// Prompt at the final step.
    pub prompt: Vec<String>,
    /// Options available at the final step (empty when terminal).
    pub options: Vec<String>,
    /// Whether the walk reached a final recommendation.
    pub terminal: bool,
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable pretty output.
    #[default]
    Human,
    /// Machine-readable JSON.
    Json,
}

// ============================================================================
// TESTS
// ============================================================================
