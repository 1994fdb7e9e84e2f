//! Tree fingerprinting.
//!
//! Uses BLAKE3 over the compact JSON form, so two files that differ only
//! in whitespace or key layout get the same digest.

use crate::types::{FlowNode, TreeDigest};

/// Digest the canonical serialized form of a tree.
///
/// # Errors
/// Returns an error if the tree cannot be serialized.
pub fn digest_flow(flow: &FlowNode) -> Result<TreeDigest, serde_json::Error> {
    let mut hasher = blake3::Hasher::new();
    serde_json::to_writer(&mut hasher, flow)?;
    let hash = hasher.finalize();
    Ok(TreeDigest(*hash.as_bytes()))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::found_animal::bundled;

    #[test]
    fn digest_is_deterministic() {
        let a = digest_flow(&bundled()).unwrap();
        let b = digest_flow(&bundled()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn formatting_does_not_change_digest() {
        let compact: FlowNode = serde_json::from_str(r#"{"prompt":["Done."]}"#).unwrap();
        let spaced: FlowNode = serde_json::from_str("{\n  \"prompt\" : [ \"Done.\" ]\n}").unwrap();
        assert_eq!(digest_flow(&compact).unwrap(), digest_flow(&spaced).unwrap());
    }

    #[test]
    fn content_change_changes_digest() {
        let a = FlowNode::terminal(vec!["Leave it.".into()]);
        let b = FlowNode::terminal(vec!["Leave it!".into()]);
        assert_ne!(digest_flow(&a).unwrap(), digest_flow(&b).unwrap());
    }

    #[test]
    fn empty_options_differ_from_absent() {
        let absent = FlowNode::terminal(vec!["x".into()]);
        let empty = FlowNode::branching(vec!["x".into()], vec![]);
        assert_ne!(digest_flow(&absent).unwrap(), digest_flow(&empty).unwrap());
    }

    #[test]
    fn digest_hex_is_64_chars() {
        let digest = digest_flow(&bundled()).unwrap();
        assert_eq!(digest.to_hex().len(), 64);
    }
}
