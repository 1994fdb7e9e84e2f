//! Text macros for guidance prose.
//!
//! Pure functions: (subject?, context?) → ordered lines.
//! Many terminal steps share near-identical advice; these generate it
//! so the tree never carries duplicated prose.

/// Subject used when a macro is called without one.
pub const DEFAULT_SUBJECT: &str = "it";

/// Second line of every rehabilitator recommendation.
const FIND_REHABILITATOR: &str = "To find a local wildlife rehabilitator, you can try searching online, or contacting your region's wildlife agency, or a local veterinarian.";

/// Recommend calling a wildlife rehabilitator.
///
/// With a non-empty `context` the first line reads
/// `"{context}, call a wildlife rehabilitator…"`, otherwise
/// `"Call a wildlife rehabilitator…"`.
pub fn rehab(subject: Option<&str>, context: Option<&str>) -> Vec<String> {
    let subject = subject.unwrap_or(DEFAULT_SUBJECT);
    let lead = match context {
        Some(context) if !context.is_empty() => format!("{}, call", context),
        _ => "Call".to_string(),
    };

    vec![
        format!(
            "{} a wildlife rehabilitator. They will be able to help {}, or give you advice on what to do next.",
            lead, subject
        ),
        FIND_REHABILITATOR.to_string(),
    ]
}

/// Recommend leaving the animal alone and observing from a distance.
pub fn leave(subject: Option<&str>) -> Vec<String> {
    let subject = subject.unwrap_or(DEFAULT_SUBJECT);

    vec![
        format!(
            "Leave {} alone and keep yourself, and any pets, away from it.",
            subject
        ),
        format!(
            "If you are still concerned, you can monitor {} from a distance to make sure it is doing okay over a few days.",
            subject
        ),
        format!(
            "Do not feed or otherwise interfere with it, to avoid {} becoming dependent on humans.",
            subject
        ),
    ]
}

// ============================================================================
// MACROS AS DATA
// ============================================================================

/// A macro invocation that can be stored and expanded later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacroCall {
    Rehab {
        subject: Option<String>,
        context: Option<String>,
    },
    Leave {
        subject: Option<String>,
    },
}

impl MacroCall {
    /// `rehab` about a specific subject, no context.
    pub fn rehab(subject: impl Into<String>) -> Self {
        MacroCall::Rehab {
            subject: Some(subject.into()),
            context: None,
        }
    }

    /// `leave` about a specific subject.
    pub fn leave(subject: impl Into<String>) -> Self {
        MacroCall::Leave {
            subject: Some(subject.into()),
        }
    }

    /// Attach a leading condition. Only meaningful for `Rehab`.
    pub fn when(self, condition: impl Into<String>) -> Self {
        match self {
            MacroCall::Rehab { subject, .. } => MacroCall::Rehab {
                subject,
                context: Some(condition.into()),
            },
            other => other,
        }
    }

    pub fn expand(&self) -> Vec<String> {
        match self {
            MacroCall::Rehab { subject, context } => {
                rehab(subject.as_deref(), context.as_deref())
            }
            MacroCall::Leave { subject } => leave(subject.as_deref()),
        }
    }
}

/// A piece of a prompt: either a literal line or a macro expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptPart {
    Line(String),
    Macro(MacroCall),
}

impl From<&str> for PromptPart {
    fn from(line: &str) -> Self {
        PromptPart::Line(line.to_string())
    }
}

impl From<String> for PromptPart {
    fn from(line: String) -> Self {
        PromptPart::Line(line)
    }
}

impl From<MacroCall> for PromptPart {
    fn from(call: MacroCall) -> Self {
        PromptPart::Macro(call)
    }
}

/// Compose a prompt, splicing macro output in place.
///
/// Literal lines and each macro's own lines keep their relative order.
pub fn splice<I>(parts: I) -> Vec<String>
where
    I: IntoIterator<Item = PromptPart>,
{
    let mut lines = Vec::new();
    for part in parts {
        match part {
            PromptPart::Line(line) => lines.push(line),
            PromptPart::Macro(call) => lines.extend(call.expand()),
        }
    }
    lines
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rehab_defaults_are_standalone() {
        let lines = rehab(None, None);
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "Call a wildlife rehabilitator. They will be able to help it, or give you advice on what to do next."
        );
        assert!(lines[1].starts_with("To find a local wildlife rehabilitator"));
    }

    #[test]
    fn rehab_with_context_prefixes_first_line() {
        let lines = rehab(Some("the bird"), Some("If the parents do not return"));
        assert!(lines[0].starts_with("If the parents do not return, call a wildlife rehabilitator."));
        assert!(lines[0].contains("help the bird,"));
    }

    #[test]
    fn rehab_empty_context_counts_as_omitted() {
        assert_eq!(rehab(Some("the cat"), Some("")), rehab(Some("the cat"), None));
    }

    #[test]
    fn empty_subject_does_not_panic() {
        let lines = rehab(Some(""), None);
        assert!(lines[0].contains("help , or"));
        let lines = leave(Some(""));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn leave_mentions_subject_in_every_line_but_feeding() {
        let lines = leave(Some("the deer"));
        assert_eq!(
            lines[0],
            "Leave the deer alone and keep yourself, and any pets, away from it."
        );
        assert!(lines[1].contains("monitor the deer"));
        assert!(lines[2].contains("avoid the deer becoming dependent"));
    }

    #[test]
    fn macros_are_deterministic() {
        assert_eq!(leave(None), leave(None));
        assert_eq!(rehab(Some("x"), Some("y")), rehab(Some("x"), Some("y")));
    }

    #[test]
    fn macro_call_expands_like_the_function() {
        let call = MacroCall::rehab("the squirrel").when("If it is alone");
        assert_eq!(
            call.expand(),
            rehab(Some("the squirrel"), Some("If it is alone"))
        );
        assert_eq!(MacroCall::leave("the cat").expand(), leave(Some("the cat")));
    }

    #[test]
    fn when_is_ignored_for_leave() {
        let call = MacroCall::leave("the cat").when("ignored");
        assert_eq!(call, MacroCall::leave("the cat"));
    }

    #[test]
    fn splice_preserves_positions() {
        let lines = splice([
            "First.".into(),
            MacroCall::leave("the raccoon").into(),
            "Last.".into(),
        ]);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "First.");
        assert!(lines[1].starts_with("Leave the raccoon alone"));
        assert!(lines[3].starts_with("Do not feed"));
        assert_eq!(lines[4], "Last.");
    }
}
