use std::fmt;

use serde::Deserialize;

/// How the provisioner picks one artifact among several candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Smallest matching name; independent of listing order.
    #[default]
    Lexicographic,
    /// First match in the order the store listed them.
    FirstListed,
    /// Exactly one candidate must match.
    ExactlyOne,
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SelectionPolicy::Lexicographic => "lexicographic",
            SelectionPolicy::FirstListed => "first_listed",
            SelectionPolicy::ExactlyOne => "exactly_one",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactSelection {
    Selected(String),
    NoMatch,
    Ambiguous(Vec<String>),
}

/// Applies `policy` to the object names whose suffix matches `suffix`.
pub fn select_artifact<S: AsRef<str>>(
    names: &[S],
    suffix: &str,
    policy: SelectionPolicy,
) -> ArtifactSelection {
    let candidates: Vec<&str> = names
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| name.ends_with(suffix))
        .collect();

    let chosen = match policy {
        SelectionPolicy::FirstListed => candidates.first().copied(),
        SelectionPolicy::Lexicographic => candidates.iter().min().copied(),
        SelectionPolicy::ExactlyOne => {
            if candidates.len() > 1 {
                return ArtifactSelection::Ambiguous(
                    candidates.into_iter().map(String::from).collect(),
                );
            }
            candidates.first().copied()
        }
    };

    match chosen {
        Some(name) => ArtifactSelection::Selected(name.to_string()),
        None => ArtifactSelection::NoMatch,
    }
}
