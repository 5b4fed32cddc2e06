/// A runnable item offered to the user: a test name and the suite it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub group: String,
}

impl Candidate {
    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
        }
    }

    /// `group#name`, the label used when a list mixes several groups.
    pub fn qualified_name(&self) -> String {
        format!("{}#{}", self.group, self.name)
    }
}

/// Parse a candidate list, one `group#name` (or bare `name`) per line.
///
/// Blank lines and `//` comments are skipped.
pub fn parse_candidates(input: &str) -> Vec<Candidate> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("//"))
        .map(|line| match line.split_once('#') {
            Some((group, name)) => Candidate::new(group.trim(), name.trim()),
            None => Candidate::new("", line),
        })
        .collect()
}
