//! Text helpers shared by the prompt renderer.

use crate::app::App;
use crate::candidate::Candidate;

pub const PROMPT: &str = "> ";

/// Display labels for a list of candidates.
///
/// When every candidate belongs to the same group the group is redundant and
/// only names are shown; otherwise each label is `group#name`.
pub fn candidate_labels(candidates: &[&Candidate]) -> Vec<String> {
    let single_group = candidates
        .first()
        .map(|first| candidates.iter().all(|c| c.group == first.group))
        .unwrap_or(true);

    candidates
        .iter()
        .map(|c| {
            if single_group {
                c.name.clone()
            } else {
                c.qualified_name()
            }
        })
        .collect()
}

/// `<matches>/<total>`, flagged while the query is not a valid pattern.
pub fn status_line(app: &App) -> String {
    let counts = format!("{}/{}", app.filtered.len(), app.total());
    if app.pattern_error.is_some() {
        format!("{counts} invalid pattern")
    } else {
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::PromptKey;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_same_group_uses_bare_names() {
        let candidates = [Candidate::new("S", "t1"), Candidate::new("S", "t2")];
        let refs: Vec<&Candidate> = candidates.iter().collect();
        assert_eq!(candidate_labels(&refs), vec!["t1", "t2"]);
    }

    #[test]
    fn test_mixed_groups_are_qualified() {
        let candidates = [Candidate::new("S", "t1"), Candidate::new("T", "t2")];
        let refs: Vec<&Candidate> = candidates.iter().collect();
        assert_eq!(candidate_labels(&refs), vec!["S#t1", "T#t2"]);
    }

    #[test]
    fn test_labels_follow_the_filtered_set() {
        let candidates = [Candidate::new("S", "t1"), Candidate::new("T", "t2")];
        let only_t2: Vec<&Candidate> = candidates.iter().skip(1).collect();
        assert_eq!(candidate_labels(&only_t2), vec!["t2"]);
        assert!(candidate_labels(&[]).is_empty());
    }

    #[test]
    fn test_status_line() {
        let candidates = [Candidate::new("S", "t1"), Candidate::new("S", "t2")];
        let mut app = App::new(&candidates);
        assert_eq!(status_line(&app), "2/2");

        app.handle_key(PromptKey::Byte(b'1'));
        assert_eq!(status_line(&app), "1/2");

        app.handle_key(PromptKey::Byte(b'['));
        assert_eq!(status_line(&app), "1/2 invalid pattern");
    }
}
