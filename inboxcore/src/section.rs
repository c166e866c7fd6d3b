/// Categorization predicate for one inbox section. Absent fields match
/// everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionPredicate {
    pub category: Option<&'static str>,
    pub status: Option<&'static str>,
}

/// Maps a section key to its categorization predicate. Unknown or empty
/// sections return `None`, which the pipeline turns into an empty result
/// set rather than an error.
pub fn categorization(section: &str) -> Option<SectionPredicate> {
    let predicate = match section {
        "unified-inbox" => SectionPredicate::default(),
        "agent-inbox-active" => SectionPredicate {
            category: Some("agent-inbox"),
            status: Some("active"),
        },
        "agent-inbox-resolved" => SectionPredicate {
            category: Some("agent-inbox"),
            status: Some("resolved"),
        },
        "my-inbox-chats" => SectionPredicate {
            category: Some("human-chats"),
            status: Some("active"),
        },
        "my-inbox-escalated" => SectionPredicate {
            category: Some("human-chats"),
            status: Some("escalated"),
        },
        "my-inbox-resolved" => SectionPredicate {
            category: Some("human-chats"),
            status: Some("resolved"),
        },
        _ => return None,
    };
    Some(predicate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_sections_resolve() {
        let p = categorization("my-inbox-escalated").unwrap();
        assert_eq!(p.category, Some("human-chats"));
        assert_eq!(p.status, Some("escalated"));
    }

    #[test]
    fn unified_inbox_matches_everything() {
        let p = categorization("unified-inbox").unwrap();
        assert_eq!(p, SectionPredicate::default());
    }

    #[test]
    fn unknown_and_empty_sections_yield_none() {
        assert!(categorization("").is_none());
        assert!(categorization("billing-inbox").is_none());
    }
}
