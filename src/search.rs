/// High-level, user-facing mailbox search filters. These map to Gmail query
/// syntax; the mailbox collaborator runs the resulting query.
#[derive(Debug, Clone)]
pub struct SearchFilters {
    pub text: Option<String>,
    pub from_addr: Option<String>,
    pub newer_than_days: Option<u32>,
    pub unread_only: bool,
    pub inbox_only: bool,
}

impl Default for SearchFilters {
    fn default() -> Self {
        SearchFilters {
            text: None,
            from_addr: None,
            newer_than_days: None,
            unread_only: true,
            inbox_only: true,
        }
    }
}

/// Render filters as a Gmail query string.
pub fn build_query(filters: &SearchFilters) -> String {
    let mut parts: Vec<String> = Vec::new();

    if filters.inbox_only {
        parts.push("in:inbox".to_string());
    }
    if filters.unread_only {
        parts.push("is:unread".to_string());
    }
    if let Some(from) = &filters.from_addr {
        parts.push(format!("from:{from}"));
    }
    if let Some(days) = filters.newer_than_days {
        parts.push(format!("newer_than:{days}d"));
    }
    if let Some(text) = &filters.text {
        // Bare text is a full-text search.
        parts.push(text.clone());
    }

    parts.join(" ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_query() {
        assert_eq!(build_query(&SearchFilters::default()), "in:inbox is:unread");
    }

    #[test]
    fn test_all_filters() {
        let filters = SearchFilters {
            text: Some("invoice".to_string()),
            from_addr: Some("billing@example.com".to_string()),
            newer_than_days: Some(7),
            unread_only: true,
            inbox_only: true,
        };
        assert_eq!(
            build_query(&filters),
            "in:inbox is:unread from:billing@example.com newer_than:7d invoice"
        );
    }

    #[test]
    fn test_everything_off_is_empty() {
        let filters = SearchFilters {
            unread_only: false,
            inbox_only: false,
            ..Default::default()
        };
        assert_eq!(build_query(&filters), "");
    }
}
