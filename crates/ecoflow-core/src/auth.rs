//! Static allow-list of chat users.

/// Identifiers allowed to use the bot and to receive alerts.
///
/// An empty list means open mode: anyone may use the bot, and there is
/// nobody to send alerts to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    ids: Vec<String>,
}

impl AllowList {
    /// Build from individual identifiers, skipping blanks and duplicates.
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Vec::new();
        for id in ids {
            let id = id.into().trim().to_string();
            if !id.is_empty() && !list.contains(&id) {
                list.push(id);
            }
        }
        Self { ids: list }
    }

    /// Parse a comma-separated list such as `"123,456"`.
    pub fn parse(csv: &str) -> Self {
        Self::new(csv.split(','))
    }

    /// True when no identifiers are configured.
    pub fn is_open(&self) -> bool {
        self.ids.is_empty()
    }

    /// Check an actor. Matching is exact on the string form of the id.
    pub fn is_authorized(&self, actor: &str) -> bool {
        self.is_open() || self.ids.iter().any(|id| id == actor)
    }

    /// Identifiers that receive alerts.
    pub fn recipients(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_is_open() {
        let list = AllowList::parse("");
        assert!(list.is_open());
        assert!(list.is_authorized("123"));
        assert!(list.is_authorized("anyone"));
        assert!(list.recipients().is_empty());
    }

    #[test]
    fn test_only_separators_is_open() {
        let list = AllowList::parse(" , ,");
        assert!(list.is_open());
    }

    #[test]
    fn test_exact_match_required() {
        let list = AllowList::parse("123,456");
        assert!(!list.is_open());
        assert!(list.is_authorized("123"));
        assert!(list.is_authorized("456"));
        assert!(!list.is_authorized("12"));
        assert!(!list.is_authorized("1234"));
        assert!(!list.is_authorized(" 123"));
        assert!(!list.is_authorized(""));
    }

    #[test]
    fn test_parse_trims_and_dedupes() {
        let list = AllowList::parse(" 123 , 456,,123 ");
        assert_eq!(list.recipients(), &["123".to_string(), "456".to_string()]);
        assert_eq!(list.len(), 2);
    }
}
