//! Prefix-pattern routing: `"file.*"` matches `"file.processed"` and
//! `"file.failed"`; an exact pattern matches only itself.

#[derive(Debug, Default)]
pub struct RoutingTable {
    rules: Vec<(String, String)>,
}

impl RoutingTable {
    pub fn add(&mut self, pattern: &str, consumer_name: String) {
        self.rules.push((pattern.to_string(), consumer_name));
    }

    pub fn match_consumers(&self, event_type: &str) -> Vec<String> {
        self.rules
            .iter()
            .filter(|(pattern, _)| pattern_matches(pattern, event_type))
            .map(|(_, name)| name.clone())
            .collect()
    }
}

fn pattern_matches(pattern: &str, event_type: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => event_type.starts_with(prefix),
        None => pattern == event_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_pattern_matches_only_itself() {
        assert!(pattern_matches("account.created", "account.created"));
        assert!(!pattern_matches("account.created", "account.updated"));
    }

    #[test]
    fn wildcard_suffix_matches_prefix() {
        assert!(pattern_matches("file.*", "file.processed"));
        assert!(!pattern_matches("file.*", "transaction.created"));
    }
}
