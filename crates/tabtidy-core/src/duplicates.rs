use std::collections::{HashMap, HashSet};
use url::Url;

use crate::browser::Tab;

/// Result of partitioning a tab snapshot by normalized URL
#[derive(Debug, Default)]
pub struct DuplicateReport {
    /// First occurrence of each normalized URL, in snapshot order
    pub keep: Vec<Tab>,
    /// Later occurrences, marked for closure
    pub close: Vec<Tab>,
    /// Raw hostnames appearing on two or more tabs. Informational only;
    /// closure is driven by the normalized-URL partition above.
    pub duplicate_domains: Vec<String>,
}

/// Strip query string and fragment; the remainder is the duplicate key
fn normalize(raw: &str) -> Option<(String, Option<String>)> {
    let mut url = Url::parse(raw).ok()?;
    let host = url.host_str().map(ToString::to_string);
    url.set_query(None);
    url.set_fragment(None);
    Some((url.to_string(), host))
}

/// Partition a snapshot into tabs to keep and tabs to close. Snapshot order
/// is authoritative: the first tab seen for a normalized URL is kept, every
/// later one is closed. Tabs whose URL fails to parse are left alone.
#[must_use]
pub fn find_duplicates(tabs: &[Tab]) -> DuplicateReport {
    let mut seen: HashSet<String> = HashSet::new();
    let mut host_counts: HashMap<String, usize> = HashMap::new();
    let mut report = DuplicateReport::default();

    for tab in tabs {
        let Some((key, host)) = normalize(&tab.url) else {
            continue;
        };
        if let Some(host) = host {
            *host_counts.entry(host).or_default() += 1;
        }
        if seen.insert(key) {
            report.keep.push(tab.clone());
        } else {
            report.close.push(tab.clone());
        }
    }

    report.duplicate_domains = host_counts
        .into_iter()
        .filter(|(_, count)| *count >= 2)
        .map(|(host, _)| host)
        .collect();
    report.duplicate_domains.sort_unstable();

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::testing::tab;

    #[test]
    fn query_and_fragment_do_not_distinguish_tabs() {
        let tabs = vec![
            tab("1", "https://example.com/x?y=1"),
            tab("2", "https://example.com/x?y=2"),
            tab("3", "https://example.com/x#section"),
        ];
        let report = find_duplicates(&tabs);
        assert_eq!(report.keep.len(), 1);
        assert_eq!(report.keep[0].id, "1");
        let closed: Vec<_> = report.close.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(closed, vec!["2", "3"]);
    }

    #[test]
    fn first_occurrence_wins_positionally() {
        let tabs = vec![
            tab("a", "https://example.com/one"),
            tab("b", "https://example.com/two"),
            tab("c", "https://example.com/one"),
            tab("d", "https://example.com/two"),
        ];
        let report = find_duplicates(&tabs);
        let kept: Vec<_> = report.keep.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(kept, vec!["a", "b"]);
        let closed: Vec<_> = report.close.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(closed, vec!["c", "d"]);
    }

    #[test]
    fn unparseable_urls_are_excluded_entirely() {
        let tabs = vec![
            tab("1", "not a url"),
            tab("2", "not a url"),
            tab("3", "https://example.com/"),
        ];
        let report = find_duplicates(&tabs);
        assert_eq!(report.keep.len(), 1);
        assert!(report.close.is_empty());
    }

    #[test]
    fn rerunning_on_keep_set_is_idempotent() {
        let tabs = vec![
            tab("1", "https://example.com/a?x=1"),
            tab("2", "https://example.com/a?x=2"),
            tab("3", "https://example.com/b"),
            tab("4", "https://example.com/b#frag"),
        ];
        let first = find_duplicates(&tabs);
        assert_eq!(first.close.len(), 2);
        let second = find_duplicates(&first.keep);
        assert!(second.close.is_empty());
        assert_eq!(second.keep.len(), first.keep.len());
    }

    #[test]
    fn domain_report_uses_raw_hostnames() {
        let tabs = vec![
            tab("1", "https://example.com/a"),
            tab("2", "https://example.com/b"),
            tab("3", "https://www.example.com/a"),
            tab("4", "https://other.org/"),
        ];
        let report = find_duplicates(&tabs);
        // Distinct paths on the same host: no closure, but the host is reported
        assert!(report.close.is_empty());
        assert_eq!(report.duplicate_domains, vec!["example.com"]);
    }
}
