//! Hostname allow-list matching.

/// The video site whose player markup the engine understands.
pub const KNOWN_VIDEO_SITE: &str = "youtube.com";

/// Whether `hostname` equals `site` or is a subdomain of it.
///
/// Matching respects the label boundary: `notexample.com` does not match
/// `example.com`.
pub fn host_matches(hostname: &str, site: &str) -> bool {
    let site = site.trim().trim_start_matches('.');
    if site.is_empty() {
        return false;
    }
    let hostname = hostname.trim_end_matches('.');

    if hostname.eq_ignore_ascii_case(site) {
        return true;
    }
    let Some(split) = hostname.len().checked_sub(site.len() + 1) else {
        return false;
    };
    match (hostname.get(split..split + 1), hostname.get(split + 1..)) {
        (Some("."), Some(suffix)) => suffix.eq_ignore_ascii_case(site),
        _ => false,
    }
}

/// Whether `hostname` is permitted by any entry of `sites`.
pub fn is_allowed<S: AsRef<str>>(hostname: &str, sites: &[S]) -> bool {
    sites.iter().any(|site| host_matches(hostname, site.as_ref()))
}

/// Whether `hostname` belongs to the known video site.
pub fn is_known_video_host(hostname: &str) -> bool {
    host_matches(hostname, KNOWN_VIDEO_SITE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(host_matches("example.com", "example.com"));
    }

    #[test]
    fn test_subdomain_match() {
        assert!(is_allowed("www.example.com", &["example.com"]));
        assert!(is_allowed("a.b.example.com", &["example.com"]));
    }

    #[test]
    fn test_dot_boundary() {
        assert!(!is_allowed("notexample.com", &["example.com"]));
        assert!(!is_allowed("example.com.evil.net", &["example.com"]));
    }

    #[test]
    fn test_any_entry_matches() {
        let sites = vec!["vimeo.com".to_string(), "youtube.com".to_string()];
        assert!(is_allowed("m.youtube.com", &sites));
        assert!(!is_allowed("twitch.tv", &sites));
    }

    #[test]
    fn test_empty_entries_match_nothing() {
        assert!(!is_allowed("example.com", &[""]));
        assert!(!is_allowed("example.com", &["  "]));
        let none: [&str; 0] = [];
        assert!(!is_allowed("example.com", &none));
    }

    #[test]
    fn test_case_and_trailing_dot() {
        assert!(host_matches("WWW.Example.COM", "example.com"));
        assert!(host_matches("www.example.com.", "example.com"));
        assert!(host_matches("www.example.com", ".example.com"));
    }

    #[test]
    fn test_known_video_host() {
        assert!(is_known_video_host("www.youtube.com"));
        assert!(is_known_video_host("youtube.com"));
        assert!(!is_known_video_host("youtube.com.example.org"));
        assert!(!is_known_video_host("notyoutube.com"));
    }
}
