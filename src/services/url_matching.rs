//! URL eligibility and host match-pattern evaluation.
//!
//! Only `http` and `https` pages may carry an overlay. Match patterns follow
//! the host's content-script syntax: `<all_urls>`, `*://*.example.com/*`,
//! `https://example.com/path*`.

use url::Url;

/// Patterns used to find every page that could host an overlay.
pub const ELIGIBLE_PATTERNS: [&str; 2] = ["http://*/*", "https://*/*"];

/// Returns true when the URL's scheme is exactly `http` or `https`.
pub fn is_eligible_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Check if a URL matches a single match pattern.
pub fn url_matches_pattern(url: &str, pattern: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let scheme = parsed.scheme();
    if scheme != "http" && scheme != "https" {
        return false;
    }
    if pattern == "<all_urls>" {
        return true;
    }

    let Some((scheme_pat, rest)) = pattern.split_once("://") else {
        return false;
    };
    if scheme_pat != "*" && scheme_pat != scheme {
        return false;
    }

    let (host_pat, path_pat) = match rest.split_once('/') {
        Some((h, p)) => (h, format!("/{}", p)),
        None => (rest, "/".to_string()),
    };

    let host = parsed.host_str().unwrap_or("");
    if host_pat != "*" {
        if let Some(domain) = host_pat.strip_prefix("*.") {
            if host != domain && !host.ends_with(&format!(".{}", domain)) {
                return false;
            }
        } else if host_pat != host {
            return false;
        }
    }

    let mut path = parsed.path().to_string();
    if let Some(query) = parsed.query() {
        path.push('?');
        path.push_str(query);
    }
    simple_glob_match(&path_pat, &path)
}

/// True when the URL matches any of the patterns.
pub fn url_matches_any(url: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|p| url_matches_pattern(url, p))
}

fn simple_glob_match(pattern: &str, text: &str) -> bool {
    if pattern == "/*" || pattern == "*" {
        return true;
    }
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == text;
    }
    let mut pos = 0;
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        match text[pos..].find(part) {
            Some(idx) => {
                if i == 0 && idx != 0 {
                    return false;
                }
                pos += idx + part.len();
            }
            None => return false,
        }
    }
    // A pattern not ending in `*` must consume the whole text.
    match parts.last() {
        Some(last) if !last.is_empty() => text.ends_with(last),
        _ => true,
    }
}
