//! Per-hop request header composition.

use std::collections::BTreeMap;

use url::Url;

/// Baseline browser header set, matching the Chrome 133 identity profile
/// the outbound clients present.
const DEFAULT_HEADERS: &[(&str, &str)] = &[
    ("Accept", "application/json, text/plain, */*"),
    ("Accept-Language", "tr-TR,tr;q=0.9,en-US;q=0.8,en;q=0.7"),
    ("Accept-Encoding", "gzip, deflate, br, zstd"),
    ("Cache-Control", "no-cache"),
    ("Pragma", "no-cache"),
    (
        "User-Agent",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) \
         Chrome/133.0.0.0 Safari/537.36",
    ),
    (
        "Sec-Ch-Ua",
        "\"Not(A:Brand\";v=\"99\", \"Google Chrome\";v=\"133\", \"Chromium\";v=\"133\"",
    ),
    ("Sec-Ch-Ua-Mobile", "?0"),
    ("Sec-Ch-Ua-Platform", "\"macOS\""),
    ("Sec-Fetch-Dest", "empty"),
    ("Sec-Fetch-Mode", "cors"),
    ("Sec-Fetch-Site", "same-site"),
];

/// Builds the header set for one hop.
///
/// `Origin` and `Referer` derive from the hop URL, so the set must be
/// recomputed on every redirect; caller-supplied headers are applied last
/// and win on (case-insensitive) name collision.
pub struct HeaderComposer;

impl HeaderComposer {
    pub fn compose(url: &Url, user_headers: &BTreeMap<String, String>) -> Vec<(String, String)> {
        let mut headers: Vec<(String, String)> = DEFAULT_HEADERS
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        let origin = url.origin().ascii_serialization();
        apply(&mut headers, "Origin", origin.clone());
        apply(&mut headers, "Referer", format!("{origin}/"));

        for (name, value) in user_headers {
            apply(&mut headers, name, value.clone());
        }

        headers
    }
}

/// Replace the first case-insensitive match, or append.
fn apply(headers: &mut Vec<(String, String)>, name: &str, value: String) {
    match headers
        .iter_mut()
        .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
    {
        Some((_, existing_value)) => *existing_value = value,
        None => headers.push((name.to_string(), value)),
    }
}
