/*
    Copyright 2025 MydriaTech AB

    Licensed under the Apache License 2.0 with Free world makers exception
    1.0.0 (the "License"); you may not use this file except in compliance with
    the License. You should have obtained a copy of the License with the source
    or binary distribution in file named

        LICENSE-Apache-2.0-with-FWM-Exception-1.0.0

    Unless required by applicable law or agreed to in writing, software
    distributed under the License is distributed on an "AS IS" BASIS,
    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
    See the License for the specific language governing permissions and
    limitations under the License.
*/

//! Normalization of tracked URLs.

use tally_dbp::tm::TelemetryError;
use tally_dbp::tm::TelemetryErrorKind;
use url::Url;

/// Normalize a URL to `host + path`.
///
/// Scheme, port, query, fragment and credentials are discarded. The parser
/// lower-cases the host. An empty path becomes `/` and trailing slashes are
/// stripped everywhere but at the root, so `https://HOST:443/a/b/`,
/// `host/a/b` and `host/a/b/` all normalize to `host/a/b`.
///
/// Input without a scheme is retried with `http://` prepended before being
/// rejected.
pub fn normalize_url(raw: &str) -> Result<String, TelemetryError> {
    if raw.is_empty() {
        return Err(TelemetryErrorKind::InvalidInput.error_with_msg("Empty URL."));
    }
    let parsed = Url::parse(raw)
        .ok()
        .filter(|url| url.host_str().is_some())
        .or_else(|| {
            Url::parse(&format!("http://{raw}"))
                .ok()
                .filter(|url| url.host_str().is_some())
        })
        .ok_or_else(|| {
            TelemetryErrorKind::InvalidInput.error_with_msg(format!("Invalid URL '{raw}'."))
        })?;
    let Some(host) = parsed.host_str() else {
        return Err(TelemetryErrorKind::InvalidInput.error_with_msg(format!("Invalid URL '{raw}'.")));
    };
    let mut path = parsed.path();
    if path.is_empty() {
        path = "/";
    }
    if path.len() > 1 {
        path = path.trim_end_matches('/');
    }
    Ok(format!("{host}{path}"))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn equivalent_spellings_normalize_identically() {
        assert_eq!(normalize_url("https://HOST:443/a/b/").unwrap(), "host/a/b");
        assert_eq!(normalize_url("host/a/b").unwrap(), "host/a/b");
        assert_eq!(normalize_url("host/a/b/").unwrap(), "host/a/b");
    }

    #[test]
    fn bare_host_keeps_the_root_path() {
        assert_eq!(normalize_url("example.com").unwrap(), "example.com/");
        assert_eq!(normalize_url("http://example.com/").unwrap(), "example.com/");
    }

    #[test]
    fn ports_query_and_fragment_are_discarded() {
        assert_eq!(
            normalize_url("http://example.com:8080/p?q=1#frag").unwrap(),
            "example.com/p"
        );
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(normalize_url("").is_err());
        assert!(normalize_url("http://").is_err());
        assert!(normalize_url("///").is_err());
    }
}
