//! SubDB wire protocol
//!
//! All four operations hit the same root address and are selected by the
//! `action` query parameter. Responses are plain text (CSV) except for
//! downloads, which are raw subtitle bytes.

/// Boundary token of the hand-built upload body
pub const UPLOAD_BOUNDARY: &str = "xYzZY";

/// Content type sent with upload requests
pub const UPLOAD_CONTENT_TYPE: &str = "multipart/form-data; boundary=xYzZY";

/// Content type of the subtitle part inside the upload body
pub const SUBTITLE_PART_CONTENT_TYPE: &str = "application/octet-stream";

/// HTTP method used by an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One API operation and its parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Languages,
    Search {
        hash: String,
        version: Option<String>,
    },
    Download { hash: String, language: String },
    Upload { hash: String },
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl Action {
    pub fn method(&self) -> Method {
        match self {
            Action::Upload { .. } => Method::Post,
            _ => Method::Get,
        }
    }

    /// Query string appended to the API root, including the leading `?`
    pub fn query(&self) -> String {
        match self {
            Action::Languages => "?action=languages".to_string(),
            Action::Search { hash, version } => {
                let mut query = format!("?action=search&hash={}", hash);
                if let Some(v) = version.as_deref().filter(|v| !v.is_empty()) {
                    query.push_str(&format!("&version={}", v));
                }
                query
            }
            Action::Download { hash, language } => {
                format!("?action=download&hash={}&language={}", hash, language)
            }
            Action::Upload { hash } => format!("?action=upload&hash={}", hash),
        }
    }

    /// Full request URL for `base_url`
    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url, self.query())
    }
}

/// Render the multipart body of an upload, byte for byte what the API expects.
pub fn upload_body(hash: &str, subtitle: &str) -> String {
    let b = UPLOAD_BOUNDARY;
    [
        format!("--{}", b),
        "Content-Disposition: form-data; name=\"hash\"".to_string(),
        String::new(),
        hash.to_string(),
        format!("--{}", b),
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}.srt\"",
            hash
        ),
        format!("Content-Type: {}", SUBTITLE_PART_CONTENT_TYPE),
        "Content-Transfer-Encoding: binary".to_string(),
        String::new(),
        subtitle.to_string(),
        String::new(),
        format!("--{}", b),
        String::new(),
    ]
    .join("\r\n")
}

/// Split the CSV language list. Entries are kept verbatim (no trimming);
/// an empty body is an empty vocabulary.
pub fn parse_languages(body: &str) -> Vec<String> {
    if body.is_empty() {
        return Vec::new();
    }
    body.split(',').map(str::to_string).collect()
}

/// One language available for a searched hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub language: String,
    /// Number of versions, only present when the search asked for versions
    pub versions: Option<u32>,
}

/// Parse a search response of the form `en,pt` or `en:2,pt:1`.
pub fn parse_search(body: &str) -> Vec<SearchHit> {
    body.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| match item.split_once(':') {
            Some((language, count)) => SearchHit {
                language: language.to_string(),
                versions: count.parse().ok(),
            },
            None => SearchHit {
                language: item.to_string(),
                versions: None,
            },
        })
        .collect()
}

/// Decode a text response as UTF-8, replacing invalid sequences
pub fn decode_text(body: &[u8]) -> String {
    String::from_utf8_lossy(body).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search(version: Option<&str>) -> Action {
        Action::Search {
            hash: "abc".into(),
            version: version.map(str::to_string),
        }
    }

    fn hit(language: &str, versions: u32) -> SearchHit {
        SearchHit {
            language: language.into(),
            versions: Some(versions),
        }
    }

    #[test]
    fn query_strings() {
        assert_eq!(Action::Languages.query(), "?action=languages");
        assert_eq!(search(None).query(), "?action=search&hash=abc");
        assert_eq!(search(Some("")).query(), "?action=search&hash=abc");
        assert_eq!(search(Some("2")).query(), "?action=search&hash=abc&version=2");
        let download = Action::Download {
            hash: "abc".into(),
            language: "pt".into(),
        };
        assert_eq!(download.query(), "?action=download&hash=abc&language=pt");
        assert_eq!(
            Action::Upload { hash: "abc".into() }.url("http://sandbox.thesubdb.com/"),
            "http://sandbox.thesubdb.com/?action=upload&hash=abc"
        );
    }

    #[test]
    fn only_upload_posts() {
        assert_eq!(Action::Upload { hash: "x".into() }.method(), Method::Post);
        assert_eq!(Action::Languages.method(), Method::Get);
        assert_eq!(search(None).method().as_str(), "GET");
    }

    #[test]
    fn upload_body_layout() {
        let expected = "--xYzZY\r\n\
            Content-Disposition: form-data; name=\"hash\"\r\n\
            \r\n\
            abc123\r\n\
            --xYzZY\r\n\
            Content-Disposition: form-data; name=\"file\"; filename=\"abc123.srt\"\r\n\
            Content-Type: application/octet-stream\r\n\
            Content-Transfer-Encoding: binary\r\n\
            \r\n\
            Hello\r\n\
            \r\n\
            --xYzZY\r\n";
        assert_eq!(upload_body("abc123", "Hello"), expected);
    }

    #[test]
    fn languages_keep_order_and_whitespace() {
        assert_eq!(parse_languages("en,pt,fr"), vec!["en", "pt", "fr"]);
        assert_eq!(parse_languages("en, pt"), vec!["en", " pt"]);
        assert!(parse_languages("").is_empty());
    }

    #[test]
    fn search_hits() {
        assert_eq!(
            parse_search("en:2,pt:1"),
            vec![hit("en", 2), hit("pt", 1)]
        );
        assert_eq!(parse_search("en,fr\n")[1].language, "fr");
        assert!(parse_search("").is_empty());
    }

    #[test]
    fn lossy_text() {
        assert_eq!(decode_text(b"en,pt"), "en,pt");
        assert_eq!(decode_text(&[b'o', b'k', 0xff]), "ok\u{fffd}");
    }
}
