use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use snipbin_common::{base64, Lifetime};

/// Human-readable timestamp format for the show page.
const DISPLAY_FORMAT: &str = "%A, %B %-d %Y, %I:%M:%S";

/// A stored paste document. The identifier is the storage key, not a field.
#[derive(Serialize, Deserialize)]
pub struct Paste {
    pub code: String,
    pub highlight: Option<String>,
    pub lifetime: Lifetime,
    pub created: DateTime<Utc>,
    pub expires: DateTime<Utc>,
}

impl Paste {
    /// Assembles a document, fixing `expires` from the creation time and the
    /// lifetime. `expires` is never recomputed afterwards.
    pub fn new(
        code: String,
        highlight: Option<String>,
        lifetime: Lifetime,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            expires: lifetime.expires_at(created),
            code,
            highlight,
            lifetime,
            created,
        }
    }

    /// Whether the cleanup sweep at `cutoff` would remove this document.
    pub fn expired_by(&self, cutoff: DateTime<Utc>) -> bool {
        self.expires < cutoff
    }
}

/// Clamps `code` to at most `limit` bytes, backing off to a char boundary.
/// Oversized input is silently truncated, never rejected.
pub fn truncate(code: &mut String, limit: usize) {
    if code.len() <= limit {
        return;
    }

    let mut end = limit;
    while !code.is_char_boundary(end) {
        end -= 1;
    }
    code.truncate(end);
}

/// Display-ready projection of a paste for the show page. The content is
/// Base64 encoded so arbitrary text embeds safely in the rendered markup.
#[derive(Serialize)]
pub struct PasteView {
    pub id: String,
    pub code: String,
    pub highlight: Option<String>,
    pub lifetime: Lifetime,
    pub created: String,
    pub expires: String,
}

impl PasteView {
    pub fn new(id: &str, paste: &Paste) -> Self {
        Self {
            id: id.to_owned(),
            code: base64::encode(&paste.code),
            highlight: paste.highlight.clone(),
            lifetime: paste.lifetime,
            created: paste.created.format(DISPLAY_FORMAT).to_string(),
            expires: paste.expires.format(DISPLAY_FORMAT).to_string(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    #[test]
    fn truncate_clamps_to_exactly_the_limit() {
        let mut code = "x".repeat(100);
        truncate(&mut code, 10);
        assert_eq!(code.len(), 10);
    }

    #[test]
    fn truncate_leaves_short_content_alone() {
        let mut code = String::from("short");
        truncate(&mut code, 10);
        assert_eq!(code, "short");
    }

    #[test]
    fn truncate_backs_off_to_a_char_boundary() {
        // 'é' is two bytes; a two byte limit lands in the middle of it
        let mut code = String::from("née");
        truncate(&mut code, 2);
        assert_eq!(code, "n");
    }

    #[test]
    fn expiry_is_fixed_at_creation() {
        let created = Utc.with_ymd_and_hms(2023, 5, 1, 8, 0, 0).unwrap();
        let paste = Paste::new("abc".into(), None, Lifetime::Week, created);

        assert_eq!(paste.expires, created + Duration::days(7));
        assert!(!paste.expired_by(paste.expires));
        assert!(paste.expired_by(paste.expires + Duration::seconds(1)));
    }

    #[test]
    fn view_encodes_content_and_formats_timestamps() {
        let created = Utc.with_ymd_and_hms(2023, 5, 1, 8, 0, 0).unwrap();
        let paste = Paste::new(
            "fn main() {}".into(),
            Some("rust".into()),
            Lifetime::Day,
            created,
        );

        let view = PasteView::new("abc123", &paste);
        assert_eq!(view.code, base64::encode("fn main() {}"));
        assert_eq!(view.created, "Monday, May 1 2023, 08:00:00");
        assert!(!view.expires.is_empty());

        let json = view.to_json().unwrap();
        assert!(json.contains("\"highlight\": \"rust\""));
        assert!(json.contains("\"lifetime\": \"day\""));
    }
}
