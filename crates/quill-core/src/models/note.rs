//! Note model

use serde::{Deserialize, Serialize};

/// A note as returned by the notes endpoint.
///
/// Uniqueness of `id` is the note store's business; the client only uses it
/// as a display key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Identifier assigned by the note store
    pub id: i64,
    /// Raw text content, may contain inline markup or arbitrary HTML
    pub content: String,
    /// Attribution string, sent as `owner_email` (older payloads use `owner`)
    #[serde(default, alias = "owner")]
    pub owner_email: Option<String>,
    /// Creation timestamp (Unix seconds)
    #[serde(default)]
    pub created_at: Option<i64>,
}

impl Note {
    /// Owner label for display, falling back to `anonymous`.
    #[must_use]
    pub fn owner_label(&self) -> &str {
        self.owner_email.as_deref().unwrap_or("anonymous")
    }
}

/// Body of a create-note request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDraft {
    pub content: String,
    pub email: String,
}

/// Response to a create-note request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedNote {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_accepts_server_row_shape() {
        let note: Note = serde_json::from_str(
            r#"{"id": 7, "content": "hi", "owner_email": "a@example.com", "created_at": 1700000000}"#,
        )
        .unwrap();
        assert_eq!(note.id, 7);
        assert_eq!(note.owner_label(), "a@example.com");
        assert_eq!(note.created_at, Some(1_700_000_000));
    }

    #[test]
    fn note_accepts_owner_alias_and_missing_fields() {
        let note: Note = serde_json::from_str(r#"{"id": 1, "content": "x", "owner": "bob"}"#).unwrap();
        assert_eq!(note.owner_email.as_deref(), Some("bob"));
        assert_eq!(note.created_at, None);

        let anonymous: Note = serde_json::from_str(r#"{"id": 2, "content": "y"}"#).unwrap();
        assert_eq!(anonymous.owner_label(), "anonymous");
    }
}
