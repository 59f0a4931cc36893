//! Read and write shapes of a Topaz project.
//!
//! The edit endpoint returns a [`RawRecord`]; the update endpoint expects a
//! [`WriteRecord`]. Fields that are copied verbatim between the two are held
//! as `Option<serde_json::Value>`: `None` means the field was absent (and is
//! omitted on output), `Some(Value::Null)` means it was present as `null`.

use std::collections::HashMap;
use std::fmt;

use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Deserialize a present field as `Some`, even when its value is `null`.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  T::deserialize(deserializer).map(Some)
}

/// A project as returned by `GET /api/projects/{id}/edit`.
///
/// Fields not listed here are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawRecord {
  #[serde(default, deserialize_with = "present")]
  pub title: Option<Value>,
  #[serde(default, deserialize_with = "present")]
  pub description: Option<Value>,
  #[serde(default, deserialize_with = "present")]
  pub body: Option<Value>,
  /// Absent and `null` both become `""` on conversion.
  #[serde(default)]
  pub github_url: Option<String>,
  #[serde(default)]
  pub reference_url: Option<String>,
  #[serde(default)]
  pub thumbnail_path: Option<String>,
  #[serde(default, deserialize_with = "present")]
  pub published: Option<Value>,
  #[serde(default)]
  pub technology_tag_list: Option<Vec<TechnologyTag>>,
  #[serde(default)]
  pub promote: Option<PromoteCards>,
}

impl RawRecord {
  /// Parse the text returned by the edit endpoint.
  ///
  /// Only a JSON object is accepted; derived struct deserialization would
  /// otherwise fill fields positionally from an array.
  ///
  /// # Errors
  /// Returns [`Error::RecordDecode`] if the text is not a JSON object of the
  /// expected shape.
  pub fn from_json(text: &str) -> Result<Self> {
    serde_json::from_str::<HashMap<String, IgnoredAny>>(text).map_err(Error::RecordDecode)?;
    serde_json::from_str(text).map_err(Error::RecordDecode)
  }
}

/// Technology tag attached to a project.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TechnologyTag {
  /// Missing ids surface as `null` in the id list.
  #[serde(default)]
  pub id: Value,
}

/// A promotional card shown on the project page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromoteCard {
  #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
  pub title: Option<Value>,
  #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
  pub body: Option<Value>,
}

/// The `promote` mapping, kept in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromoteCards(Vec<(String, PromoteCard)>);

impl PromoteCards {
  /// Cards in the order their keys appeared.
  pub fn cards(&self) -> impl Iterator<Item = &PromoteCard> {
    self.0.iter().map(|(_, card)| card)
  }
}

impl<'de> Deserialize<'de> for PromoteCards {
  fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    struct CardsVisitor;

    impl<'de> Visitor<'de> for CardsVisitor {
      type Value = PromoteCards;

      fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of promote cards")
      }

      fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
      where
        A: MapAccess<'de>,
      {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, card)) = map.next_entry::<String, PromoteCard>()? {
          entries.push((key, card));
        }
        Ok(PromoteCards(entries))
      }
    }

    deserializer.deserialize_map(CardsVisitor)
  }
}

/// A project as accepted by `PUT /api/projects/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WriteRecord {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub title: Option<Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub body: Option<Value>,
  pub github_url: String,
  pub reference_url: String,
  pub thumbnail_path: String,
  pub technology_tag_id_list: Vec<Value>,
  pub promote_card_list: Vec<PromoteCard>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub published: Option<Value>,
}

impl WriteRecord {
  /// Replace the body with new content.
  pub fn with_body(self, body: impl Into<String>) -> Self {
    Self {
      body: Some(Value::String(body.into())),
      ..self
    }
  }

  /// Serialize for the update endpoint.
  ///
  /// # Errors
  /// Returns [`Error::RecordEncode`] if serialization fails.
  pub fn to_json(&self) -> Result<String> {
    serde_json::to_string(self).map_err(Error::RecordEncode)
  }

  /// Indented form for dry runs and `fetch --converted`.
  ///
  /// # Errors
  /// Returns [`Error::RecordEncode`] if serialization fails.
  pub fn to_json_pretty(&self) -> Result<String> {
    serde_json::to_string_pretty(self).map_err(Error::RecordEncode)
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn test_raw_record_distinguishes_null_from_absent() {
    let record = RawRecord::from_json(r#"{"title": null, "github_url": null}"#).unwrap();
    assert_eq!(record.title, Some(Value::Null));
    assert_eq!(record.description, None);
    assert_eq!(record.github_url, None);
  }

  #[test]
  fn test_raw_record_ignores_unknown_fields() {
    let record = RawRecord::from_json(r#"{"id": "p1", "user": {"name": "x"}, "title": "T"}"#).unwrap();
    assert_eq!(record.title, Some(json!("T")));
  }

  #[test]
  fn test_raw_record_rejects_non_object() {
    assert!(matches!(RawRecord::from_json("[1,2]"), Err(Error::RecordDecode(_))));
    assert!(matches!(
      RawRecord::from_json(r#"["Hijacked title", "desc", "old body", "https://x"]"#),
      Err(Error::RecordDecode(_))
    ));
    assert!(matches!(RawRecord::from_json("\"text\""), Err(Error::RecordDecode(_))));
    assert!(matches!(RawRecord::from_json("<html>"), Err(Error::RecordDecode(_))));
  }

  #[test]
  fn test_promote_cards_preserve_document_order() {
    let record = RawRecord::from_json(
      r#"{"promote": {
        "zeta": {"title": "Z", "body": "last key alphabetically"},
        "alpha": {"title": "A", "body": "first key alphabetically"},
        "mid": {"title": "M", "body": "middle"}
      }}"#,
    )
    .unwrap();

    let titles: Vec<&Value> = record
      .promote
      .as_ref()
      .unwrap()
      .cards()
      .filter_map(|card| card.title.as_ref())
      .collect();
    assert_eq!(titles, vec![&json!("Z"), &json!("A"), &json!("M")]);
  }

  #[test]
  fn test_promote_null_is_none() {
    let record = RawRecord::from_json(r#"{"promote": null, "technology_tag_list": null}"#).unwrap();
    assert!(record.promote.is_none());
    assert!(record.technology_tag_list.is_none());
  }

  #[test]
  fn test_write_record_omits_absent_passthrough_fields() {
    let record = WriteRecord {
      title: Some(Value::Null),
      ..Default::default()
    };
    let value: Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();
    let object = value.as_object().unwrap();
    assert_eq!(object.get("title"), Some(&Value::Null));
    assert!(!object.contains_key("description"));
    assert!(!object.contains_key("body"));
    assert!(!object.contains_key("published"));
    assert_eq!(object.get("github_url"), Some(&json!("")));
  }

  #[test]
  fn test_with_body_replaces_content() {
    let record = WriteRecord {
      body: Some(json!("old")),
      title: Some(json!("kept")),
      ..Default::default()
    }
    .with_body("# New content\n");

    assert_eq!(record.body, Some(json!("# New content\n")));
    assert_eq!(record.title, Some(json!("kept")));
  }
}
