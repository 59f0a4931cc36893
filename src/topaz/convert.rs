//! Read shape → write shape conversion.

use super::models::{PromoteCard, RawRecord, WriteRecord};

/// Convert a fetched project into the shape the update endpoint accepts.
///
/// * `title`, `description`, `body` and `published` are copied as-is,
///   including `null`.
/// * `github_url`, `reference_url` and `thumbnail_path` fall back to `""`.
/// * `technology_tag_list` becomes the list of tag ids, in order.
/// * `promote` becomes a list of `{title, body}` cards in key order.
///
/// Never fails: missing inputs yield defaults.
pub fn convert(raw: &RawRecord) -> WriteRecord {
  let technology_tag_id_list = raw
    .technology_tag_list
    .iter()
    .flatten()
    .map(|tag| tag.id.clone())
    .collect();

  let promote_card_list = raw
    .promote
    .iter()
    .flat_map(|cards| cards.cards())
    .map(|card| PromoteCard {
      title: card.title.clone(),
      body: card.body.clone(),
    })
    .collect();

  WriteRecord {
    title: raw.title.clone(),
    description: raw.description.clone(),
    body: raw.body.clone(),
    github_url: raw.github_url.clone().unwrap_or_default(),
    reference_url: raw.reference_url.clone().unwrap_or_default(),
    thumbnail_path: raw.thumbnail_path.clone().unwrap_or_default(),
    technology_tag_id_list,
    promote_card_list,
    published: raw.published.clone(),
  }
}
