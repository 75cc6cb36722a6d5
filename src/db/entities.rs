use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// This is also exactly what the JSON file store writes
// out, hence the camelCase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
  pub id: String,
  pub title: String,
  pub slug: String,
  pub meta_description: String,
  pub image_url: String,
  pub content: String,
  pub date: DateTime<Utc>,
  pub author: String
}

// Everything is optional so that validation can tell
// which fields are missing instead of failing on the
// first one.
// "slug" is the "url" field of the request body.
#[derive(Debug, Clone, Default)]
pub struct NewArticle {
  pub title: Option<String>,
  pub slug: Option<String>,
  pub meta_description: Option<String>,
  pub image_url: Option<String>,
  pub content: Option<String>,
  pub date: Option<DateTime<Utc>>,
  pub author: Option<String>
}

// Object I use to fit my "update only what's in
// the request body" agenda.
#[derive(Debug, Clone, Default)]
pub struct ArticleUpdate {
  pub title: Option<String>,
  pub slug: Option<String>,
  pub meta_description: Option<String>,
  pub image_url: Option<String>,
  pub content: Option<String>,
  pub date: Option<DateTime<Utc>>,
  pub author: Option<String>
}
