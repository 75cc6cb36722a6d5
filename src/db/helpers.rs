use uuid::Uuid;
use super::entities::*;
use super::{StoreError, StoreResult};
use crate::utils::{text_utils, time_utils};

// Names are the JSON ones since they end up in the
// error body.
pub const TITLE: &str = "title";
pub const SLUG: &str = "url";
pub const META_DESCRIPTION: &str = "metaDescription";
pub const IMAGE_URL: &str = "imageUrl";
pub const CONTENT: &str = "content";

fn is_blank(value: &str) -> bool {
  value.trim().is_empty()
}

fn required(
  value: Option<String>,
  field: &str,
  missing: &mut Vec<String>
) -> String {
  match value {
    Some(v) if !is_blank(&v) => v,
    _ => {
      missing.push(field.to_string());
      String::new()
    }
  }
}

// A supplied slug goes through slugify too, it has to
// be URL-safe either way.
fn derive_slug(explicit: Option<&str>, title: &str) -> StoreResult<String> {
  let slug = match explicit {
    Some(s) if !is_blank(s) => text_utils::slugify(s),
    _ => text_utils::slugify(title)
  };
  if slug.is_empty() {
    let field = if explicit.map_or(false, |s| !is_blank(s)) { SLUG } else { TITLE };
    return Err(StoreError::Validation(vec![field.to_string()]));
  }
  Ok(slug)
}

/**
 * Validates the required fields and fills in everything the
 * caller may leave out: id, slug, date and author.
 * Uniqueness of the slug is left to the store.
 */
pub fn build_article(
  new_article: NewArticle,
  default_author: &str
) -> StoreResult<Article> {
  let mut missing: Vec<String> = Vec::new();
  let title = required(new_article.title, TITLE, &mut missing);
  let meta_description = required(
    new_article.meta_description,
    META_DESCRIPTION,
    &mut missing
  );
  let image_url = required(new_article.image_url, IMAGE_URL, &mut missing);
  let content = required(new_article.content, CONTENT, &mut missing);
  if !missing.is_empty() {
    return Err(StoreError::Validation(missing));
  }
  let slug = derive_slug(new_article.slug.as_deref(), &title)?;
  let author = new_article.author
    .filter(|a| !is_blank(a))
    .unwrap_or_else(|| default_author.to_string());
  Ok(Article {
    id: Uuid::new_v4().to_string(),
    title,
    slug,
    meta_description,
    image_url,
    content,
    date: new_article.date
      .map(time_utils::whole_seconds)
      .unwrap_or_else(time_utils::now),
    author
  })
}

/**
 * Merges an update onto a copy of the current record.
 * The slug changes when one is explicitly supplied, or
 * when the title changes. The id never does.
 */
pub fn merge_update(
  current: &Article,
  update: ArticleUpdate
) -> StoreResult<Article> {
  let mut missing: Vec<String> = Vec::new();
  let mut check = |value: &Option<String>, field: &str| {
    if let Some(v) = value {
      if is_blank(v) {
        missing.push(field.to_string());
      }
    }
  };
  check(&update.title, TITLE);
  check(&update.meta_description, META_DESCRIPTION);
  check(&update.image_url, IMAGE_URL);
  check(&update.content, CONTENT);
  if !missing.is_empty() {
    return Err(StoreError::Validation(missing));
  }

  let mut article = current.clone();
  let title_changed = update.title.as_ref()
    .map_or(false, |t| *t != current.title);
  if let Some(title) = update.title {
    article.title = title;
  }
  if update.slug.is_some() || title_changed {
    article.slug = derive_slug(update.slug.as_deref(), &article.title)?;
  }
  if let Some(meta_description) = update.meta_description {
    article.meta_description = meta_description;
  }
  if let Some(image_url) = update.image_url {
    article.image_url = image_url;
  }
  if let Some(content) = update.content {
    article.content = content;
  }
  if let Some(date) = update.date {
    article.date = time_utils::whole_seconds(date);
  }
  if let Some(author) = update.author.filter(|a| !is_blank(a)) {
    article.author = author;
  }
  Ok(article)
}

// Used when records come in whole (data transform, JSON
// file load), they still have to respect the invariants.
// Gives the record back with its date cut to the second.
pub fn check_complete(mut article: Article) -> StoreResult<Article> {
  let mut missing: Vec<String> = Vec::new();
  for (value, field) in [
    (&article.title, TITLE),
    (&article.meta_description, META_DESCRIPTION),
    (&article.image_url, IMAGE_URL),
    (&article.content, CONTENT)
  ] {
    if is_blank(value) {
      missing.push(field.to_string());
    }
  }
  if article.slug.is_empty() || text_utils::slugify(&article.slug) != article.slug {
    missing.push(SLUG.to_string());
  }
  if !missing.is_empty() {
    return Err(StoreError::Validation(missing));
  }
  article.date = time_utils::whole_seconds(article.date);
  Ok(article)
}

// Newest first. The sort is stable so articles sharing
// a date stay in insertion order.
pub fn sort_newest_first(articles: &mut [Article]) {
  articles.sort_by(|a, b| b.date.cmp(&a.date));
}
