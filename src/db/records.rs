// The memory and JSON file stores both keep a Vec of
// articles around, these are the operations they share.
// Callers are expected to hold their lock for the whole
// call so that the slug check and the write happen as one.
use super::entities::*;
use super::helpers;
use super::{not_found, slug_conflict, StoreError, StoreResult};

pub fn find<'a>(records: &'a [Article], id_or_slug: &str) -> Option<&'a Article> {
  records.iter()
    .find(|a| a.id == id_or_slug)
    .or_else(|| records.iter().find(|a| a.slug == id_or_slug))
}

pub fn find_by_slug<'a>(records: &'a [Article], slug: &str) -> Option<&'a Article> {
  records.iter().find(|a| a.slug == slug)
}

pub fn sorted(records: &[Article]) -> Vec<Article> {
  let mut articles = records.to_vec();
  helpers::sort_newest_first(&mut articles);
  articles
}

// Slug is taken by some record other than "except_id".
fn slug_taken(records: &[Article], slug: &str, except_id: Option<&str>) -> bool {
  records.iter()
    .any(|a| a.slug == slug && Some(a.id.as_str()) != except_id)
}

pub fn insert(records: &mut Vec<Article>, article: Article) -> StoreResult<Article> {
  if records.iter().any(|a| a.id == article.id) {
    return Err(StoreError::Conflict(format!("Article id {} already exists", article.id)));
  }
  if slug_taken(records, &article.slug, None) {
    return Err(slug_conflict(&article.slug));
  }
  records.push(article.clone());
  Ok(article)
}

pub fn update(
  records: &mut [Article],
  id: &str,
  update: ArticleUpdate
) -> StoreResult<Article> {
  let index = records.iter()
    .position(|a| a.id == id)
    .ok_or_else(|| not_found(id))?;
  let merged = helpers::merge_update(&records[index], update)?;
  if merged.slug != records[index].slug && slug_taken(records, &merged.slug, Some(id)) {
    return Err(slug_conflict(&merged.slug));
  }
  records[index] = merged.clone();
  Ok(merged)
}

pub fn remove(records: &mut Vec<Article>, id_or_slug: &str) -> StoreResult<Article> {
  let index = records.iter()
    .position(|a| a.id == id_or_slug)
    .or_else(|| records.iter().position(|a| a.slug == id_or_slug))
    .ok_or_else(|| not_found(id_or_slug))?;
  Ok(records.remove(index))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::contract_tests::new_article;

  fn article(title: &str) -> Article {
    helpers::build_article(new_article(title), "WeAreWe Team").unwrap()
  }

  #[test]
  fn find_prefers_id_over_slug() {
    let first = article("First");
    let mut second = article("Second");
    // Pathological but possible: a slug equal to another id.
    second.slug = first.id.clone();
    let records = vec![second.clone(), first.clone()];
    assert_eq!(Some(&first), find(&records, &first.id));
    assert_eq!(Some(&second), find(&records, &second.id));
  }

  #[test]
  fn failed_update_leaves_vec_untouched() {
    let mut records = vec![article("First"), article("Second")];
    let before = records.clone();
    let id = records[1].id.clone();
    let result = update(
      &mut records,
      &id,
      ArticleUpdate { title: Some("first".to_string()), ..Default::default() }
    );
    assert!(matches!(result, Err(StoreError::Conflict(_))));
    assert_eq!(before, records);
  }
}
