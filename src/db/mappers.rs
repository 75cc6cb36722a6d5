use super::entities::*;
use crate::utils::time_utils;
use rusqlite::{Row, Error};

// Column order has to match ARTICLE_FIELDS in sqlite.rs.
pub fn map_article(row: &Row) -> Result<Article, Error> {
  let timestamp: i64 = row.get(6)?;
  let date = time_utils::timestamp_to_date(timestamp)
    .ok_or(Error::IntegralValueOutOfRange(6, timestamp))?;
  Ok(Article {
    id: row.get(0)?,
    title: row.get(1)?,
    slug: row.get(2)?,
    meta_description: row.get(3)?,
    image_url: row.get(4)?,
    content: row.get(5)?,
    date,
    author: row.get(7)?
  })
}
