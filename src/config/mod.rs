// Adding the context method to errors:
use eyre::{WrapErr, eyre};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::convert::From;
use std::str::FromStr;
use derive_more::Display;

// Which adapter holds the articles.
#[derive(Debug, Display, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
  #[display(fmt = "memory")]
  Memory,
  #[display(fmt = "file")]
  File,
  #[display(fmt = "sqlite")]
  Sqlite
}

// Used by the data transform binary which gets
// backend names from the command line.
impl FromStr for StoreBackend {
  type Err = eyre::Report;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_lowercase().as_str() {
      "memory" => Ok(StoreBackend::Memory),
      "file" | "json" => Ok(StoreBackend::File),
      "sqlite" | "db" => Ok(StoreBackend::Sqlite),
      other => Err(eyre!("Unknown store backend: {}", other))
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct Config {
  pub bind_address: String,
  pub store_backend: StoreBackend,
  pub articles_file_path: String,
  pub db_path: String,
  // Seconds the article list stays cached, 0 disables
  // the cache.
  pub list_cache_ttl: u64,
  pub default_author: String,
  pub admin_username: Option<String>,
  pub admin_password: Option<String>,
  pub cors_origin: Option<String>,
  // Used for the sitemap, robots.txt and JSON-LD:
  pub site_name: String,
  pub site_root: String,
  pub site_description: String,
  pub site_logo_url: String,
  pub site_contact_email: String,
  pub site_instagram_url: String
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdminCredentials {
  pub username: String,
  pub password: String
}

// Same idea as before: the handlers get SiteInfo and
// never see the rest of the config, especially since
// there are credentials in there.
#[derive(Debug, Clone, Serialize)]
pub struct SiteInfo {
  pub name: String,
  pub root: String,
  pub description: String,
  pub logo_url: String,
  pub contact_email: String,
  pub instagram_url: String
}

impl From<Config> for SiteInfo {
  fn from(config: Config) -> Self {
    Self {
      name: config.site_name,
      root: config.site_root.trim_end_matches('/').to_string(),
      description: config.site_description,
      logo_url: config.site_logo_url,
      contact_email: config.site_contact_email,
      instagram_url: config.site_instagram_url
    }
  }
}

impl Config {

  pub fn from_env() -> Result<Config> {
    // RUST_LOG is already set in main.rs if it
    // was absent.
    // You have to use lowercase when compared to
    // what's in the .env file.
    let c = config::Config::builder()
      .set_default("bind_address", "127.0.0.1:8080")?
      .set_default("store_backend", "file")?
      .set_default("articles_file_path", "./articles.json")?
      .set_default("db_path", "./articles.db")?
      .set_default("list_cache_ttl", 60)?
      .set_default("default_author", "WeAreWe Team")?
      .set_default("site_name", "Tolly")?
      // Should never have a trailing slash, SiteInfo
      // removes it anyway.
      .set_default("site_root", "https://www.tolly.fr")?
      .set_default(
        "site_description",
        "Agence de marketing digital experte en SEO, développement web et stratégie digitale"
      )?
      .set_default("site_logo_url", "https://www.tolly.fr/logo.png")?
      .set_default("site_contact_email", "contact@tolly.fr")?
      .set_default("site_instagram_url", "https://www.instagram.com/wearewework/")?
      .add_source(config::Environment::default())
      .build()?;
    // The error has to be given a context for
    // color_eyre to work here:
    c.try_deserialize()
      .context("Loading configuration from env")
  }

  // Both values have to be there (and not blank) for the
  // CMS routes to be protected.
  pub fn admin_credentials(&self) -> Option<AdminCredentials> {
    match (&self.admin_username, &self.admin_password) {
      (Some(username), Some(password))
        if !username.is_empty() && !password.is_empty() =>
        Some(AdminCredentials {
          username: username.clone(),
          password: password.clone()
        }),
      _ => None
    }
  }

}
