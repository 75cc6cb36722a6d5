use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use base64::Engine;
use futures::future::{ready, Ready};
use log::{error, warn};
use crate::config::AdminCredentials;
use super::error::Error;
use super::AppState;

pub fn generate_article_url(root: &str, slug: &str) -> String {
  format!("{}/article/{}", root, slug)
}

// Gets "user:password" out of an "Authorization: Basic ..."
// header. Anything malformed is the same as no header.
fn basic_credentials(req: &HttpRequest) -> Option<(String, String)> {
  let value = req.headers().get(header::AUTHORIZATION)?
    .to_str()
    .ok()?;
  let encoded = value.strip_prefix("Basic ")?.trim();
  let decoded = base64::engine::general_purpose::STANDARD
    .decode(encoded)
    .ok()?;
  let decoded = String::from_utf8(decoded).ok()?;
  let (username, password) = decoded.split_once(':')?;
  Some((username.to_string(), password.to_string()))
}

// Goes through every byte whatever happens, so the time
// taken doesn't say how much of the secret was right.
// The length still shows, nothing to do about that.
fn same_secret(given: &str, expected: &str) -> bool {
  let given = given.as_bytes();
  let expected = expected.as_bytes();
  let mut diff = (given.len() != expected.len()) as u8;
  for (i, b) in expected.iter().enumerate() {
    diff |= b ^ given.get(i).copied().unwrap_or(0);
  }
  diff == 0
}

/**
 * Write endpoints call this first. When no credentials are
 * configured everyone gets through (a warning is logged
 * once at startup about that).
 */
pub fn authorize(
  req: &HttpRequest,
  admin: &Option<AdminCredentials>
) -> Result<(), Error> {
  let admin = match admin {
    Some(admin) => admin,
    None => return Ok(())
  };
  match basic_credentials(req) {
    Some((username, password))
      if same_secret(&username, &admin.username)
        & same_secret(&password, &admin.password) => Ok(()),
    Some((username, _)) => {
      warn!("Wrong admin credentials for user {} on {}", username, req.path());
      Err(Error::Unauthorized)
    },
    None => Err(Error::Unauthorized)
  }
}

/**
 * Extractor for the write endpoints. It has to come before
 * the JSON body in the handler arguments: extractors run in
 * order, so a stranger gets a 401 without us ever looking
 * at what they sent.
 */
pub struct AdminAccess;

impl FromRequest for AdminAccess {
  type Error = Error;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
    let result = match req.app_data::<web::Data<AppState>>() {
      Some(app_state) => authorize(req, &app_state.admin).map(|_| AdminAccess),
      None => {
        error!("No application state registered, can't check credentials");
        Err(Error::InternalServerError("Missing application state".to_string()))
      }
    };
    ready(result)
  }
}
