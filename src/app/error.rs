use actix_web::{
  error::ResponseError,
  http::{header, StatusCode},
  HttpResponse
};
use derive_more::Display;
use log::error;
use crate::db::StoreError;
use super::dtos::{JsonStatus, JsonStatusType};

// The full detail of internal and database errors is only
// for the logs, random internet people get the short
// version.
#[derive(Debug, Display)]
pub enum Error {
  #[display(fmt = "Internal Server Error")]
  InternalServerError(String),
  #[display(fmt = "Database Error")]
  DatabaseError(String),
  #[display(fmt = "Unauthorized")]
  Unauthorized,
  #[display(fmt = "Not Found: {}", _0)]
  NotFound(String),
  #[display(fmt = "Bad Request: {}", _0)]
  BadRequest(String),
  #[display(fmt = "Missing or empty fields")]
  Validation(Vec<String>),
  #[display(fmt = "Conflict: {}", _0)]
  Conflict(String)
}

// Used to be plain text, it's JSON now with the usual
// JsonStatus shape.
impl ResponseError for Error {
  fn status_code(&self) -> StatusCode {
    match self {
      Error::InternalServerError(_) | Error::DatabaseError(_) =>
        StatusCode::INTERNAL_SERVER_ERROR,
      Error::Unauthorized => StatusCode::UNAUTHORIZED,
      Error::NotFound(_) => StatusCode::NOT_FOUND,
      Error::BadRequest(_) | Error::Validation(_) => StatusCode::BAD_REQUEST,
      Error::Conflict(_) => StatusCode::CONFLICT
    }
  }

  fn error_response(&self) -> HttpResponse {
    let mut status = JsonStatus::new(JsonStatusType::Error, &self.to_string());
    if let Error::Validation(fields) = self {
      status.fields = Some(fields.clone());
    }
    let mut response = HttpResponse::build(self.status_code());
    if let Error::Unauthorized = self {
      response.insert_header((header::WWW_AUTHENTICATE, "Basic realm=\"cms\""));
    }
    response.json(status)
  }
}

pub fn map_store_error(e: StoreError) -> Error {
  match e {
    StoreError::Validation(fields) => Error::Validation(fields),
    StoreError::NotFound(message) => Error::NotFound(message),
    StoreError::Conflict(message) => Error::Conflict(message),
    StoreError::Storage(message) => {
      error!("Article store error - {}", message);
      Error::DatabaseError(message)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::body::to_bytes;

  #[actix_web::test]
  async fn storage_details_stay_out_of_the_body() {
    let sut = map_store_error(StoreError::Storage("disk on fire at /var/x".to_string()));
    let response = sut.error_response();
    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
    let body = to_bytes(response.into_body()).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!("error", json["status"]);
    assert_eq!("Database Error", json["message"]);
  }

  #[actix_web::test]
  async fn validation_lists_fields() {
    let sut = map_store_error(
      StoreError::Validation(vec!["title".to_string(), "content".to_string()])
    );
    let response = sut.error_response();
    assert_eq!(StatusCode::BAD_REQUEST, response.status());
    let body = to_bytes(response.into_body()).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(serde_json::json!(["title", "content"]), json["fields"]);
  }

  #[test]
  fn conflict_is_409() {
    let sut = map_store_error(StoreError::Conflict("slug".to_string()));
    assert_eq!(StatusCode::CONFLICT, sut.status_code());
  }
}
