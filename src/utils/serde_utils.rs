// The CMS editor sends empty strings for fields that
// weren't filled, which should mean "not supplied".
// I'm doing it in the DTO conversion with a plain old
// function rather than a custom deserializer.
pub fn empty_string_to_none(value: Option<String>) -> Option<String> {
  match value {
    Some(s) => if s.trim().is_empty()
      { None } else { Some(s) },
    None => None
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_strings_become_none() {
    assert_eq!(None, empty_string_to_none(Some("".to_string())));
    assert_eq!(None, empty_string_to_none(Some("   ".to_string())));
    assert_eq!(None, empty_string_to_none(None));
    assert_eq!(
      Some("my-url".to_string()),
      empty_string_to_none(Some("my-url".to_string()))
    );
  }
}
