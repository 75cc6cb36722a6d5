use html2text::from_read;

// Reading speed used for the "readTime" field.
const WORDS_PER_MINUTE: usize = 200;

// Combining Diacritical Marks. Text pasted from some
// editors comes decomposed ("e" then U+0301), the marks
// just go away.
fn is_combining_mark(c: char) -> bool {
  ('\u{0300}'..='\u{036f}').contains(&c)
}

/**
 * Turns a title into something we can put in a URL:
 * lowercase ASCII, accents and ligatures transliterated
 * (é gives e, œ gives oe, ß gives ss), runs of anything
 * else collapsed into a single hyphen, no hyphen at either
 * end.
 * Calling it on its own output gives the same output.
 */
pub fn slugify(value: &str) -> String {
  let without_marks: String = value.chars()
    .filter(|c| !is_combining_mark(*c))
    .collect();
  slug::slugify(without_marks)
}

pub fn strip_html(html: &str) -> String {
  from_read(html.as_bytes(), 80)
}

pub fn word_count(html: &str) -> usize {
  strip_html(html).split_whitespace().count()
}

// Rounded up, and an empty article still takes a minute
// to look at.
pub fn read_time_minutes(html: &str) -> usize {
  let words = word_count(html);
  let minutes = (words + WORDS_PER_MINUTE - 1) / WORDS_PER_MINUTE;
  minutes.max(1)
}
