use std::collections::HashSet;
use derive_more::Display;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use crate::db::entities::Article;

// A category needs at least that score, otherwise the
// article goes to "Autres".
const MIN_CATEGORY_SCORE: usize = 2;
const MAX_TAGS: usize = 5;
// Shorter words are never tags.
const MIN_TAG_LENGTH: usize = 5;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Category {
  #[display(fmt = "SEO")]
  Seo,
  #[display(fmt = "Web Design")]
  WebDesign,
  #[display(fmt = "Marketing")]
  Marketing,
  #[display(fmt = "E-commerce")]
  ECommerce,
  #[display(fmt = "Autres")]
  Other
}

impl Category {

  // What the blog page uses in its category filter.
  pub fn id(&self) -> &'static str {
    match self {
      Category::Seo => "seo",
      Category::WebDesign => "web-design",
      Category::Marketing => "marketing",
      Category::ECommerce => "e-commerce",
      Category::Other => "autres"
    }
  }

  // Order matters: on equal scores the first one wins.
  pub fn scored() -> [Category; 4] {
    [Category::Seo, Category::WebDesign, Category::Marketing, Category::ECommerce]
  }

}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tag {
  pub id: String,
  pub label: String,
  pub weight: usize
}

struct Keywords {
  category: Category,
  primary: &'static [&'static str],
  secondary: &'static [&'static str],
  context: &'static [&'static str]
}

static KEYWORDS: [Keywords; 4] = [
  Keywords {
    category: Category::Seo,
    primary: &["seo", "référencement naturel", "optimisation moteur recherche"],
    secondary: &[
      "référencement", "google", "ranking", "backlinks", "mots-clés",
      "analytics", "serp", "position"
    ],
    context: &["site web", "trafic", "visibilité"]
  },
  Keywords {
    category: Category::WebDesign,
    primary: &["web design", "webdesign", "conception web", "design interface"],
    secondary: &["ui", "ux", "responsive", "mobile", "design", "interface", "maquette"],
    context: &["utilisateur", "ergonomie", "navigation"]
  },
  Keywords {
    category: Category::Marketing,
    primary: &["marketing digital", "stratégie marketing", "inbound marketing"],
    secondary: &[
      "stratégie", "social media", "conversion", "communication", "marketing",
      "acquisition"
    ],
    context: &["marque", "audience", "client"]
  },
  Keywords {
    category: Category::ECommerce,
    primary: &["e-commerce", "commerce en ligne", "boutique en ligne"],
    secondary: &["vente", "boutique", "shop", "conversion", "panier", "marketplace"],
    context: &["produit", "achat", "client"]
  }
];

const EXCLUDED_WORDS: &[&str] = &[
  "le", "la", "les", "un", "une", "des", "ce", "ces", "sur", "pour", "dans",
  "avec", "par", "est", "sont", "être", "avoir", "fait", "faire", "plus",
  "vous", "nous", "ils", "elles", "leur", "leurs", "tout", "tous", "cette",
  "votre", "notre", "comment", "quoi", "quel", "quelle", "aussi", "donc"
];

// Whole-word matchers, compiled once.
struct CategoryMatcher {
  category: Category,
  primary: Vec<Regex>,
  secondary: Vec<Regex>,
  context: Vec<Regex>
}

fn word_regexes(keywords: &[&str]) -> Vec<Regex> {
  keywords.iter()
    .map(|k| Regex::new(&format!(r"\b{}\b", regex::escape(k))).unwrap())
    .collect()
}

lazy_static! {
  static ref MATCHERS: Vec<CategoryMatcher> = KEYWORDS.iter()
    .map(|k| CategoryMatcher {
      category: k.category,
      primary: word_regexes(k.primary),
      secondary: word_regexes(k.secondary),
      context: word_regexes(k.context)
    })
    .collect();
  static ref EXCLUDED: HashSet<&'static str> = EXCLUDED_WORDS.iter().copied().collect();
  static ref WORD_SEPARATORS: Regex = Regex::new(r"[\s,.-]+").unwrap();
}

// Only the title and the meta description are looked at,
// the content is HTML and way too noisy.
fn classified_text(article: &Article) -> String {
  format!("{} {}", article.title, article.meta_description).to_lowercase()
}

fn score(text: &str, regexes: &[Regex]) -> usize {
  regexes.iter().map(|r| r.find_iter(text).count()).sum()
}

pub fn determine_category(article: &Article) -> Category {
  let text = classified_text(article);
  let mut best = Category::Other;
  let mut highest = 0;
  for matcher in MATCHERS.iter() {
    let total = score(&text, &matcher.primary) * 3
      + score(&text, &matcher.secondary) * 2
      + score(&text, &matcher.context);
    if total > highest {
      highest = total;
      best = matcher.category;
    }
  }
  if highest >= MIN_CATEGORY_SCORE { best } else { Category::Other }
}

/**
 * Up to five tags, heaviest first. Long words count once per
 * occurrence, multi-word keywords found in the text count
 * double. Equal weights keep the order they were found in.
 */
pub fn generate_tags(article: &Article) -> Vec<Tag> {
  let text = classified_text(article);
  // Insertion order matters for ties, hence no HashMap.
  let mut candidates: Vec<(String, usize)> = Vec::new();
  let mut add = |label: &str, weight: usize| {
    match candidates.iter_mut().find(|(l, _)| l == label) {
      Some((_, w)) => *w += weight,
      None => candidates.push((label.to_string(), weight))
    }
  };

  for word in WORD_SEPARATORS.split(&text) {
    if word.chars().count() >= MIN_TAG_LENGTH && !EXCLUDED.contains(word) {
      add(word, 1);
    }
  }
  for keywords in KEYWORDS.iter() {
    for keyword in keywords.primary.iter().chain(keywords.secondary.iter()) {
      if keyword.contains(' ') && text.contains(*keyword) {
        add(*keyword, 2);
      }
    }
  }

  candidates.sort_by(|a, b| b.1.cmp(&a.1));
  candidates.into_iter()
    .take(MAX_TAGS)
    .map(|(label, weight)| Tag {
      id: label.split_whitespace().collect::<Vec<&str>>().join("-"),
      label,
      weight
    })
    .collect()
}
