//! YAML frontmatter detection and rating merge.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_yml::{Mapping, Value};

use super::prompt::NoteRating;
use crate::errors::FrontmatterError;

static FRONTMATTER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\A---\s*\n(?P<yaml>.*?)\n---\s*\n").expect("Failed to compile frontmatter regex")
});

const RATING_KEY: &str = "rating";
const FEEDBACK_KEY: &str = "feedback";

/// A leading frontmatter block split from the note body.
#[derive(Debug, PartialEq)]
pub struct Frontmatter<'a> {
    pub yaml: &'a str,
    pub body: &'a str,
}

pub fn split_frontmatter(content: &str) -> Option<Frontmatter<'_>> {
    let caps = FRONTMATTER_REGEX.captures(content)?;
    let whole = caps.get(0)?;
    let yaml = caps.name("yaml")?;

    Some(Frontmatter {
        yaml: yaml.as_str(),
        body: &content[whole.end()..],
    })
}

fn parse_mapping(yaml: &str) -> Result<Mapping, FrontmatterError> {
    match serde_yml::from_str::<Value>(yaml)? {
        Value::Null => Ok(Mapping::new()),
        Value::Mapping(mapping) => Ok(mapping),
        _ => Err(FrontmatterError::NotAMapping),
    }
}

/// Whether the note's frontmatter already carries a rating.
pub fn has_rating(content: &str) -> Result<bool, FrontmatterError> {
    match split_frontmatter(content) {
        Some(fm) => Ok(parse_mapping(fm.yaml)?.get(RATING_KEY).is_some()),
        None => Ok(false),
    }
}

#[derive(Debug, PartialEq)]
pub enum RatingMerge {
    AlreadyRated,
    Updated(String),
}

fn rating_value(rating: &serde_json::Number) -> Value {
    if let Some(i) = rating.as_i64() {
        Value::Number(i.into())
    } else if let Some(u) = rating.as_u64() {
        Value::Number(u.into())
    } else {
        Value::Number(rating.as_f64().unwrap_or_default().into())
    }
}

/// Add `rating` and `feedback` to the note's frontmatter, creating the block
/// if the note has none. Existing keys keep their order.
pub fn apply_rating(content: &str, rating: &NoteRating) -> Result<RatingMerge, FrontmatterError> {
    let (mut mapping, body) = match split_frontmatter(content) {
        Some(fm) => (parse_mapping(fm.yaml)?, fm.body),
        None => (Mapping::new(), content),
    };

    if mapping.get(RATING_KEY).is_some() {
        return Ok(RatingMerge::AlreadyRated);
    }

    mapping.insert(Value::String(RATING_KEY.to_string()), rating_value(&rating.rating));
    mapping.insert(
        Value::String(FEEDBACK_KEY.to_string()),
        Value::String(rating.feedback.clone()),
    );

    let yaml = serde_yml::to_string(&Value::Mapping(mapping))?;
    Ok(RatingMerge::Updated(format!("---\n{yaml}---\n{body}")))
}
