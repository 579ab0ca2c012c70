use serde_json::{Number, Value};

use crate::errors::RatingError;

const RATING_PROMPT_TEMPLATE: &str = r#"You are a meticulous note-taking assistant. Your task is to rate the quality of a given Markdown note based on two criteria: information density and completeness. The rating should be on a scale from 1 to 10. You will also provide a single, actionable piece of feedback for improvement.

The output must be a single JSON object with two keys:
1. "rating": The numerical rating (1-10).
2. "feedback": A concise string with one suggestion for improvement.

For example, if a note is very detailed, you might return:
{
"rating": 9,
"feedback": "Add an example or case study to illustrate the concepts."
}

Here is the note to rate. Provide only the JSON object in your response.

---
Note content:
"#;

/// Rating and feedback returned by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteRating {
    pub rating: Number,
    pub feedback: String,
}

pub fn rating_prompt(note_content: &str) -> String {
    format!("{RATING_PROMPT_TEMPLATE}{note_content}\n")
}

/// Parse a model answer into a [`NoteRating`].
///
/// Tolerates a surrounding markdown code fence. `rating` may be a number or
/// a numeric string.
pub fn parse_rating(response: &str) -> Result<NoteRating, RatingError> {
    let mut json = response.trim();
    if let Some(rest) = json.strip_prefix("```json") {
        json = rest;
    } else if let Some(rest) = json.strip_prefix("```") {
        json = rest;
    }
    if let Some(rest) = json.strip_suffix("```") {
        json = rest;
    }

    let value: Value = serde_json::from_str(json.trim())?;

    let rating = match value.get("rating") {
        None => return Err(RatingError::MissingKey("rating")),
        Some(Value::Number(n)) => n.clone(),
        Some(Value::String(s)) => parse_number(s.trim())
            .ok_or_else(|| RatingError::InvalidRating(format!("{s:?}")))?,
        Some(other) => return Err(RatingError::InvalidRating(other.to_string())),
    };

    let feedback = match value.get("feedback") {
        None => return Err(RatingError::MissingKey("feedback")),
        Some(Value::String(s)) => s.clone(),
        Some(other) => return Err(RatingError::InvalidFeedback(other.to_string())),
    };

    Ok(NoteRating { rating, feedback })
}

fn parse_number(s: &str) -> Option<Number> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(Number::from(i));
    }
    s.parse::<f64>().ok().and_then(Number::from_f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_note() {
        let prompt = rating_prompt("# My note\nbody");
        assert!(prompt.contains("information density and completeness"));
        assert!(prompt.ends_with("Note content:\n# My note\nbody\n"));
    }

    #[test]
    fn test_parse_plain_json() {
        let rating = parse_rating(r#"{"rating": 7, "feedback": "Add sources."}"#).unwrap();
        assert_eq!(rating.rating, Number::from(7));
        assert_eq!(rating.feedback, "Add sources.");
    }

    #[test]
    fn test_parse_fenced_json() {
        let response = "```json\n{\"rating\": 4, \"feedback\": \"Too short.\"}\n```";
        let rating = parse_rating(response).unwrap();
        assert_eq!(rating.rating, Number::from(4));
        assert_eq!(rating.feedback, "Too short.");
    }

    #[test]
    fn test_parse_bare_fence() {
        let response = "  ```\n{\"rating\": 10, \"feedback\": \"Great.\"}\n```  ";
        assert_eq!(parse_rating(response).unwrap().rating, Number::from(10));
    }

    #[test]
    fn test_parse_string_rating() {
        let rating = parse_rating(r#"{"rating": "8", "feedback": "ok"}"#).unwrap();
        assert_eq!(rating.rating, Number::from(8));
    }

    #[test]
    fn test_missing_keys() {
        assert!(matches!(
            parse_rating(r#"{"feedback": "x"}"#),
            Err(RatingError::MissingKey("rating"))
        ));
        assert!(matches!(
            parse_rating(r#"{"rating": 3}"#),
            Err(RatingError::MissingKey("feedback"))
        ));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            parse_rating(r#"{"rating": "great", "feedback": "x"}"#),
            Err(RatingError::InvalidRating(_))
        ));
        assert!(matches!(
            parse_rating(r#"{"rating": 5, "feedback": ["a", "b"]}"#),
            Err(RatingError::InvalidFeedback(_))
        ));
    }

    #[test]
    fn test_not_json() {
        assert!(matches!(
            parse_rating("I'd give it a 7/10"),
            Err(RatingError::Json(_))
        ));
    }
}
