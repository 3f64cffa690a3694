use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::RewrittenArticle;

#[derive(Debug, Error)]
pub enum ArticleSchemaError {
    #[error("no JSON object found in response")]
    NoObject,
    #[error("unexpected article shape: {0}")]
    Shape(#[from] serde_json::Error),
    #[error("required field `{0}` is empty")]
    EmptyField(&'static str),
}

/// Every syntactically complete JSON object embedded in `text`, in order of
/// their opening brace.
///
/// Candidates are found by balanced-brace scanning that ignores braces inside
/// string literals; a balanced span that does not parse is skipped and the
/// scan resumes at the next opening brace, which may be nested inside it.
pub fn json_objects(text: &str) -> impl Iterator<Item = (&str, Map<String, Value>)> + '_ {
    let mut next_start = 0usize;
    std::iter::from_fn(move || {
        while let Some(offset) = text[next_start..].find('{') {
            let start = next_start + offset;
            next_start = start + 1;
            let Some(end) = balanced_end(text.as_bytes(), start) else {
                continue;
            };
            let span = &text[start..end];
            if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(span) {
                next_start = end;
                return Some((span, map));
            }
        }
        None
    })
}

pub fn first_json_object(text: &str) -> Option<Map<String, Value>> {
    json_objects(text).next().map(|(_, map)| map)
}

/// Exclusive end of the brace-balanced span opening at `start`.
fn balanced_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

#[derive(Deserialize)]
struct WireArticle {
    title: String,
    #[serde(default)]
    excerpt: String,
    content: String,
    #[serde(default)]
    tags: Vec<String>,
}

/// Validates the first JSON object of a backend response as an article.
pub fn parse_rewritten(text: &str) -> Result<RewrittenArticle, ArticleSchemaError> {
    let object = first_json_object(text).ok_or(ArticleSchemaError::NoObject)?;
    article_from_object(object)
}

fn article_from_object(
    object: Map<String, Value>,
) -> Result<RewrittenArticle, ArticleSchemaError> {
    let wire: WireArticle = serde_json::from_value(Value::Object(object))?;

    let title = wire.title.trim().to_string();
    if title.is_empty() {
        return Err(ArticleSchemaError::EmptyField("title"));
    }
    let content = wire.content.trim().to_string();
    if content.is_empty() {
        return Err(ArticleSchemaError::EmptyField("content"));
    }

    let mut tags: Vec<String> = Vec::with_capacity(wire.tags.len());
    for tag in wire.tags {
        let tag = tag.trim();
        if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }

    Ok(RewrittenArticle {
        title,
        excerpt: wire.excerpt.trim().to_string(),
        content,
        tags,
    })
}
