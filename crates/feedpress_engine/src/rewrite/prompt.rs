use super::RewriteRequest;

/// At most `max_chars` characters of `text`, cut on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Prompt for text-in backends: the extracted source text is embedded.
pub fn article_prompt(request: &RewriteRequest, max_source_chars: usize) -> String {
    format!(
        r#"You are a professional technology journalist. Rewrite the article below into a completely new piece: entirely different wording, the same key facts, written in the same language as the original.

ORIGINAL TITLE: {title}

ORIGINAL CONTENT:
{content}

REQUIREMENTS:
1. A new, engaging, search-friendly title that differs from the original
2. Natural, easy-to-read prose; keep the important facts but never copy sentences verbatim
3. Add suitable <h2> and <h3> headings
4. Same length as the original or longer
5. Format the content as HTML using <p>, <h2>, <h3>, <ul>, <li>

Return exactly this JSON object and nothing else:
{{
  "title": "new title",
  "excerpt": "one or two sentence summary",
  "content": "full HTML content",
  "tags": ["tag1", "tag2", "tag3"]
}}
"#,
        title = request.title,
        content = truncate_chars(&request.text, max_source_chars),
    )
}

/// Prompt for URL-in backends that read the source page themselves.
///
/// Contains no literal JSON: browser backends scan the whole rendered page,
/// prompt included, for the reply object.
pub fn url_prompt(request: &RewriteRequest) -> String {
    format!(
        r#"Read the article at this link: {url}
Category: {category}

Rewrite it optimised for search engines:
- TITLE: starts with the main keyword, 50 to 60 characters, makes people want to click
- EXCERPT: 150 to 160 characters, contains the main keyword
- CONTENT: keep the original length, H2 and H3 headings with related keywords, an opening paragraph with the main keyword, <ul><li> lists where they fit, a closing paragraph with a call to action, keep every <img src> tag of the original
- TAGS: 3 to 5 tags, main keyword first

Reply with one JSON object only. It must have the string fields title, excerpt and content (HTML) and the string array field tags."#,
        url = request.source_url,
        category = request.category,
    )
}
