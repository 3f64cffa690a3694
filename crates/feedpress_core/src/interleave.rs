/// Marker the rewritten HTML is split on.
pub const PARAGRAPH_CLOSE: &str = "</p>";

/// Spreads `images` evenly through the paragraphs of `content`.
///
/// With `N` segments there are `N - 1` boundaries (one after each closing
/// marker). Image `i` lands right after boundary
/// `min((i + 1) * stride, N - 1)` where `stride = max(1, (N - 1) / (images + 1))`.
/// Surplus images pile up on the last boundary. Content without any
/// paragraph marker gets its images appended at the end.
///
/// Images go between paragraphs, never inside one: placing image `i` at the
/// tail of segment `pos` instead would nest the tag inside that paragraph's
/// `<p>`, which lands it one paragraph later than here.
pub fn interleave_images(content: &str, images: &[String]) -> String {
    if images.is_empty() {
        return content.to_string();
    }

    let segments: Vec<&str> = content.split(PARAGRAPH_CLOSE).collect();
    let boundaries = segments.len() - 1;
    if boundaries == 0 {
        let mut out = content.to_string();
        for url in images {
            out.push_str(&image_tag(url));
        }
        return out;
    }

    let stride = (boundaries / (images.len() + 1)).max(1);
    let mut placed: Vec<Vec<&str>> = vec![Vec::new(); boundaries + 1];
    for (i, url) in images.iter().enumerate() {
        let position = ((i + 1) * stride).min(boundaries);
        placed[position].push(url);
    }

    let mut out = String::with_capacity(content.len() + images.len() * 64);
    for (idx, segment) in segments.iter().enumerate() {
        if idx > 0 {
            out.push_str(PARAGRAPH_CLOSE);
            for url in &placed[idx] {
                out.push_str(&image_tag(url));
            }
        }
        out.push_str(segment);
    }
    out
}

pub fn image_tag(url: &str) -> String {
    format!(r#"<img src="{}" alt="">"#, escape_attr(url))
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
