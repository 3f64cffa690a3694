/// Upper bound for any slug, whatever the configured length.
pub const DEFAULT_SLUG_MAX_LEN: usize = 100;

/// URL-safe ASCII identifier for a title.
///
/// Output only contains `[a-z0-9-]`, never starts or ends with a hyphen and
/// never contains two hyphens in a row, so `slugify(slugify(t)) == slugify(t)`.
/// `max_len` is clamped to [`DEFAULT_SLUG_MAX_LEN`].
pub fn slugify(title: &str, max_len: usize) -> String {
    let max_len = max_len.min(DEFAULT_SLUG_MAX_LEN);

    let mut slug = String::with_capacity(title.len().min(max_len * 2));
    let mut pending_hyphen = false;
    for c in title.chars().flat_map(char::to_lowercase) {
        match fold_accent(c) {
            Some(base) => {
                for b in base.chars() {
                    push_ascii(&mut slug, b, &mut pending_hyphen);
                }
            }
            None => {
                if c == '-' || c.is_whitespace() {
                    pending_hyphen = true;
                } else {
                    // Characters outside [a-z0-9] are dropped without
                    // separating; combining marks of decomposed text end here.
                    push_ascii(&mut slug, c, &mut pending_hyphen);
                }
            }
        }
    }

    if slug.len() > max_len {
        slug.truncate(max_len);
        while slug.ends_with('-') {
            slug.pop();
        }
    }
    slug
}

fn push_ascii(slug: &mut String, c: char, pending_hyphen: &mut bool) {
    if !(c.is_ascii_lowercase() || c.is_ascii_digit()) {
        return;
    }
    if *pending_hyphen && !slug.is_empty() {
        slug.push('-');
    }
    *pending_hyphen = false;
    slug.push(c);
}

/// Substitution table for lowercase accented letters (full Vietnamese
/// repertoire plus common Western European letters).
fn fold_accent(c: char) -> Option<&'static str> {
    let base = match c {
        'à' | 'á' | 'ạ' | 'ả' | 'ã' | 'â' | 'ầ' | 'ấ' | 'ậ' | 'ẩ' | 'ẫ' | 'ă' | 'ằ' | 'ắ' | 'ặ'
        | 'ẳ' | 'ẵ' | 'ä' | 'å' | 'ā' => "a",
        'è' | 'é' | 'ẹ' | 'ẻ' | 'ẽ' | 'ê' | 'ề' | 'ế' | 'ệ' | 'ể' | 'ễ' | 'ë' | 'ē' => "e",
        'ì' | 'í' | 'ị' | 'ỉ' | 'ĩ' | 'î' | 'ï' | 'ī' => "i",
        'ò' | 'ó' | 'ọ' | 'ỏ' | 'õ' | 'ô' | 'ồ' | 'ố' | 'ộ' | 'ổ' | 'ỗ' | 'ơ' | 'ờ' | 'ớ' | 'ợ'
        | 'ở' | 'ỡ' | 'ö' | 'ø' | 'ō' => "o",
        'ù' | 'ú' | 'ụ' | 'ủ' | 'ũ' | 'ư' | 'ừ' | 'ứ' | 'ự' | 'ử' | 'ữ' | 'û' | 'ü' | 'ū' => "u",
        'ỳ' | 'ý' | 'ỵ' | 'ỷ' | 'ỹ' | 'ÿ' => "y",
        'đ' => "d",
        'ç' => "c",
        'ñ' => "n",
        'ß' => "ss",
        'æ' => "ae",
        'œ' => "oe",
        _ => return None,
    };
    Some(base)
}
