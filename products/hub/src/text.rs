/// Trims a free-text input; blank becomes `None`.
pub fn clean(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Applies a patch value: `None` keeps `current`, a blank string clears it.
pub fn patch(current: Option<String>, incoming: Option<String>) -> Option<String> {
    match incoming {
        Some(value) => clean(Some(value)),
        None => current,
    }
}

/// Lowercase identifier derived from a label: `"Key Account"` -> `key_account`.
pub fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    let mut pending_separator = false;
    for ch in label.trim().chars() {
        if ch.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_separator = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_drops_blank_values() {
        assert_eq!(clean(Some("  ".into())), None);
        assert_eq!(clean(Some(" Sydney ".into())), Some("Sydney".into()));
        assert_eq!(clean(None), None);
    }

    #[test]
    fn patch_distinguishes_keep_and_clear() {
        let current = Some("old".to_string());
        assert_eq!(patch(current.clone(), None), current);
        assert_eq!(patch(current.clone(), Some(String::new())), None);
        assert_eq!(patch(current, Some("new".into())), Some("new".into()));
    }

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("Key Account"), "key_account");
        assert_eq!(slugify("  Web -- Design & SEO "), "web_design_seo");
        assert_eq!(slugify("!!!"), "");
    }
}
