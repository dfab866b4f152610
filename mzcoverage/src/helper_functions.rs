/// Find the enclosed text by the given symbols, assumes a single open is already read just before the start, guarantees to only pick full characters
pub(crate) fn end_of_enclosure(text: &str, start: usize, open: u8, close: u8) -> Option<usize> {
    let mut state = 1;
    for (i, ch) in text.as_bytes()[start..].iter().enumerate() {
        // Check if this byte is a full character (is_char_boundary also works on index==len)
        if text.is_char_boundary(start + i) && text.is_char_boundary(start + i + 1) {
            if *ch == open {
                state += 1;
            } else if *ch == close {
                state -= 1;
                if state == 0 {
                    return Some(start + i);
                }
            }
        }
    }
    None
}

/// Bring a modification mass (or code) into a single comparable representation. Numbers are
/// rendered by the `f64` formatting so `42`, `+42`, and `42.0` all give `42`, anything else is only
/// trimmed and stripped of a leading `+`.
pub(crate) fn canonical_mass_key(text: &str) -> String {
    let trimmed = text.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    unsigned
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map_or_else(|| unsigned.to_string(), |value| value.to_string())
}

/// Strip a single leading `+` from a mass token, negative masses keep their sign
pub(crate) fn strip_plus(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed.strip_prefix('+').unwrap_or(trimmed)
}

/// Get the closest options to the given name, or all options if none are close
pub(crate) fn similar_names<'a>(
    name: &str,
    options: impl IntoIterator<Item = &'a str>,
) -> Vec<String> {
    let options: Vec<&str> = options.into_iter().collect();
    let close = similar::get_close_matches(name, &options, 3, 0.7);
    if close.is_empty() {
        options.iter().map(ToString::to_string).collect()
    } else {
        close.iter().map(ToString::to_string).collect()
    }
}

#[test]
fn enclosure() {
    assert_eq!(end_of_enclosure("(ox)K", 1, b'(', b')'), Some(3));
    assert_eq!(
        end_of_enclosure("(Oxidation (M))K", 1, b'(', b')'),
        Some(14)
    );
    assert_eq!(end_of_enclosure("(ox", 1, b'(', b')'), None);
}

#[test]
fn mass_keys() {
    assert_eq!(canonical_mass_key("+42"), "42");
    assert_eq!(canonical_mass_key("42.0"), "42");
    assert_eq!(canonical_mass_key(" -0.98 "), "-0.98");
    assert_eq!(canonical_mass_key("UniMod:35"), "UniMod:35");
    assert_eq!(canonical_mass_key("+Oxidation"), "Oxidation");
    assert_eq!(strip_plus("+15.99"), "15.99");
    assert_eq!(strip_plus("-17.03"), "-17.03");
}

#[test]
fn close_names() {
    assert_eq!(similar_names("Skylin", ["Skyline", "Comet"]), vec!["Skyline"]);
    assert_eq!(
        similar_names("xyz", ["Skyline", "Comet"]),
        vec!["Skyline", "Comet"]
    );
}
