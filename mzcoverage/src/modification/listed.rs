use context_error::*;

/// Split a modification list on the separator, giving the byte offset and trimmed text of every
/// non empty token.
pub(super) fn tokens(line: &str, separator: char) -> Vec<(usize, &str)> {
    let mut offset = 0;
    let mut output = Vec::new();
    for part in line.split(separator) {
        let leading = part.len() - part.trim_start().len();
        let token = part.trim();
        if !token.is_empty() {
            output.push((offset + leading, token));
        }
        offset += part.len() + separator.len_utf8();
    }
    output
}

/// Get the length of the plain sequence, needed to place C terminal modifications.
/// # Errors
/// If no plain sequence is given.
pub(super) fn sequence_length<'a>(
    name: &'static str,
    line: &'a str,
    sequence: Option<&str>,
) -> Result<usize, BoxedError<'a, BasicKind>> {
    sequence.map(|s| s.trim().len()).ok_or_else(|| {
        BoxedError::new(
            BasicKind::Error,
            format!("Missing {name} sequence"),
            format!("The {name} modification list can only be read together with the plain peptide sequence"),
            Context::full_line(0, line),
        )
    })
}

/// Get the plain sequence as the stripped sequence.
/// # Errors
/// If no plain sequence is given.
pub(super) fn strip<'a>(
    name: &'static str,
    line: &'a str,
    sequence: Option<&str>,
) -> Result<String, BoxedError<'a, BasicKind>> {
    sequence_length(name, line, sequence)?;
    Ok(sequence.unwrap_or_default().trim().to_string())
}

/// Read a terminal position indication, `N-term`/`n` gives 0 and `C-term`/`c` gives the peptide length.
pub(super) fn terminal_position(text: &str, length: usize) -> Option<usize> {
    if text.eq_ignore_ascii_case("N-term") || text.eq_ignore_ascii_case("n") {
        Some(0)
    } else if text.eq_ignore_ascii_case("C-term") || text.eq_ignore_ascii_case("c") {
        Some(length)
    } else {
        None
    }
}

/// Read an explicit or terminal position and make sure it lies on the peptide.
/// # Errors
/// If the position is not a number or lies beyond the end of the peptide.
pub(super) fn position<'a>(
    name: &'static str,
    text: &str,
    length: usize,
    line: &'a str,
    offset: usize,
) -> Result<usize, BoxedError<'a, BasicKind>> {
    let position = match terminal_position(text, length) {
        Some(p) => p,
        None => text.parse::<usize>().map_err(|err| {
            BoxedError::new(
                BasicKind::Error,
                format!("Invalid {name} modification location"),
                format!("The location number {}", explain_number_error(&err)),
                Context::line(None, line, offset, text.len()),
            )
        })?,
    };
    if position > length {
        Err(BoxedError::new(
            BasicKind::Error,
            format!("Invalid {name} modification location"),
            format!("The location {position} lies outside of the peptide of length {length}"),
            Context::line(None, line, offset, text.len()),
        ))
    } else {
        Ok(position)
    }
}

/// Explain the error of a number parse in human readable form
const fn explain_number_error(error: &std::num::ParseIntError) -> &'static str {
    match error.kind() {
        std::num::IntErrorKind::Empty => "is empty",
        std::num::IntErrorKind::InvalidDigit => "contains an invalid character",
        std::num::IntErrorKind::NegOverflow => "is too small to fit in the internal representation",
        std::num::IntErrorKind::PosOverflow => "is too big to fit in the internal representation",
        std::num::IntErrorKind::Zero => "is zero, which is not allowed here",
        _ => "is not a valid number",
    }
}

#[test]
fn split_tokens() {
    assert_eq!(
        tokens("N-term(42.0106), 3M(15.9949)", ','),
        vec![(0, "N-term(42.0106)"), (17, "3M(15.9949)")]
    );
    assert_eq!(tokens("0,Acetyl[AnyN-term];", ';'), vec![(0, "0,Acetyl[AnyN-term]")]);
    assert!(tokens("  ", ',').is_empty());
}

#[test]
fn terminal_positions() {
    assert_eq!(terminal_position("N-term", 7), Some(0));
    assert_eq!(terminal_position("c", 7), Some(7));
    assert_eq!(terminal_position("3", 7), None);
    assert_eq!(position("test", "8", 7, "8", 0).ok(), None);
    assert_eq!(position("test", "7", 7, "7", 0).ok(), Some(7));
}
