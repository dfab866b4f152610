//! Fuzz target for all modification notations, the first line is the modified sequence and the
//! rest is used as the plain sequence
use afl::*;
use mzcoverage::modification::ModificationFormat;

fn main() {
    fuzz!(|data: &[u8]| {
        if let Ok(s) = std::str::from_utf8(data) {
            let (modified, sequence) = s.split_once('\n').map_or((s, None), |(m, p)| (m, Some(p)));
            for format in ModificationFormat::ALL {
                let parser = format.parser();
                let parsed = parser.parse(modified, sequence);
                let stripped = parser.strip(modified, sequence);
                if let (Ok(parsed), Ok(stripped)) = (parsed, stripped) {
                    assert!(parsed.iter().all(|m| m.position <= stripped.len()));
                }
            }
        }
    });
}
