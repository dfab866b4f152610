//! Fuzz target for reading pipeline parameters from JSON
use afl::*;
use mzcoverage::pipeline::PipelineParameters;

fn main() {
    fuzz!(|data: &[u8]| {
        if let Ok(s) = std::str::from_utf8(data) {
            let _unused = PipelineParameters::from_json(s);
        }
    });
}
