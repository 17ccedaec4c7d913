use std::io::{self, BufRead, Write};

use crate::search::SearchEngine;
use crate::size::format_size;

const PROMPT: &str = ">";

/// Read queries line by line from `input` and print matches to `out`.
///
/// Blank lines are skipped. Ends when `input` is exhausted and returns the
/// number of queries answered. Each hit is printed as `identifier: size`.
pub fn run_queries<R, W>(engine: &SearchEngine<'_>, input: R, out: &mut W) -> io::Result<usize>
where
    R: BufRead,
    W: Write,
{
    let mut served = 0;
    let mut lines = input.lines();

    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;

        let Some(line) = lines.next() else {
            writeln!(out)?;
            break;
        };
        let line = line?;
        let query = line.trim_end_matches(['\r', '\n']);
        if query.is_empty() {
            continue;
        }

        for hit in engine.search(query) {
            writeln!(out, "{}: {}", hit.identifier, format_size(hit.size_bytes))?;
        }
        served += 1;
    }

    Ok(served)
}
