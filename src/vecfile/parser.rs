//! `.vec` Line Parser
//!
//! Grammar for the two kinds of line found in word2vec / fastText text
//! vector files.
//!
//! ## Header
//! ```text
//! 400000 300
//! ```
//!
//! ## Entry
//! ```text
//! moynihan 0.0213 -0.1137 0.0459 ...
//! ```
//!
//! The label is any run of non-whitespace characters, followed by one or
//! more float components. fastText writes a trailing space after the last
//! component, so trailing whitespace is accepted.

use nom::{
    branch::alt,
    bytes::complete::take_till1,
    character::complete::{digit1, space0, space1},
    combinator::{all_consuming, eof, map_res, peek, recognize},
    multi::many1,
    number::complete::recognize_float,
    sequence::{delimited, pair, preceded, separated_pair, terminated},
    IResult,
};

// =============================================================================
// TOKEN PARSERS
// =============================================================================

/// Parse a non-negative count
fn count(input: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse::<usize>)(input)
}

/// Parse a label (any run of non-whitespace)
fn label(input: &str) -> IResult<&str, &str> {
    take_till1(char::is_whitespace)(input)
}

/// Parse one float component that ends at whitespace or end of line
fn component(input: &str) -> IResult<&str, f32> {
    map_res(
        terminated(recognize_float, peek(alt((recognize(space1), eof)))),
        str::parse::<f32>,
    )(input)
}

// =============================================================================
// LINE PARSERS
// =============================================================================

/// Parse the `<vocab_size> <embed_dim>` header
fn header(input: &str) -> IResult<&str, (usize, usize)> {
    delimited(space0, separated_pair(count, space1, count), space0)(input)
}

/// Parse `<label> <f1> ... <fD>`
fn entry(input: &str) -> IResult<&str, (&str, Vec<f32>)> {
    delimited(
        space0,
        pair(label, many1(preceded(space1, component))),
        space0,
    )(input)
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Parse a header line into `(vocab_size, embed_dim)`
///
/// Errors are human-readable messages; the caller attaches file and line.
pub fn parse_header(line: &str) -> std::result::Result<(usize, usize), String> {
    match all_consuming(header)(line) {
        Ok((_, shape)) => Ok(shape),
        Err(_) if line.trim().is_empty() => Err("missing header line".to_string()),
        Err(_) => Err(format!(
            "expected header '<vocab_size> <embed_dim>', found '{}'",
            line.trim()
        )),
    }
}

/// Parse a vector entry into `(label, components)`
pub fn parse_entry(line: &str) -> std::result::Result<(&str, Vec<f32>), String> {
    match all_consuming(entry)(line) {
        Ok((_, parsed)) => Ok(parsed),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(describe(line, e.input)),
        Err(nom::Err::Incomplete(_)) => Err("incomplete line".to_string()),
    }
}

/// Turn the unparsed remainder of a line into an error message
fn describe(line: &str, rest: &str) -> String {
    if line.trim().is_empty() {
        return "empty line".to_string();
    }
    let rest = rest.trim_start();
    if rest.is_empty() {
        return "expected a label followed by at least one component".to_string();
    }
    // The failure may point into the middle of a token ("1.0abc")
    let offset = line.len() - rest.len();
    let head = line[..offset].rsplit(char::is_whitespace).next().unwrap_or("");
    let tail = rest.split(char::is_whitespace).next().unwrap_or("");
    format!("non-numeric component '{}{}'", head, tail)
}
