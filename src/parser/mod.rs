//! Textual input formats.
//!
//! Nets:
//!
//! ```text
//! # transitions with input places before the arrow, output places after
//! {
//! ta "Approve": p0 -> p1
//! tb: p0 -> p2
//! }
//! # places with optional initial tokens
//! Order { p0(1), p1, p2 }
//! ```
//!
//! Mappings, one `transition -> goal element` per line.

pub mod parse_input;
pub mod parse_mapping;
pub mod transform_input;

use nom::branch::alt;
use nom::character::complete::{char, line_ending, multispace1, not_line_ending, space0};
use nom::combinator::{opt, value};
use nom::multi::many0_count;
use nom::sequence::{delimited, tuple};
use nom::IResult;

use crate::error::LoadError;

/// Whitespace, line breaks and comments.
fn trivia(i: &str) -> IResult<&str, ()> {
    value((), many0_count(alt((value((), multispace1), comment))))(i)
}

/// Parse a comment
/// #This is a comment until a linebreak
fn comment(i: &str) -> IResult<&str, ()> {
    value((), tuple((char('#'), not_line_ending, opt(line_ending))))(i)
}

/// Trim, ignore spaces and tabs before and after
fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(space0, inner, space0)
}

/// Runs `parser` over the whole input, allowing trailing trivia.
pub(crate) fn parse_all<'a, O>(
    input: &'a str,
    parser: impl FnOnce(&'a str) -> IResult<&'a str, O>,
) -> Result<O, LoadError> {
    let (rest, output) = parser(input).map_err(syntax_error)?;
    let (rest, _) = trivia(rest).map_err(syntax_error)?;
    if !rest.is_empty() {
        return Err(LoadError::Syntax(format!(
            "unexpected input near `{}`",
            snippet(rest)
        )));
    }
    Ok(output)
}

fn syntax_error(err: nom::Err<nom::error::Error<&str>>) -> LoadError {
    match err {
        nom::Err::Incomplete(_) => LoadError::Syntax("unexpected end of input".to_string()),
        nom::Err::Error(e) | nom::Err::Failure(e) => LoadError::Syntax(format!(
            "expected {:?} near `{}`",
            e.code,
            snippet(e.input)
        )),
    }
}

fn snippet(input: &str) -> String {
    input.lines().next().unwrap_or_default().chars().take(40).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trivia_skips_comments_and_blank_lines() {
        let (rest, _) = trivia("  # one\n\n# two\nnext").unwrap();
        assert_eq!(rest, "next");
    }

    #[test]
    fn test_comment_at_end_of_input() {
        let (rest, _) = comment("# trailing").unwrap();
        assert_eq!(rest, "");
    }
}
