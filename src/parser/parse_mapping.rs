use nom::bytes::complete::{is_not, tag};
use nom::character::complete::space1;
use nom::multi::many0;
use nom::sequence::{delimited, preceded, terminated, tuple};
use nom::IResult;

use super::{trivia, ws};

/// Parse mapping lines
/// <transition> -> <goal element>
pub fn parse(input: &str) -> IResult<&str, Vec<(String, String)>> {
    preceded(trivia, many0(terminated(mapping_line, trivia)))(input)
}

fn mapping_line(input: &str) -> IResult<&str, (String, String)> {
    let arrow = delimited(space1, tag("->"), space1);
    let (input, (transition, _, element)) = tuple((token, arrow, ws(token)))(input)?;
    Ok((input, (transition.to_string(), element.to_string())))
}

/// Any run of characters up to whitespace or a comment
fn token(input: &str) -> IResult<&str, &str> {
    is_not(" \t\r\n#")(input)
}
