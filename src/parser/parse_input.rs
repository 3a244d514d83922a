use nom::branch::alt;
use nom::bytes::complete::{is_not, tag, take_while};
use nom::character::complete::{alpha1, char, digit1, line_ending, space0};
use nom::combinator::{map_res, opt, peek};
use nom::multi::{many1, separated_list0, separated_list1};
use nom::sequence::{delimited, preceded, terminated, tuple};
use nom::IResult;

use super::{trivia, ws};

pub type Weight = u32;

#[derive(Debug)]
pub struct RawParserInput {
    pub transitions: Vec<RawParserTransition>,
    pub net: RawParserNet,
}

#[derive(Debug)]
pub struct RawParserTransition {
    pub name: String,
    pub label: Option<String>,
    pub input_places: Vec<RawParserPlace>,
    pub output_places: Vec<RawParserPlace>,
}

#[derive(Debug)]
pub struct RawParserNet {
    pub name: String,
    pub places: Vec<RawParserPlace>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RawParserPlace {
    pub name: String,
    pub weight: Weight,
}

pub fn parse(input: &str) -> IResult<&str, RawParserInput> {
    let (input, _) = trivia(input)?;
    let (input, transitions) = transitions(input)?;
    let (input, _) = trivia(input)?;
    let (input, net) = net(input)?;

    let raw_parser_input = RawParserInput { transitions, net };

    Ok((input, raw_parser_input))
}

/// Parse Petrinet
/// { <transitionline> \n ... }
fn transitions(input: &str) -> IResult<&str, Vec<RawParserTransition>> {
    let opening = terminated(char('{'), trivia);
    let transitionlines = many1(terminated(transitionline, trivia));
    let closing = char('}');

    delimited(opening, transitionlines, closing)(input)
}

/// Parse the place declarations
/// <Name> { <place1>, <place2>(<count>), ... }
fn net(input: &str) -> IResult<&str, RawParserNet> {
    let separator = delimited(space0, alt((tag(","), line_ending)), trivia);
    let places_parser = separated_list1(separator, place_with_optional_number);

    let (input, (name, _, _, places, _, _)) = tuple((
        name,
        char('{'),
        trivia,
        places_parser,
        trivia,
        char('}'),
    ))(input)?;

    let raw_parser_net = RawParserNet {
        name: name.to_string(),
        places: set_default_value_for_vec(places, 0),
    };

    Ok((input, raw_parser_net))
}

/// Parse a transitionline: transitions with arcs, pre- and postplaces
/// <transition> ["label"]: <place1>, <place2>, ... -> <place1>, ...
fn transitionline(input: &str) -> IResult<&str, RawParserTransition> {
    let places_parser = |i| separated_list0(char(','), place_with_optional_number)(i);
    let arrow = ws(tag("->"));

    let (input, (transition_name, label, _, input_places, _, output_places)) = tuple((
        name,
        opt(label),
        ws(char(':')),
        places_parser,
        arrow,
        places_parser,
    ))(input)?;

    let proto_transition = RawParserTransition {
        name: transition_name.to_string(),
        label: label.map(str::to_string),
        input_places: set_default_value_for_vec(input_places, 1),
        output_places: set_default_value_for_vec(output_places, 1),
    };

    Ok((input, proto_transition))
}

/// Parse a quoted display name
fn label(input: &str) -> IResult<&str, &str> {
    ws(delimited(char('"'), is_not("\"\r\n"), char('"')))(input)
}

/// Parse a place with optional Number
fn place_with_optional_number(input: &str) -> IResult<&str, (String, Option<Weight>)> {
    let (input, name) = name(input)?;
    let weight_parser = delimited(char('('), map_res(digit1, str::parse::<Weight>), char(')'));
    let (input, weight) = opt(ws(weight_parser))(input)?;

    Ok((input, (name.to_string(), weight)))
}

/// Parse a name
/// with isalphanumerical or underscore
fn name(i: &str) -> IResult<&str, &str> {
    ws(preceded(
        peek(alpha1),
        take_while(|c: char| c.is_alphanumeric() || c == '_'),
    ))(i)
}

fn set_default_value_for_vec(
    input: Vec<(String, Option<Weight>)>,
    value: Weight,
) -> Vec<RawParserPlace> {
    input
        .into_iter()
        .map(|(name, weight)| RawParserPlace {
            name,
            weight: weight.unwrap_or(value),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_parse_net() {
        let input = indoc! {r#"
            # order handling
            {
            ta "Approve order": p0 -> p1
            tb: p0 -> p2, p3
            }
            Order { p0(1), p1, p2
              p3 }
        "#};
        let (rest, raw) = parse(input).unwrap();
        assert_eq!(rest.trim(), "");
        assert_eq!(raw.net.name, "Order");
        assert_eq!(raw.net.places.len(), 4);
        assert_eq!(
            raw.net.places[0],
            RawParserPlace {
                name: "p0".to_string(),
                weight: 1
            }
        );
        assert_eq!(raw.net.places[3].weight, 0);

        assert_eq!(raw.transitions.len(), 2);
        let ta = &raw.transitions[0];
        assert_eq!(ta.name, "ta");
        assert_eq!(ta.label.as_deref(), Some("Approve order"));
        assert_eq!(ta.input_places[0].weight, 1);
        let tb = &raw.transitions[1];
        assert_eq!(tb.label, None);
        assert_eq!(tb.output_places.len(), 2);
    }

    #[test]
    fn test_transition_without_outputs() {
        let input = indoc! {"
            {
            sink: p0 ->
            gen: -> p0
            }
            N { p0 }
        "};
        let (_, raw) = parse(input).unwrap();
        assert!(raw.transitions[0].output_places.is_empty());
        assert!(raw.transitions[1].input_places.is_empty());
        assert_eq!(raw.transitions[1].output_places[0].name, "p0");
    }

    #[test]
    fn test_arc_weight_is_kept() {
        let (_, t) = transitionline("t: p0(2) -> p1").unwrap();
        assert_eq!(t.input_places[0].weight, 2);
    }

    #[test]
    fn test_missing_place_block_fails() {
        assert!(parse("{\nt: p0 -> p1\n}\n").is_err());
    }
}
