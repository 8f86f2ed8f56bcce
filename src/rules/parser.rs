/// Suricata rule line parser: header tokenizer plus option field extractor
use super::rule::*;
use crate::error::HeaderParseError;
use nom::{
    branch::alt,
    bytes::complete::{take_till, take_while1},
    character::complete::{char, space0},
    combinator::{all_consuming, map},
    multi::separated_list0,
    sequence::{delimited, preceded},
    IResult,
};

/// Parse a complete rule line into a [`RuleRecord`].
///
/// Example: `alert tcp $EXTERNAL_NET any -> $HOME_NET 80 (msg:"Test"; sid:1; rev:1;)`
///
/// The text before the first unescaped `(` is the header, split on
/// whitespace; the direction marker partitions the header tokens into
/// `[action, protocol, src_ip, src_port]` and `[dst_ip, dst_port]` (trailing
/// tokens after dst_port are ignored). The text between `(` and the trailing
/// `)` is the option body.
pub fn parse_rule(line: &str) -> Result<RuleRecord, HeaderParseError> {
    let (header, body) = split_line(line)?;

    let tokens: Vec<&str> = header.split_whitespace().collect();
    let (marker, direction) = tokens
        .iter()
        .enumerate()
        .find_map(|(i, t)| Direction::parse(t).map(|d| (i, d)))
        .ok_or(HeaderParseError::MissingDirection)?;

    if marker < 4 {
        return Err(HeaderParseError::TruncatedHeader {
            expected: 4,
            found: marker,
        });
    }
    if tokens.len() < marker + 3 {
        return Err(HeaderParseError::TruncatedHeader {
            expected: marker + 3,
            found: tokens.len(),
        });
    }

    let options = extract_options(body);
    let sid = parse_int_option(&options, "sid");
    let rev = parse_int_option(&options, "rev");

    Ok(RuleRecord {
        action: RuleAction::parse(tokens[0]),
        protocol: Protocol::parse(tokens[1]),
        src: Endpoint {
            addr: parse_endpoint(tokens[2]),
            port: parse_endpoint(tokens[3]),
        },
        dst: Endpoint {
            addr: parse_endpoint(tokens[marker + 1]),
            port: parse_endpoint(tokens[marker + 2]),
        },
        direction,
        options,
        sid,
        rev,
    })
}

/// Split a line at the first unescaped `(` into header text and option body.
/// The final `)` is stripped; no nested-parenthesis matching beyond that.
fn split_line(line: &str) -> Result<(&str, &str), HeaderParseError> {
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        match c {
            '\\' if !escaped => escaped = true,
            '(' if !escaped => {
                let header = &line[..i];
                let body = line[i + 1..].trim_end();
                let body = body.strip_suffix(')').unwrap_or(body);
                return Ok((header, body));
            }
            _ => escaped = false,
        }
    }
    Err(HeaderParseError::MissingOptionBody)
}

fn parse_int_option(options: &OptionMap, key: &str) -> Option<u32> {
    options
        .values(key)
        .first()
        .and_then(|v| v.trim().parse().ok())
}

/// Parse an endpoint expression (address or port side of a header).
///
/// A string the grammar cannot account for degrades to an opaque literal;
/// endpoint parsing never fails.
pub fn parse_endpoint(input: &str) -> EndpointExpr {
    match all_consuming(endpoint_expr)(input) {
        Ok((_, expr)) => expr,
        Err(_) => EndpointExpr::Literal(input.to_string()),
    }
}

fn endpoint_expr(input: &str) -> IResult<&str, EndpointExpr> {
    alt((
        // Negated expression
        map(preceded(char('!'), endpoint_expr), |e| {
            EndpointExpr::Not(Box::new(e))
        }),
        // Bracketed list
        map(
            delimited(
                char('['),
                separated_list0(char(','), endpoint_expr),
                char(']'),
            ),
            EndpointExpr::List,
        ),
        endpoint_atom,
    ))(input)
}

fn endpoint_atom(input: &str) -> IResult<&str, EndpointExpr> {
    map(
        take_while1(|c: char| !matches!(c, ',' | '[' | ']' | '!')),
        classify_atom,
    )(input)
}

fn classify_atom(token: &str) -> EndpointExpr {
    if token.eq_ignore_ascii_case("any") {
        EndpointExpr::Any
    } else if let Some(name) = token.strip_prefix('$') {
        EndpointExpr::Variable(name.to_string())
    } else {
        EndpointExpr::Literal(token.to_string())
    }
}

/// Extract the ordered key -> value(s) mapping from an option body.
///
/// Scans for `key : ("quoted" | bare)` pairs separated by semicolons. A
/// repeated key is promoted to a list in encounter order. A fragment with no
/// colon (e.g. a bare `nocase` flag) is skipped to the next semicolon:
/// lossy, but never fatal.
pub fn extract_options(body: &str) -> OptionMap {
    let mut options = OptionMap::new();
    let mut rest = body;

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ';');
        if rest.is_empty() {
            break;
        }
        match option_pair(rest) {
            Ok((next, (key, value))) => {
                options.push(key, value);
                rest = next;
            }
            Err(_) => match rest.find(';') {
                Some(idx) => rest = &rest[idx + 1..],
                None => break,
            },
        }
    }

    options
}

fn option_pair(input: &str) -> IResult<&str, (&str, String)> {
    let (input, key) = take_while1(is_option_key_char)(input)?;
    let (input, _) = space0(input)?;
    let (input, _) = char(':')(input)?;
    let (input, _) = space0(input)?;
    let (input, value) = alt((quoted_value, bare_value))(input)?;
    Ok((input, (key, value)))
}

/// Double-quoted value: outer quotes stripped, interior escape sequences
/// (notably `\"`) preserved verbatim.
fn quoted_value(input: &str) -> IResult<&str, String> {
    let (input, _) = char('"')(input)?;
    let mut out = String::new();
    let mut chars = input.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, next)) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            },
            '"' => return Ok((&input[i + 1..], out)),
            _ => out.push(c),
        }
    }
    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

/// Bare value: run of characters up to the next semicolon or quote.
fn bare_value(input: &str) -> IResult<&str, String> {
    map(take_till(|c| c == ';' || c == '"'), |s: &str| {
        s.trim().to_string()
    })(input)
}

fn is_option_key_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}
