use super::{AddressParser, ParseError, ParsedAddress};

/// Parser tolérant: `local@domain`, `Nom <local@domain>`, commentaires `( )`.
///
/// Display names and comments are accepted and dropped, so the parsed address
/// may differ from the input; the validator relies on that to reject input it
/// would otherwise silently rewrite.
#[derive(Debug, Clone, Copy, Default)]
pub struct MailboxParser;

impl AddressParser for MailboxParser {
    fn parse(&self, raw: &str) -> Result<ParsedAddress, ParseError> {
        let input = raw.trim();
        if input.is_empty() {
            return Err(ParseError::Empty);
        }

        let without_comments = strip_comments(input)?;
        let spec = angle_addr(&without_comments)?.trim();
        if spec.is_empty() {
            return Err(ParseError::Empty);
        }

        match split_at_sign(spec) {
            Some((local, domain)) => {
                let local = parse_local(local)?;
                let domain = parse_domain(domain)?;
                Ok(ParsedAddress::new(local, Some(domain)))
            }
            // pas de '@': adresse locale seule
            None => Ok(ParsedAddress::new(parse_local(spec)?, None)),
        }
    }
}

fn is_atext(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '!' | '#'
                | '$'
                | '%'
                | '&'
                | '\''
                | '*'
                | '+'
                | '-'
                | '/'
                | '='
                | '?'
                | '^'
                | '_'
                | '`'
                | '{'
                | '|'
                | '}'
                | '~'
        )
}

/// Removes `( ... )` comments outside quoted strings. A closed comment is
/// replaced by a single space so that it still separates tokens.
fn strip_comments(input: &str) -> Result<String, ParseError> {
    let mut out = String::with_capacity(input.len());
    let mut depth = 0usize;
    let mut in_quote = false;
    let mut escaped = false;

    for ch in input.chars() {
        if escaped {
            if depth == 0 {
                out.push(ch);
            }
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_quote || depth > 0 => {
                escaped = true;
                if depth == 0 {
                    out.push(ch);
                }
            }
            '"' if depth == 0 => {
                in_quote = !in_quote;
                out.push(ch);
            }
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => {
                if depth == 0 {
                    return Err(ParseError::UnbalancedComment);
                }
                depth -= 1;
                if depth == 0 {
                    out.push(' ');
                }
            }
            _ if depth > 0 => {}
            _ => out.push(ch),
        }
    }

    if in_quote {
        Err(ParseError::UnterminatedQuote)
    } else if depth > 0 {
        Err(ParseError::UnbalancedComment)
    } else {
        Ok(out)
    }
}

/// Byte offsets of `target` outside quoted strings.
fn unquoted_positions(input: &str, target: char) -> impl Iterator<Item = usize> + '_ {
    let mut in_quote = false;
    let mut escaped = false;
    input.char_indices().filter_map(move |(idx, ch)| {
        if escaped {
            escaped = false;
            return None;
        }
        match ch {
            '\\' if in_quote => escaped = true,
            '"' => in_quote = !in_quote,
            c if c == target && !in_quote => return Some(idx),
            _ => {}
        }
        None
    })
}

fn angle_addr(input: &str) -> Result<&str, ParseError> {
    let Some(open) = unquoted_positions(input, '<').next() else {
        if unquoted_positions(input, '>').next().is_some() {
            return Err(ParseError::UnbalancedAngle);
        }
        return Ok(input);
    };

    let rest = &input[open + 1..];
    let close = unquoted_positions(rest, '>')
        .next()
        .ok_or(ParseError::UnbalancedAngle)?;
    let spec = &rest[..close];
    if unquoted_positions(spec, '<').next().is_some() {
        return Err(ParseError::UnbalancedAngle);
    }

    let trailing = rest[close + 1..].trim();
    if !trailing.is_empty() {
        return Err(ParseError::TrailingContent {
            content: trailing.to_string(),
        });
    }
    Ok(spec)
}

fn split_at_sign(spec: &str) -> Option<(&str, &str)> {
    let at = unquoted_positions(spec, '@').last()?;
    Some((&spec[..at], &spec[at + 1..]))
}

/// Dot-atom (quoted strings allowed for the local part). Whitespace next to a
/// dot is folded away; whitespace between two words is an error.
fn fold_dot_atom(
    text: &str,
    segment: &'static str,
    allow_quotes: bool,
) -> Result<String, ParseError> {
    let mut out = String::with_capacity(text.len());
    let mut in_quote = false;
    let mut escaped = false;
    let mut pending_space = false;

    for ch in text.chars() {
        if in_quote {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_quote = false;
            }
            continue;
        }

        if ch.is_ascii_whitespace() {
            pending_space = true;
            continue;
        }
        if ch == '.' {
            pending_space = false;
            out.push(ch);
            continue;
        }
        if pending_space && !out.is_empty() && !out.ends_with('.') {
            return Err(ParseError::whitespace(segment));
        }
        pending_space = false;

        match ch {
            '"' if allow_quotes => {
                in_quote = true;
                out.push(ch);
            }
            c if is_atext(c) => out.push(c),
            c => return Err(ParseError::invalid_char(c, segment)),
        }
    }

    if in_quote {
        return Err(ParseError::UnterminatedQuote);
    }
    Ok(out)
}

fn parse_local(local: &str) -> Result<String, ParseError> {
    let local = local.trim();
    if local.is_empty() {
        return Err(ParseError::EmptyLocal);
    }
    fold_dot_atom(local, "local part", true)
}

fn parse_domain(domain: &str) -> Result<String, ParseError> {
    let domain = domain.trim();
    if domain.is_empty() {
        return Err(ParseError::EmptyDomain);
    }

    // domain-literal: [192.0.2.1]
    if let Some(inner) = domain.strip_prefix('[') {
        let inner = inner
            .strip_suffix(']')
            .ok_or(ParseError::invalid_char('[', "domain literal"))?;
        if let Some(c) = inner
            .chars()
            .find(|c| !c.is_ascii_graphic() || matches!(c, '[' | ']' | '\\'))
        {
            return Err(ParseError::invalid_char(c, "domain literal"));
        }
        return Ok(domain.to_string());
    }

    fold_dot_atom(domain, "domain", false)
}
