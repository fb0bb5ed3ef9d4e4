use crate::error::Error;
use crate::regex::Expression;
use crate::utils::IntegerSet;
use logos::Logos;
use std::collections::VecDeque;

/// The token used by [`logos`](/logos/index.html`]).
#[derive(Logos, Debug, PartialEq, Clone)]
pub(crate) enum Token {
    #[end]
    End,

    #[error]
    Error,

    #[token = "|"]
    Union,

    #[token = "&"]
    Intersection,

    #[token = "!"]
    Complement,

    #[token = "("]
    Lpar,

    #[token = ")"]
    Rpar,

    #[token = "*"]
    Kleene,

    #[token = "+"]
    Plus,

    #[token = "?"]
    Question,

    #[token = "."]
    Dot,

    #[token = "["]
    Lbracket,

    #[token = "]"]
    Rbracket,

    #[token = "{"]
    Lbrace,

    #[token = "}"]
    Rbrace,

    #[token = "^"]
    Caret,

    #[token = "-"]
    Dash,

    #[token = ","]
    Comma,

    #[regex = "[0-9]"]
    Digit,

    #[regex = "\\\\."]
    Escape,

    #[regex = "[^|&!()*+?.{}\\[\\]^,0-9\\\\-]"]
    Letter,
}

/*
    REG ::= CHAR
            .
            [CLASS]
            (REG)
            !REG
            REG*  REG+  REG?
            REG{n}  REG{n,}  REG{n,m}
            REGREG
            REG&REG
            REG|REG

    (REG) > REG* = REG+ = REG? = REG{..} > !REG > REGREG > REG&REG > REG|REG
*/

pub(crate) fn tokens(s: &str) -> VecDeque<(Token, &str)> {
    let mut lexer = Token::lexer(s);
    let mut tokens = VecDeque::new();

    while lexer.token != Token::End {
        tokens.push_back((lexer.token.clone(), lexer.slice()));
        lexer.advance();
    }

    tokens
}

pub(crate) fn peak(tokens: &VecDeque<(Token, &str)>) -> Option<Token> {
    tokens.get(0).map(|x| x.0.clone())
}

pub(crate) fn parse(pattern: &str) -> Result<Expression, Error> {
    let mut tokens = tokens(pattern);
    let expr = read_alternation(&mut tokens)?;
    match tokens.front() {
        None => Ok(expr),
        Some((_, slice)) => Err(Error::Syntax(format!("unexpected {:?}", slice))),
    }
}

fn read_alternation(tokens: &mut VecDeque<(Token, &str)>) -> Result<Expression, Error> {
    let mut expr = read_conjunction(tokens)?;
    while peak(tokens) == Some(Token::Union) {
        tokens.pop_front();
        expr = expr.unite(read_conjunction(tokens)?);
    }
    Ok(expr)
}

fn read_conjunction(tokens: &mut VecDeque<(Token, &str)>) -> Result<Expression, Error> {
    let mut expr = read_concat(tokens)?;
    while peak(tokens) == Some(Token::Intersection) {
        tokens.pop_front();
        expr = expr.intersect(read_concat(tokens)?);
    }
    Ok(expr)
}

fn read_concat(tokens: &mut VecDeque<(Token, &str)>) -> Result<Expression, Error> {
    let mut items = Vec::new();

    while let Some(token) = peak(tokens) {
        match token {
            Token::Union | Token::Intersection | Token::Rpar => break,
            Token::Kleene | Token::Plus | Token::Question | Token::Lbrace => {
                return Err(Error::Syntax(format!("unexpected {:?}", tokens[0].1)));
            }
            _ => {
                let atom = read_atom(tokens)?;
                items.push(read_quantified(tokens, atom)?);
            }
        }
    }

    // The empty concatenation is the empty string.
    let mut expr = Expression::epsilon();
    for item in items.into_iter().rev() {
        expr = item.concatenate(expr);
    }
    Ok(expr)
}

fn read_quantified(
    tokens: &mut VecDeque<(Token, &str)>,
    mut expr: Expression,
) -> Result<Expression, Error> {
    loop {
        match peak(tokens) {
            Some(Token::Kleene) => {
                tokens.pop_front();
                expr = expr.kleene();
            }
            Some(Token::Plus) => {
                tokens.pop_front();
                let star = expr.clone().kleene();
                expr = expr.concatenate(star);
            }
            Some(Token::Question) => {
                tokens.pop_front();
                expr = expr.unite(Expression::epsilon());
            }
            Some(Token::Lbrace) => {
                tokens.pop_front();
                expr = read_repetition(tokens, expr)?;
            }
            _ => break,
        }
    }
    Ok(expr)
}

fn read_atom(tokens: &mut VecDeque<(Token, &str)>) -> Result<Expression, Error> {
    let (token, slice) = match tokens.pop_front() {
        Some(front) => front,
        None => return Err(Error::Syntax("expected expression".to_string())),
    };

    match token {
        Token::Dot => Ok(Expression::sigma()),
        Token::Lpar => {
            let expr = read_alternation(tokens)?;
            if peak(tokens) != Some(Token::Rpar) {
                return Err(Error::Syntax("expected right parenthesis".to_string()));
            }
            tokens.pop_front();
            Ok(expr)
        }
        Token::Lbracket => read_class(tokens),
        Token::Complement => {
            let inner = read_atom(tokens)?;
            let inner = read_quantified(tokens, inner)?;
            Ok(inner.negate())
        }
        Token::Escape => literal(unescape(slice)),
        // Everything else stands for itself, including stray `]`, `}`,
        // `^`, `-` and `,` outside the context that gives them meaning.
        Token::Letter
        | Token::Digit
        | Token::Caret
        | Token::Dash
        | Token::Comma
        | Token::Rbracket
        | Token::Rbrace => literal(first_char(slice)),
        _ => Err(Error::Syntax(format!("unexpected {:?}", slice))),
    }
}

fn read_repetition(
    tokens: &mut VecDeque<(Token, &str)>,
    expr: Expression,
) -> Result<Expression, Error> {
    let min = read_number(tokens)?;
    let max = match peak(tokens) {
        Some(Token::Rbrace) => Some(min),
        Some(Token::Comma) => {
            tokens.pop_front();
            match peak(tokens) {
                Some(Token::Digit) => Some(read_number(tokens)?),
                _ => None,
            }
        }
        _ => {
            return Err(Error::Syntax(
                "expected `,` or `}` in repetition".to_string(),
            ));
        }
    };
    if peak(tokens) != Some(Token::Rbrace) {
        return Err(Error::Syntax("expected `}` in repetition".to_string()));
    }
    tokens.pop_front();

    if let Some(max) = max {
        if max < min {
            return Err(Error::Syntax(format!(
                "repetition bounds out of order: {{{},{}}}",
                min, max
            )));
        }
    }

    // e{n} is n copies; e{n,} appends e*; e{n,m} appends m - n optional
    // copies.
    let mut parts = vec![expr.clone(); min];
    match max {
        None => parts.push(expr.kleene()),
        Some(max) => {
            let optional = expr.unite(Expression::epsilon());
            parts.extend(vec![optional; max - min]);
        }
    }

    let mut result = Expression::epsilon();
    for part in parts.into_iter().rev() {
        result = part.concatenate(result);
    }
    Ok(result)
}

fn read_number(tokens: &mut VecDeque<(Token, &str)>) -> Result<usize, Error> {
    let mut digits = String::new();
    while peak(tokens) == Some(Token::Digit) {
        digits.push_str(tokens.pop_front().unwrap().1);
    }
    if digits.is_empty() {
        return Err(Error::Syntax("expected repetition count".to_string()));
    }
    digits
        .parse()
        .map_err(|_| Error::Syntax(format!("repetition count {} out of range", digits)))
}

fn read_class(tokens: &mut VecDeque<(Token, &str)>) -> Result<Expression, Error> {
    let negated = peak(tokens) == Some(Token::Caret);
    if negated {
        tokens.pop_front();
    }

    let mut ranges = Vec::new();
    let mut first = true;
    loop {
        let (token, slice) = match tokens.pop_front() {
            Some(front) => front,
            None => return Err(Error::Syntax("unterminated character class".to_string())),
        };

        let lo = match token {
            Token::Rbracket if !first => break,
            Token::Error => return Err(Error::Syntax(format!("unexpected {:?}", slice))),
            Token::Escape => unescape(slice),
            // Metacharacters lose their meaning inside a class; a leading
            // `]` is literal too.
            _ => first_char(slice),
        };
        first = false;

        // A `-` forms a range unless it is the last thing before `]`.
        let range_dash = peak(tokens) == Some(Token::Dash)
            && !matches!(tokens.get(1), None | Some((Token::Rbracket, _)));
        if range_dash {
            tokens.pop_front();
            let (token, slice) = tokens.pop_front().unwrap();
            let hi = match token {
                Token::Error => return Err(Error::Syntax(format!("unexpected {:?}", slice))),
                Token::Escape => unescape(slice),
                _ => first_char(slice),
            };
            if (hi as u32) < (lo as u32) {
                return Err(Error::Syntax(format!(
                    "character range out of order: {}-{}",
                    lo, hi
                )));
            }
            ranges.push((lo as u32, hi as u32));
        } else {
            ranges.push((lo as u32, lo as u32));
        }
    }

    let mut set = IntegerSet::from_ranges(ranges);
    if negated {
        set = IntegerSet::codespace().difference(&set);
    }
    Expression::symbols(set)
}

fn literal(c: char) -> Result<Expression, Error> {
    Expression::symbols(IntegerSet::from_points(vec![c as u32]))
}

fn first_char(slice: &str) -> char {
    slice.chars().next().unwrap()
}

fn unescape(slice: &str) -> char {
    // The token is a backslash followed by exactly one character.
    let c = slice.chars().nth(1).unwrap();
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        _ => c,
    }
}
