use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

use lexomaton::dfa::{construct, ExpressionVector};
use lexomaton::regex::Expression;
use lexomaton::scanner::scan_str;

fn main() {
    let args: Vec<String> = env::args().collect();
    let code = match args.get(1).map(String::as_str) {
        Some("match") if args.len() == 4 => cmd_match(&args[2], &args[3]),
        Some("lex") if args.len() == 3 => cmd_lex(&args[2]),
        _ => {
            eprintln!("usage: lexomaton match <pattern> <input>");
            eprintln!("       lexomaton lex <config-file>");
            2
        }
    };
    process::exit(code);
}

/// Prints the first match of `pattern` in `input`, or `bad regexp`, or
/// `NOPE` — the common protocol.
fn cmd_match(pattern: &str, input: &str) -> i32 {
    let expr = match Expression::parse(pattern) {
        Ok(expr) => expr,
        Err(_) => {
            println!("bad regexp");
            return 1;
        }
    };

    let vector = ExpressionVector::new(vec![("main", expr)]);
    let automaton = match construct(&vector) {
        Ok(automaton) => automaton,
        Err(_) => {
            // Parsed, but unusable as a lexer rule (matches the empty
            // string); same protocol answer.
            println!("bad regexp");
            return 1;
        }
    };

    match scan_str(&automaton, input).next() {
        Some(Ok((_, text))) => {
            println!("{}", text);
            0
        }
        Some(Err(_)) | None => {
            println!("NOPE");
            1
        }
    }
}

/// Builds a lexer from a config file and tokenizes standard input, printing
/// one `name "match"` line per token.
fn cmd_lex(path: &str) -> i32 {
    let config = match fs::read_to_string(path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}: {}", path, err);
            return 1;
        }
    };

    let rules = match read_config(&config) {
        Ok(rules) => rules,
        Err(err) => {
            eprintln!("{}: {}", path, err);
            return 1;
        }
    };

    let automaton = match construct(&ExpressionVector::new(rules)) {
        Ok(automaton) => automaton,
        Err(err) => {
            eprintln!("{}: {}", path, err);
            return 1;
        }
    };

    let mut input = String::new();
    if let Err(err) = io::stdin().read_to_string(&mut input) {
        eprintln!("stdin: {}", err);
        return 1;
    }

    for token in scan_str(&automaton, &input) {
        match token {
            Ok((name, text)) => println!("{} {:?}", name, text),
            Err(err) => {
                eprintln!("{}", err);
                return 1;
            }
        }
    }
    0
}

/// Reads the section-based lexer config: `name = pattern` entries under
/// `[definitions]` (named sub-patterns) and `[tokens]` (the rules, in file
/// order). `{name}` interpolates an earlier entry, parenthesized. `#`
/// starts a comment line.
fn read_config(text: &str) -> Result<Vec<(String, Expression)>, String> {
    let mut definitions: Vec<(String, String)> = Vec::new();
    let mut rules = Vec::new();
    let mut section = String::new();

    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            section = line[1..line.len() - 1].to_string();
            continue;
        }

        let mut parts = line.splitn(2, '=');
        let name = parts.next().unwrap().trim();
        let pattern = match parts.next() {
            Some(pattern) => pattern.trim(),
            None => return Err(format!("line {}: expected `name = pattern`", number + 1)),
        };
        let pattern = interpolate(pattern, &definitions);

        match section.as_str() {
            "definitions" => definitions.push((name.to_string(), pattern)),
            "tokens" => {
                let expr = Expression::parse(&pattern)
                    .map_err(|err| format!("line {}: {}", number + 1, err))?;
                rules.push((name.to_string(), expr));
                definitions.push((name.to_string(), pattern));
            }
            _ => {
                return Err(format!(
                    "line {}: entry outside [definitions] or [tokens]",
                    number + 1
                ));
            }
        }
    }

    Ok(rules)
}

// Replaces each `{name}` naming a known definition with that definition's
// pattern in parentheses. Braces that do not name one pass through, so
// repetition counts survive.
fn interpolate(pattern: &str, definitions: &[(String, String)]) -> String {
    let mut out = String::new();
    let mut rest = pattern;

    while let Some(i) = rest.find('{') {
        out.push_str(&rest[..i]);
        let after = &rest[i + 1..];
        let replaced = after.find('}').and_then(|j| {
            let name = &after[..j];
            definitions
                .iter()
                .rev()
                .find(|(known, _)| known == name)
                .map(|(_, body)| (j, body))
        });
        match replaced {
            Some((j, body)) => {
                out.push('(');
                out.push_str(body);
                out.push(')');
                rest = &after[j + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
