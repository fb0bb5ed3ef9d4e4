extern crate logos;

pub mod utils;

pub mod dfa;
pub mod error;
pub mod regex;
pub mod scanner;

mod parser;

/// https://en.wikipedia.org/wiki/Brzozowski_derivative
/// https://en.wikipedia.org/wiki/Deterministic_finite_automaton

#[cfg(test)]
mod tests {
    use crate::dfa::{construct, Automaton, ExpressionVector};
    use crate::error::Error;
    use crate::regex::Expression;
    use crate::scanner::{scan, scan_str, NoMatchError};

    fn automaton(rules: &[(&str, &str)]) -> Automaton {
        let vector = ExpressionVector::new(
            rules
                .iter()
                .map(|&(name, pattern)| (name, Expression::parse(pattern).unwrap())),
        );
        construct(&vector).unwrap()
    }

    fn tokens(automaton: &Automaton, input: &str) -> Vec<(String, String)> {
        scan_str(automaton, input)
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    // Whether `pattern` matches `input` exactly, by plain derivative
    // folding, no automaton involved.
    fn accepts(pattern: &str, input: &str) -> bool {
        let mut expr = Expression::parse(pattern).unwrap();
        for c in input.chars() {
            expr = expr.derivative(c as u32);
        }
        expr.nullable()
    }

    #[test]
    fn test_lexer() {
        let automaton = automaton(&[
            ("string", "\"([^\\\"]|\\\\.)*\""),
            ("number", "[0-9]+"),
            ("identifier", "[a-zA-Z][a-zA-Z0-9]+"),
            ("whitespace", "[ ]+"),
        ]);

        assert_eq!(
            tokens(&automaton, "99 hello \"there\" 42 foo99"),
            vec![
                ("number".to_string(), "99".to_string()),
                ("whitespace".to_string(), " ".to_string()),
                ("identifier".to_string(), "hello".to_string()),
                ("whitespace".to_string(), " ".to_string()),
                ("string".to_string(), "\"there\"".to_string()),
                ("whitespace".to_string(), " ".to_string()),
                ("number".to_string(), "42".to_string()),
                ("whitespace".to_string(), " ".to_string()),
                ("identifier".to_string(), "foo99".to_string()),
            ]
        );
    }

    #[test]
    fn test_no_match() {
        let automaton = automaton(&[("number", "[0-9]+")]);

        let mut scanner = scan_str(&automaton, "abc");
        assert_eq!(
            scanner.next(),
            Some(Err(NoMatchError(vec!['a', 'b', 'c'])))
        );
        // The scanner is fused after failing.
        assert_eq!(scanner.next(), None);
    }

    #[test]
    fn test_no_match_after_tokens() {
        let automaton = automaton(&[("number", "[0-9]+"), ("whitespace", "[ ]+")]);

        let mut scanner = scan_str(&automaton, "42 @!");
        assert_eq!(
            scanner.next(),
            Some(Ok(("number".to_string(), "42".to_string())))
        );
        assert_eq!(
            scanner.next(),
            Some(Ok(("whitespace".to_string(), " ".to_string())))
        );
        assert_eq!(scanner.next(), Some(Err(NoMatchError(vec!['@', '!']))));
        assert_eq!(scanner.next(), None);
    }

    #[test]
    fn test_longest_match() {
        // `==` must win over two `=` tokens.
        let automaton = automaton(&[("assign", "="), ("eq", "==")]);
        assert_eq!(
            tokens(&automaton, "==="),
            vec![
                ("eq".to_string(), "==".to_string()),
                ("assign".to_string(), "=".to_string()),
            ]
        );
    }

    #[test]
    fn test_tie_break_declaration_order() {
        // Both rules accept "if" with the same length; the first declared
        // wins, whichever it is.
        let keyword_first = automaton(&[("keyword", "if"), ("identifier", "[a-z]+")]);
        assert_eq!(
            tokens(&keyword_first, "if")[0].0,
            "keyword".to_string()
        );

        let identifier_first = automaton(&[("identifier", "[a-z]+"), ("keyword", "if")]);
        assert_eq!(
            tokens(&identifier_first, "if")[0].0,
            "identifier".to_string()
        );
    }

    #[test]
    fn test_duplicate_rule_names() {
        let automaton = automaton(&[("x", "[0-9]+"), ("x", "[a-z]+")]);
        assert_eq!(
            tokens(&automaton, "12ab"),
            vec![
                ("x".to_string(), "12".to_string()),
                ("x".to_string(), "ab".to_string()),
            ]
        );
    }

    #[test]
    fn test_scan_is_deterministic() {
        let automaton = automaton(&[("word", "[a-z]+"), ("space", "[ ]+")]);
        let first = tokens(&automaton, "lorem ipsum dolor");
        for _ in 0..10 {
            assert_eq!(tokens(&automaton, "lorem ipsum dolor"), first);
        }
    }

    #[test]
    fn test_scan_bytes() {
        // Atoms need not be characters; here the input is raw bytes and
        // matches come back as byte vectors.
        let automaton = automaton(&[("digits", "[0-9]+"), ("dot", "\\.")]);
        let input: &[u8] = b"192.168";

        let matches: Vec<(String, Vec<u8>)> = scan(&automaton, input.iter().copied())
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(
            matches,
            vec![
                ("digits".to_string(), b"192".to_vec()),
                ("dot".to_string(), b".".to_vec()),
                ("digits".to_string(), b"168".to_vec()),
            ]
        );
    }

    #[test]
    fn test_bounded_repetition() {
        assert!(!accepts("a{3,5}", "aa"));
        assert!(accepts("a{3,5}", "aaa"));
        assert!(accepts("a{3,5}", "aaaa"));
        assert!(accepts("a{3,5}", "aaaaa"));
        assert!(!accepts("a{3,5}", "aaaaaa"));

        assert!(accepts("a{3}", "aaa"));
        assert!(!accepts("a{3}", "aaaa"));

        assert!(!accepts("a{2,}", "a"));
        assert!(accepts("a{2,}", "aa"));
        assert!(accepts("a{2,}", "aaaaaaa"));
    }

    #[test]
    fn test_conjunction_and_complement_matching() {
        // Words over {a, b} with an even number of letters that contain
        // "ab" somewhere.
        let pattern = "((a|b)(a|b))*&!(!(.*ab.*))";
        assert!(accepts(pattern, "ab"));
        assert!(accepts(pattern, "aabb"));
        assert!(!accepts(pattern, "aab"));
        assert!(!accepts(pattern, "bbbb"));

        assert!(accepts("!(ab)", ""));
        assert!(accepts("!(ab)", "ba"));
        assert!(!accepts("!(ab)", "ab"));
    }

    #[test]
    fn test_construct_surfaces_errors() {
        let empty: Vec<(String, Expression)> = Vec::new();
        assert!(matches!(
            construct(&ExpressionVector::new(empty)),
            Err(Error::InvalidArgument(_))
        ));

        let nullable = ExpressionVector::new(vec![("opt", Expression::parse("a?").unwrap())]);
        assert!(matches!(
            construct(&nullable),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_unicode_input() {
        let automaton = automaton(&[("word", "[a-zé]+"), ("space", "[ ]+")]);
        assert_eq!(
            tokens(&automaton, "café au lait"),
            vec![
                ("word".to_string(), "café".to_string()),
                ("space".to_string(), " ".to_string()),
                ("word".to_string(), "au".to_string()),
                ("space".to_string(), " ".to_string()),
                ("word".to_string(), "lait".to_string()),
            ]
        );
    }
}
