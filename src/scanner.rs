use crate::dfa::Automaton;
use std::fmt::Debug;
use std::iter::FromIterator;
use std::marker::PhantomData;
use std::mem;
use std::str::Chars;

/// Projection from an input atom to the symbol the automaton transitions
/// on. For text this is the code point value.
pub trait Atom: Clone {
    fn symbol(&self) -> u32;
}

impl Atom for char {
    fn symbol(&self) -> u32 {
        *self as u32
    }
}

impl Atom for u8 {
    fn symbol(&self) -> u32 {
        u32::from(*self)
    }
}

impl Atom for u32 {
    fn symbol(&self) -> u32 {
        *self
    }
}

/// Residual input that cannot start any match. Carries everything that was
/// pending when the scanner gave up.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("no match for input {0:?}")]
pub struct NoMatchError<A: Debug>(pub Vec<A>);

/// A longest-match tokenizer over an atom iterator.
///
/// Lazily yields `(rule_name, match)` pairs until the input and the
/// lookahead buffer drain. The match is assembled through `FromIterator`,
/// `String` for `char` atoms. Ties between rules accepting the same longest
/// prefix go to the rule declared first.
pub struct Scanner<'a, I, A, M = String> {
    automaton: &'a Automaton,
    input: I,
    // Atoms read but not yet yielded; `offset` is the scan position within
    // it, `accept` the last accepting (state, length) seen on this token.
    buffer: Vec<A>,
    offset: usize,
    state: usize,
    accept: Option<(usize, usize)>,
    done: bool,
    _pack: PhantomData<M>,
}

/// Tokenizes `input` with `automaton`.
pub fn scan<'a, I, A, M>(automaton: &'a Automaton, input: I) -> Scanner<'a, I, A, M>
where
    I: Iterator<Item = A>,
    A: Atom,
{
    Scanner {
        automaton,
        input,
        buffer: Vec::new(),
        offset: 0,
        state: 0,
        accept: None,
        done: false,
        _pack: PhantomData,
    }
}

/// [`scan`] over the characters of a string, yielding `String` matches.
pub fn scan_str<'a>(
    automaton: &'a Automaton,
    input: &'a str,
) -> Scanner<'a, Chars<'a>, char, String> {
    scan(automaton, input.chars())
}

// Binary search for the range containing `symbol`.
fn target(edges: &[(u32, u32, usize)], symbol: u32) -> Option<usize> {
    match edges.binary_search_by(|&(lo, _, _)| lo.cmp(&symbol)) {
        Ok(i) => Some(edges[i].2),
        Err(0) => None,
        Err(i) => {
            let (_, hi, next) = edges[i - 1];
            if symbol <= hi {
                Some(next)
            } else {
                None
            }
        }
    }
}

impl<'a, I, A, M> Iterator for Scanner<'a, I, A, M>
where
    I: Iterator<Item = A>,
    A: Atom + Debug,
    M: FromIterator<A>,
{
    type Item = Result<(String, M), NoMatchError<A>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            if !self.automaton.accepts[self.state].is_empty() {
                self.accept = Some((self.state, self.offset));
            }

            let symbol = if self.offset < self.buffer.len() {
                Some(self.buffer[self.offset].symbol())
            } else {
                match self.input.next() {
                    Some(atom) => {
                        let symbol = atom.symbol();
                        self.buffer.push(atom);
                        Some(symbol)
                    }
                    None => None,
                }
            };

            match symbol {
                Some(symbol) => {
                    self.state = target(&self.automaton.transitions[self.state], symbol)
                        .unwrap_or(self.automaton.error);
                    self.offset += 1;
                }
                None => self.state = self.automaton.error,
            }

            if self.state == self.automaton.error {
                return self.take_token();
            }
        }
    }
}

impl<'a, I, A, M> Scanner<'a, I, A, M>
where
    I: Iterator<Item = A>,
    A: Atom + Debug,
    M: FromIterator<A>,
{
    // Called on entering the error state: yield the recorded longest match,
    // or fail, or finish.
    fn take_token(&mut self) -> Option<Result<(String, M), NoMatchError<A>>> {
        match self.accept.take() {
            Some((state, length)) => {
                // Construction rejects rules matching the empty string, so
                // every reset consumes input.
                debug_assert!(length > 0);
                let name = self.automaton.accepts[state][0].clone();
                let matched = self.buffer.drain(..length).collect();
                self.offset = 0;
                self.state = 0;
                Some(Ok((name, matched)))
            }
            None => {
                self.done = true;
                if self.buffer.is_empty() {
                    None
                } else {
                    // Pull in whatever was left so the error shows the whole
                    // unmatchable tail.
                    let mut atoms = mem::replace(&mut self.buffer, Vec::new());
                    atoms.extend(&mut self.input);
                    Some(Err(NoMatchError(atoms)))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_lookup() {
        let edges = vec![(10, 19, 1), (30, 30, 2), (40, 49, 3)];
        assert_eq!(target(&edges, 9), None);
        assert_eq!(target(&edges, 10), Some(1));
        assert_eq!(target(&edges, 15), Some(1));
        assert_eq!(target(&edges, 19), Some(1));
        assert_eq!(target(&edges, 20), None);
        assert_eq!(target(&edges, 30), Some(2));
        assert_eq!(target(&edges, 45), Some(3));
        assert_eq!(target(&edges, 50), None);
        assert_eq!(target(&[], 5), None);
    }
}
