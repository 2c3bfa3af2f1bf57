//! Lexical analysis of path data.
//!
//! Path data is a stream of command letters and numbers separated by
//! optional whitespace and commas. Numbers follow
//! `[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?`, so `1.5.5` lexes as `1.5` and `.5`
//! and `10-5` as `10` and `-5`. Any ASCII letter except `e` lexes as a command;
//! whether it names a known command is decided by the assembler.
//!
//! [`tokenize`] recovers from errors by skipping one character and keeps
//! going, so a single pass reports every bad character.

use winnow::{
    Parser as _,
    ascii::{digit0, digit1},
    combinator::{alt, cut_err, fail, opt},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{one_of, take_while},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
};

/// A token of path data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Token {
    Command(char),
    Number(f64),
    Separator,
}

/// A token with its location in the input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PositionedToken {
    pub token: Token,
    pub span: Span,
}

impl PositionedToken {
    fn new(token: Token, span: Span) -> Self {
        Self { token, span }
    }
}

/// Diagnostic details attached to winnow errors through `.context()`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    /// The error span covers from `start` to the error position.
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<LexerDiagnostic>>;

/// Parse a number without a leading sign, up to but excluding an exponent.
fn mantissa(input: &mut Input<'_>) -> IResult<()> {
    alt(((digit1, opt(('.', digit0))).void(), ('.', digit1).void())).parse_next(input)
}

/// A sign or point with no digits after it.
fn dangling_sign(input: &mut Input<'_>) -> IResult<Token> {
    let start = input.current_token_start();
    one_of(['+', '-', '.']).parse_next(input)?;
    // a sign may still be followed by `.`, as in `-.`
    opt('.').parse_next(input)?;
    cut_err(fail)
        .context(LexerDiagnostic {
            code: ErrorCode::E002,
            message: "expected digits in number",
            help: Some("numbers look like `1`, `-1.5`, `.5` or `2e3`"),
            start,
        })
        .parse_next(input)
}

/// Parse a number literal.
///
/// An `e` that is not followed by digits is left in the input, where it
/// fails as an unexpected character.
fn number_token(input: &mut Input<'_>) -> IResult<Token> {
    (
        opt(one_of(['+', '-'])),
        mantissa,
        opt((one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)),
    )
        .take()
        .try_map(str::parse::<f64>)
        .map(Token::Number)
        .parse_next(input)
}

fn command(input: &mut Input<'_>) -> IResult<Token> {
    one_of(|c: char| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
        .map(Token::Command)
        .parse_next(input)
}

fn separator(input: &mut Input<'_>) -> IResult<Token> {
    take_while(1.., |c: char| c.is_whitespace() || c == ',')
        .value(Token::Separator)
        .parse_next(input)
}

fn positioned_token(input: &mut Input<'_>) -> IResult<PositionedToken> {
    let start_pos = input.current_token_start();

    let token = alt((
        number_token,  // Must come before dangling_sign
        dangling_sign, // Commits with E002
        command,
        separator,
    ))
    .parse_next(input)?;

    let end_pos = input.current_token_start();
    Ok(PositionedToken::new(token, Span::new(start_pos..end_pos)))
}

/// Lexer that accumulates tokens and diagnostics during tokenization.
struct Lexer {
    tokens: Vec<PositionedToken>,
    diagnostics: DiagnosticCollector,
}

impl Lexer {
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    fn tokenize(&mut self, mut input: Input<'_>) {
        while !input.is_empty() {
            let before = input.current_token_start();
            match positioned_token(&mut input) {
                Ok(token) => {
                    if token.token != Token::Separator {
                        self.tokens.push(token);
                    }
                }
                Err(e) => {
                    let error_pos = input.current_token_start();
                    self.diagnostics
                        .emit(Self::convert_err_mode(e, before, error_pos, &input));

                    // Skip the offending character when the failing parser
                    // consumed nothing.
                    if input.current_token_start() == before && !input.is_empty() {
                        input.next_token();
                    }
                }
            }
        }
    }

    fn finish(self) -> Result<Vec<PositionedToken>, ParseError> {
        self.diagnostics.finish().map(|()| self.tokens)
    }

    /// Convert a winnow error into a diagnostic.
    ///
    /// Uses the attached [`LexerDiagnostic`] when present and falls back to
    /// E001 (unexpected character) at the position where lexing stopped.
    fn convert_err_mode(
        err: ErrMode<ContextError<LexerDiagnostic>>,
        before: usize,
        error_pos: usize,
        input: &Input<'_>,
    ) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        if let Some(LexerDiagnostic {
            code,
            message,
            help,
            start,
        }) = context_error.context().next()
        {
            let mut diag = Diagnostic::error(*message)
                .with_code(*code)
                .with_label(Span::new(*start..error_pos), code.description());
            if let Some(h) = help {
                diag = diag.with_help(*h);
            }
            return diag;
        }

        let found = input.chars().next();
        let width = found.map_or(1, char::len_utf8);
        let message = match found {
            Some(c) => format!("unexpected character `{c}`"),
            None => "unexpected end of input".to_string(),
        };
        Diagnostic::error(message)
            .with_code(ErrorCode::E001)
            .with_label(Span::new(before..before + width), ErrorCode::E001.description())
    }
}

/// Split path data into command and number tokens, dropping separators.
///
/// # Errors
///
/// Returns every lexer diagnostic found in the input.
pub(crate) fn tokenize(input: &str) -> Result<Vec<PositionedToken>, ParseError> {
    let mut lexer = Lexer::new();
    lexer.tokenize(LocatingSlice::new(input));
    lexer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|positioned| positioned.token)
            .collect()
    }

    fn error_codes(input: &str) -> Vec<ErrorCode> {
        tokenize(input)
            .unwrap_err()
            .diagnostics()
            .iter()
            .filter_map(Diagnostic::code)
            .collect()
    }

    #[test]
    fn test_commands_and_numbers() {
        assert_eq!(
            tokens("M10,20 l-5 .5"),
            vec![
                Token::Command('M'),
                Token::Number(10.0),
                Token::Number(20.0),
                Token::Command('l'),
                Token::Number(-5.0),
                Token::Number(0.5),
            ]
        );
    }

    #[test]
    fn test_number_forms() {
        assert_eq!(
            tokens("1. +2 -3.25 4e2 5E-1 .75"),
            vec![
                Token::Number(1.0),
                Token::Number(2.0),
                Token::Number(-3.25),
                Token::Number(400.0),
                Token::Number(0.5),
                Token::Number(0.75),
            ]
        );
    }

    #[test]
    fn test_second_point_starts_new_number() {
        assert_eq!(
            tokens("1.5.5"),
            vec![Token::Number(1.5), Token::Number(0.5)]
        );
    }

    #[test]
    fn test_sign_starts_new_number() {
        assert_eq!(
            tokens("10-5"),
            vec![Token::Number(10.0), Token::Number(-5.0)]
        );
    }

    #[test]
    fn test_letters_adjacent_to_numbers() {
        assert_eq!(
            tokens("z1"),
            vec![Token::Command('z'), Token::Number(1.0)]
        );
    }

    #[test]
    fn test_empty_and_separators_only() {
        assert!(tokens("").is_empty());
        assert!(tokens(" ,\n\t, ").is_empty());
    }

    #[test]
    fn test_span_tracking() {
        let positioned = tokenize("M 10,-2").unwrap();
        let spans: Vec<_> = positioned.iter().map(|t| t.span.range()).collect();
        assert_eq!(spans, vec![0..1, 2..4, 5..7]);
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("M 0 0 # L 1 1").unwrap_err();
        assert_eq!(err.diagnostics().len(), 1);

        let diag = &err.diagnostics()[0];
        assert_eq!(diag.code(), Some(ErrorCode::E001));
        assert_eq!(diag.message(), "unexpected character `#`");
        assert_eq!(diag.primary_label().unwrap().span(), Span::new(6..7));
    }

    #[test]
    fn test_exponent_letter_alone_is_unexpected() {
        assert_eq!(error_codes("M 1e"), vec![ErrorCode::E001]);
    }

    #[test]
    fn test_dangling_sign() {
        let err = tokenize("L 1 - 2").unwrap_err();
        let diag = &err.diagnostics()[0];
        assert_eq!(diag.code(), Some(ErrorCode::E002));
        assert_eq!(diag.primary_label().unwrap().span(), Span::new(4..5));
        assert!(diag.help().is_some());
    }

    #[test]
    fn test_multiple_errors_in_one_pass() {
        assert_eq!(
            error_codes("M # 0 ? 0 +"),
            vec![ErrorCode::E001, ErrorCode::E001, ErrorCode::E002]
        );
    }

    #[test]
    fn test_non_ascii_character() {
        let err = tokenize("M 0 0 → 1").unwrap_err();
        let diag = &err.diagnostics()[0];
        assert_eq!(diag.message(), "unexpected character `→`");
        assert_eq!(diag.primary_label().unwrap().span().len(), '→'.len_utf8());
    }
}

#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    // ===== Strategies =====

    fn finite_number() -> impl Strategy<Value = f64> {
        prop_oneof![
            (-10_000i32..10_000).prop_map(f64::from),
            (-1.0e4..1.0e4f64),
        ]
    }

    fn separator_strategy() -> impl Strategy<Value = &'static str> {
        prop_oneof![Just(" "), Just(","), Just(" , "), Just("\n")]
    }

    // ===== Checks =====

    fn check_numbers_round_trip(values: &[f64], separator: &str) -> Result<(), TestCaseError> {
        let text = values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(separator);
        let lexed = tokenize(&text).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(lexed.len(), values.len());
        for (token, expected) in lexed.iter().zip(values) {
            prop_assert_eq!(token.token, Token::Number(*expected));
        }
        Ok(())
    }

    fn check_never_panics(input: &str) -> Result<(), TestCaseError> {
        match tokenize(input) {
            Ok(tokens) => {
                for token in tokens {
                    prop_assert!(token.span.end() <= input.len());
                }
            }
            Err(err) => prop_assert!(!err.diagnostics().is_empty()),
        }
        Ok(())
    }

    // ===== Properties =====

    proptest! {
        #[test]
        fn numbers_round_trip(
            values in prop::collection::vec(finite_number(), 1..12),
            separator in separator_strategy(),
        ) {
            check_numbers_round_trip(&values, separator)?;
        }

        #[test]
        fn never_panics(input in "[ -~→]{0,40}") {
            check_never_panics(&input)?;
        }
    }
}
