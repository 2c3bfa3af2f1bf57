//! Path data parsing.
//!
//! The assembler walks the lexer's tokens, groups numbers by the parameter
//! count of the active command and pushes one segment per complete group.
//! A command followed by more than one group repeats; `M` and `m` continue as
//! `L` and `l`.

use log::debug;
use quill_core::{
    geometry::Point,
    path::{ArcParams, Command, Path, Segment},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    lexer::{self, PositionedToken, Token},
    span::Span,
};

/// The commands the path grammar knows, by lower case letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Move,
    Line,
    Horizontal,
    Vertical,
    Cubic,
    SmoothCubic,
    Quadratic,
    SmoothQuadratic,
    Arc,
    Close,
}

impl Kind {
    fn from_letter(letter: char) -> Option<Self> {
        let kind = match letter.to_ascii_lowercase() {
            'm' => Self::Move,
            'l' => Self::Line,
            'h' => Self::Horizontal,
            'v' => Self::Vertical,
            'c' => Self::Cubic,
            's' => Self::SmoothCubic,
            'q' => Self::Quadratic,
            't' => Self::SmoothQuadratic,
            'a' => Self::Arc,
            'z' => Self::Close,
            _ => return None,
        };
        Some(kind)
    }

    fn parameter_count(self) -> usize {
        match self {
            Self::Move | Self::Line | Self::SmoothQuadratic => 2,
            Self::Horizontal | Self::Vertical => 1,
            Self::Cubic => 6,
            Self::SmoothCubic | Self::Quadratic => 4,
            Self::Arc => 7,
            Self::Close => 0,
        }
    }

    /// Builds the command from exactly [`parameter_count`](Self::parameter_count) values.
    fn build(self, n: &[f64]) -> Command {
        let p = |i: usize| Point::new(n[i], n[i + 1]);
        match self {
            Self::Move => Command::Move(p(0)),
            Self::Line => Command::Line(p(0)),
            Self::Horizontal => Command::Horizontal(n[0]),
            Self::Vertical => Command::Vertical(n[0]),
            Self::Cubic => Command::Cubic {
                c1: p(0),
                c2: p(2),
                to: p(4),
            },
            Self::SmoothCubic => Command::SmoothCubic { c2: p(0), to: p(2) },
            Self::Quadratic => Command::Quadratic {
                control: p(0),
                to: p(2),
            },
            Self::SmoothQuadratic => Command::SmoothQuadratic(p(0)),
            Self::Arc => Command::Arc(ArcParams {
                rx: n[0],
                ry: n[1],
                rotation: n[2],
                large_arc: n[3] != 0.0,
                sweep: n[4] != 0.0,
                to: p(5),
            }),
            Self::Close => Command::Close,
        }
    }
}

/// The command currently consuming numbers.
#[derive(Debug, Clone, Copy)]
struct Active {
    kind: Kind,
    letter: char,
    relative: bool,
    span: Span,
    /// Whether at least one segment was produced for this command.
    produced: bool,
}

/// What happens to numbers that have no command to feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orphans {
    /// Report them; no command was seen yet.
    BeforeCommand,
    /// Report them; the last command was a close.
    AfterClose,
    /// Drop them silently; the command that would take them was already reported.
    Skip,
}

struct Assembler {
    path: Path,
    active: Option<Active>,
    orphans: Orphans,
    /// Numbers waiting for a complete group, with their spans.
    pending: Vec<(f64, Span)>,
    /// Span of the run of orphaned numbers being collected.
    orphan_run: Option<Span>,
    diagnostics: DiagnosticCollector,
}

impl Assembler {
    fn new() -> Self {
        Self {
            path: Path::new(),
            active: None,
            orphans: Orphans::BeforeCommand,
            pending: Vec::new(),
            orphan_run: None,
            diagnostics: DiagnosticCollector::new(),
        }
    }

    fn assemble(mut self, tokens: &[PositionedToken]) -> Result<Path, ParseError> {
        for positioned in tokens {
            match positioned.token {
                Token::Command(letter) => self.command(letter, positioned.span),
                Token::Number(value) => self.number(value, positioned.span),
                Token::Separator => {}
            }
        }
        self.finish_command();
        self.flush_orphans();

        let Self {
            path, diagnostics, ..
        } = self;
        diagnostics.finish().map(|()| path)
    }

    fn command(&mut self, letter: char, span: Span) {
        self.finish_command();
        self.flush_orphans();

        let Some(kind) = Kind::from_letter(letter) else {
            self.diagnostics.emit(
                Diagnostic::error(format!("unknown path command `{letter}`"))
                    .with_code(ErrorCode::E100)
                    .with_label(span, "not a path command"),
            );
            self.active = None;
            self.orphans = Orphans::Skip;
            return;
        };

        let relative = letter.is_ascii_lowercase();
        if kind == Kind::Close {
            self.path.push(Segment::new(Command::Close, relative));
            self.active = None;
            self.orphans = Orphans::AfterClose;
            return;
        }

        self.active = Some(Active {
            kind,
            letter,
            relative,
            span,
            produced: false,
        });
    }

    fn number(&mut self, value: f64, span: Span) {
        let Some(active) = self.active.as_mut() else {
            self.orphan_run = Some(match self.orphan_run {
                Some(run) => run.union(span),
                None => span,
            });
            return;
        };

        self.pending.push((value, span));
        if self.pending.len() < active.kind.parameter_count() {
            return;
        }

        let values: Vec<f64> = self.pending.drain(..).map(|(value, _)| value).collect();
        let command = active.kind.build(&values);
        self.path.push(Segment::new(command, active.relative));
        active.produced = true;

        if active.kind == Kind::Move {
            active.kind = Kind::Line;
        }
    }

    /// Reports an incomplete group for the active command, if any.
    fn finish_command(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        if self.pending.is_empty() && active.produced {
            return;
        }

        let expected = active.kind.parameter_count();
        let found = self.pending.len();
        let mut diagnostic = Diagnostic::error(format!(
            "command `{}` takes {expected} parameters, found {found}",
            active.letter
        ))
        .with_code(ErrorCode::E103);

        diagnostic = match (self.pending.first(), self.pending.last()) {
            (Some((_, first)), Some((_, last))) => diagnostic
                .with_label(first.union(*last), ErrorCode::E103.description())
                .with_secondary_label(active.span, "command started here"),
            _ => diagnostic.with_label(active.span, "no parameters follow this command"),
        };
        self.diagnostics
            .emit(diagnostic.with_help(format!("give `{}` {expected} numbers", active.letter)));
        self.pending.clear();
    }

    fn flush_orphans(&mut self) {
        let Some(run) = self.orphan_run.take() else {
            return;
        };
        let diagnostic = match self.orphans {
            Orphans::BeforeCommand => Diagnostic::error("parameters before any command")
                .with_code(ErrorCode::E101)
                .with_label(run, "expected a command letter before these numbers")
                .with_help("path data starts with a command such as `M`"),
            Orphans::AfterClose => Diagnostic::error("parameters after close")
                .with_code(ErrorCode::E102)
                .with_label(run, "`Z` takes no parameters")
                .with_help("start a new subpath with `M` first"),
            Orphans::Skip => return,
        };
        self.diagnostics.emit(diagnostic);
    }
}

/// Parse SVG style path data.
///
/// Commands keep their letter and case, so [`Path::to_svg`] reproduces the
/// commands of the input.
///
/// # Errors
///
/// Returns a [`ParseError`] carrying every problem found: unexpected
/// characters, unknown commands, numbers before the first command or after
/// `Z`, and incomplete parameter groups.
///
/// # Examples
///
/// ```
/// # use quill_parser::parse_path;
/// let path = parse_path("M0,0 10,0 10,10 z").unwrap();
/// assert_eq!(path.to_svg(), "M 0 0 L 10 0 L 10 10 z");
///
/// assert!(parse_path("0 0 L 10 10").is_err());
/// ```
pub fn parse_path(source: &str) -> Result<Path, ParseError> {
    let tokens = lexer::tokenize(source)?;
    let path = Assembler::new().assemble(&tokens)?;
    debug!(segments = path.segments().len(); "Parsed path data");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(source: &str) -> Vec<ErrorCode> {
        parse_path(source)
            .unwrap_err()
            .diagnostics()
            .iter()
            .filter_map(Diagnostic::code)
            .collect()
    }

    #[test]
    fn test_empty_input() {
        let path = parse_path("").unwrap();
        assert!(path.is_empty());
        assert!(parse_path("  \n ").unwrap().is_empty());
    }

    #[test]
    fn test_all_commands() {
        let source = "M 1 2 L 3 4 H 5 V 6 C 1 2 3 4 5 6 S 1 2 3 4 Q 1 2 3 4 T 5 6 A 5 5 30 1 0 9 9 Z";
        let path = parse_path(source).unwrap();
        assert_eq!(path.segments().len(), 10);
        assert_eq!(path.to_svg(), source);
    }

    #[test]
    fn test_relative_case_preserved() {
        let path = parse_path("m1 2l3 4h5v6c1 2 3 4 5 6s1 2 3 4q1 2 3 4t5 6a5 5 30 1 0 9 9z").unwrap();
        assert!(path.segments().iter().all(Segment::is_relative));
        assert_eq!(
            path.to_svg(),
            "m 1 2 l 3 4 h 5 v 6 c 1 2 3 4 5 6 s 1 2 3 4 q 1 2 3 4 t 5 6 a 5 5 30 1 0 9 9 z"
        );
    }

    #[test]
    fn test_move_overflow_becomes_line() {
        let path = parse_path("M0,0 10,0 10,10").unwrap();
        assert_eq!(path.to_svg(), "M 0 0 L 10 0 L 10 10");

        let path = parse_path("m1 1 2 2").unwrap();
        assert_eq!(path.to_svg(), "m 1 1 l 2 2");
    }

    #[test]
    fn test_overflow_repeats_command() {
        let path = parse_path("M0 0 C 1 1 2 2 3 3 4 4 5 5 6 6 h 1 2").unwrap();
        assert_eq!(
            path.to_svg(),
            "M 0 0 C 1 1 2 2 3 3 C 4 4 5 5 6 6 h 1 h 2"
        );
    }

    #[test]
    fn test_arc_flags() {
        let path = parse_path("M0 0 A 10 20 45 0 2 30 40").unwrap();
        match path.segments()[1].command() {
            Command::Arc(arc) => {
                assert_eq!((arc.rx, arc.ry, arc.rotation), (10.0, 20.0, 45.0));
                assert!(!arc.large_arc);
                assert!(arc.sweep);
                assert_eq!(arc.to, Point::new(30.0, 40.0));
            }
            other => panic!("expected an arc, found {other:?}"),
        }
    }

    #[test]
    fn test_compact_numbers() {
        let path = parse_path("M.5.5L-1-1").unwrap();
        assert_eq!(path.to_svg(), "M 0.5 0.5 L -1 -1");
    }

    #[test]
    fn test_close_then_new_subpath() {
        let path = parse_path("M0 0 L1 0 Z M5 5 L6 5 z").unwrap();
        assert_eq!(path.segments().len(), 6);
    }

    #[test]
    fn test_unknown_command() {
        let err = parse_path("M 0 0 B 1 1 L 2 2").unwrap_err();
        assert_eq!(err.diagnostics().len(), 1);

        let diag = &err.diagnostics()[0];
        assert_eq!(diag.code(), Some(ErrorCode::E100));
        assert_eq!(diag.message(), "unknown path command `B`");
        assert_eq!(diag.primary_label().unwrap().span(), Span::new(6..7));
    }

    #[test]
    fn test_numbers_before_command() {
        let err = parse_path("10 20 M 0 0").unwrap_err();
        let diag = &err.diagnostics()[0];
        assert_eq!(diag.code(), Some(ErrorCode::E101));
        assert_eq!(diag.primary_label().unwrap().span(), Span::new(0..5));
    }

    #[test]
    fn test_numbers_after_close() {
        assert_eq!(codes("M 0 0 L 1 1 Z 5 5"), vec![ErrorCode::E102]);
    }

    #[test]
    fn test_incomplete_group() {
        let err = parse_path("M 0 0 C 1 2 3 4").unwrap_err();
        let diag = &err.diagnostics()[0];
        assert_eq!(diag.code(), Some(ErrorCode::E103));
        assert_eq!(diag.message(), "command `C` takes 6 parameters, found 4");
        assert_eq!(diag.primary_label().unwrap().span(), Span::new(8..15));
        assert_eq!(diag.labels()[1].span(), Span::new(6..7));
    }

    #[test]
    fn test_command_without_parameters() {
        let err = parse_path("M L 1 1").unwrap_err();
        let diag = &err.diagnostics()[0];
        assert_eq!(diag.code(), Some(ErrorCode::E103));
        assert_eq!(diag.message(), "command `M` takes 2 parameters, found 0");
    }

    #[test]
    fn test_incomplete_after_overflow() {
        assert_eq!(codes("M 0 0 L 1 1 2"), vec![ErrorCode::E103]);
    }

    #[test]
    fn test_all_errors_reported() {
        assert_eq!(
            codes("1 M 0 0 # L 1 1 z 2 C 1"),
            vec![ErrorCode::E001]
        );
        assert_eq!(
            codes("1 M 0 0 L 1 1 z 2 C 1"),
            vec![ErrorCode::E101, ErrorCode::E102, ErrorCode::E103]
        );
    }

    #[test]
    fn test_unknown_command_swallows_its_numbers() {
        // Only the letter is reported, not its parameters.
        assert_eq!(codes("M 0 0 k 1 2 3 L 1 1"), vec![ErrorCode::E100]);
    }
}

#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    // ===== Strategies =====

    fn coordinate() -> impl Strategy<Value = f64> + Clone {
        (-500i32..500).prop_map(|v| f64::from(v) / 4.0)
    }

    fn segment_strategy() -> impl Strategy<Value = Segment> {
        let point = (coordinate(), coordinate()).prop_map(|(x, y)| Point::new(x, y));
        let command = prop_oneof![
            point.clone().prop_map(Command::Line),
            coordinate().prop_map(Command::Horizontal),
            coordinate().prop_map(Command::Vertical),
            (point.clone(), point.clone(), point.clone())
                .prop_map(|(c1, c2, to)| Command::Cubic { c1, c2, to }),
            (point.clone(), point.clone()).prop_map(|(c2, to)| Command::SmoothCubic { c2, to }),
            (point.clone(), point.clone())
                .prop_map(|(control, to)| Command::Quadratic { control, to }),
            point.clone().prop_map(Command::SmoothQuadratic),
            (
                coordinate(),
                coordinate(),
                coordinate(),
                any::<bool>(),
                any::<bool>(),
                point.clone()
            )
                .prop_map(|(rx, ry, rotation, large_arc, sweep, to)| {
                    Command::Arc(ArcParams {
                        rx,
                        ry,
                        rotation,
                        large_arc,
                        sweep,
                        to,
                    })
                }),
            Just(Command::Close),
        ];
        (command, any::<bool>()).prop_map(|(command, relative)| Segment::new(command, relative))
    }

    fn path_strategy() -> impl Strategy<Value = Path> {
        (
            (coordinate(), coordinate()),
            prop::collection::vec(segment_strategy(), 0..16),
        )
            .prop_map(|((x, y), segments)| {
                std::iter::once(Segment::absolute(Command::Move(Point::new(x, y))))
                    .chain(segments)
                    .collect()
            })
    }

    // ===== Checks =====

    fn check_svg_round_trip(path: &Path) -> Result<(), TestCaseError> {
        let parsed = parse_path(path.to_svg()).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(&parsed, path);
        prop_assert_eq!(parsed.to_svg(), path.to_svg());
        Ok(())
    }

    // ===== Properties =====

    proptest! {
        #[test]
        fn svg_round_trip(path in path_strategy()) {
            check_svg_round_trip(&path)?;
        }

        #[test]
        fn never_panics(source in "[MLHVCSQTAZmlhvcsqtaz0-9 ,.+-]{0,60}") {
            let _ = parse_path(&source);
        }
    }
}
