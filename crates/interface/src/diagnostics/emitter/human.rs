use super::{Emitter, io_panic};
use crate::diagnostics::{DiagSpan, Diagnostic, Level};
use annotate_snippets::{AnnotationKind, Group, Level as ASLevel, Renderer, Snippet};
use anstream::AutoStream;
use anstyle::AnsiColor;
use solcst_config::ColorChoice;
use std::io::{self, Write};

type Writer = dyn Write + Send + 'static;

const DEFAULT_RENDERER: Renderer = Renderer::styled()
    .error(Level::Error.style())
    .warning(Level::Warning.style())
    .note(Level::Note.style())
    .help(Level::Help.style())
    .line_num(AnsiColor::BrightBlue.on_default().bold());

/// Diagnostic emitter that emits to an arbitrary [`io::Write`] writer in human-readable format.
///
/// ```text
/// error: missing `;` at `}`
///  --> src/A.sol:3:1
///   |
/// 3 | }
///   | ^
///   |
///   = note: while parsing stateVariableDeclaration
/// ```
pub struct HumanEmitter {
    writer: AutoStream<Box<Writer>>,
}

impl HumanEmitter {
    /// Creates a new emitter writing to `writer`.
    ///
    /// `ColorChoice::Auto` is treated as "never" since the writer cannot be inspected; use
    /// [`stderr`](Self::stderr) for terminal detection.
    pub fn new<W: Write + Send + 'static>(writer: W, color: ColorChoice) -> Self {
        let choice = match color {
            ColorChoice::Auto | ColorChoice::Never => anstream::ColorChoice::Never,
            ColorChoice::Always => anstream::ColorChoice::Always,
        };
        Self { writer: AutoStream::new(Box::new(writer), choice) }
    }

    /// Creates a new emitter writing to stderr.
    pub fn stderr(color: ColorChoice) -> Self {
        let choice = match color {
            ColorChoice::Auto => AutoStream::choice(&io::stderr()),
            ColorChoice::Always => anstream::ColorChoice::Always,
            ColorChoice::Never => anstream::ColorChoice::Never,
        };
        Self { writer: AutoStream::new(Box::new(io::stderr()), choice) }
    }

    /// Renders a diagnostic with ANSI styles. The styles are stripped by the output stream when
    /// colors are disabled.
    pub fn render(diagnostic: &Diagnostic) -> String {
        let level = annotation_level(diagnostic.level);
        let mut title = level.primary_title(diagnostic.message.as_str());
        if let Some(code) = diagnostic.code {
            title = title.id(code);
        }
        let mut group = Group::with_title(title);
        if let Some(span) = &diagnostic.span {
            group = group.element(file_snippet(span));
        }
        for sub in &diagnostic.children {
            group = group.element(annotation_level(sub.level).message(sub.message.as_str()));
        }
        DEFAULT_RENDERER.render(&[group])
    }
}

impl Emitter for HumanEmitter {
    fn emit_diagnostic(&mut self, diagnostic: &Diagnostic) {
        let rendered = Self::render(diagnostic);
        let mut write = || {
            writeln!(self.writer, "{rendered}")?;
            if diagnostic.span.is_some() || !diagnostic.children.is_empty() {
                writeln!(self.writer)?;
            }
            self.writer.flush()
        };
        if let Err(e) = write() {
            io_panic(e);
        }
    }
}

/// Builds a snippet of the lines covered by `ds`, annotated with its primary span.
fn file_snippet(ds: &DiagSpan) -> Snippet<'_, annotate_snippets::Annotation<'_>> {
    let file = &ds.file;
    let lines = file.lines();
    let first = file.lookup_line(ds.span.lo()).unwrap_or(0);
    let last = file.lookup_line(ds.span.hi()).unwrap_or(first).max(first);
    let base = lines[first].to_usize();
    let end = lines.get(last + 1).map_or(file.src.len(), |pos| pos.to_usize());
    let source = file.src.get(base..end).unwrap_or_default();

    let lo = (ds.span.lo().to_usize() - base).min(source.len());
    let hi = ds.span.hi().to_usize().saturating_sub(base).clamp(lo, source.len());
    let mut annotation = AnnotationKind::Primary.span(lo..hi);
    if let Some(label) = &ds.label {
        annotation = annotation.label(label.as_str());
    }
    Snippet::source(source)
        .path(file.name.to_string())
        .line_start(first + 1)
        .fold(true)
        .annotation(annotation)
}

fn annotation_level<'a>(level: Level) -> ASLevel<'a> {
    match level {
        Level::Error => ASLevel::ERROR,
        Level::Warning => ASLevel::WARNING,
        Level::Note => ASLevel::NOTE,
        Level::Help => ASLevel::HELP,
    }
}
