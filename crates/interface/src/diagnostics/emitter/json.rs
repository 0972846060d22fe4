use super::{Emitter, io_panic};
use crate::diagnostics::{Diagnostic, HumanEmitter};
use serde::Serialize;
use std::io;

/// Diagnostic emitter that emits diagnostics as JSON, one object per line.
pub struct JsonEmitter {
    writer: Box<dyn io::Write + Send>,
    pretty: bool,
}

impl Emitter for JsonEmitter {
    fn emit_diagnostic(&mut self, diagnostic: &Diagnostic) {
        self.emit(&JsonDiagnostic::new(diagnostic)).unwrap_or_else(|e| io_panic(e));
    }
}

impl JsonEmitter {
    /// Creates a new `JsonEmitter` that writes to given writer.
    pub fn new(writer: Box<dyn io::Write + Send>) -> Self {
        Self { writer, pretty: false }
    }

    /// Sets whether to pretty print the JSON.
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    fn emit(&mut self, value: &impl Serialize) -> io::Result<()> {
        let res = if self.pretty {
            serde_json::to_writer_pretty(&mut *self.writer, value)
        } else {
            serde_json::to_writer(&mut *self.writer, value)
        };
        res?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonDiagnostic<'a> {
    severity: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<JsonLocation<'a>>,
    notes: Vec<String>,
    /// The human-readable rendering, without colors.
    rendered: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonLocation<'a> {
    file: String,
    line: usize,
    column: usize,
    start: u32,
    end: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
}

impl<'a> JsonDiagnostic<'a> {
    fn new(d: &'a Diagnostic) -> Self {
        let location = d.span.as_ref().map(|ds| {
            let (line, col) = ds.file.lookup_line_col(ds.span.lo());
            JsonLocation {
                file: ds.file.name.to_string(),
                line,
                column: col.to_usize() + 1,
                start: ds.span.lo().to_u32(),
                end: ds.span.hi().to_u32(),
                label: ds.label.as_deref(),
            }
        });
        Self {
            severity: d.level.to_str(),
            code: d.code,
            message: &d.message,
            location,
            notes: d.children.iter().map(|c| format!("{}: {}", c.level, c.message)).collect(),
            rendered: anstream::adapter::strip_str(&HumanEmitter::render(d)).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        SourceFile, Span,
        diagnostics::{DiagSpan, Level},
        source_map::FileName,
    };
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn one_object_per_line() {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let mut emitter = JsonEmitter::new(Box::new(SharedBuf(buf.clone())));
        let file = Arc::new(SourceFile::new(FileName::Custom("x".into()), "a\nbcd"));
        let mut d = Diagnostic::new(Level::Error, "bad");
        d.span = Some(DiagSpan { file, span: Span::from_range(3..4), label: None });
        emitter.emit_diagnostic(&d);
        emitter.emit_diagnostic(&Diagnostic::new(Level::Warning, "meh"));

        let out = String::from_utf8(buf.lock().clone()).unwrap();
        let lines: Vec<serde_json::Value> =
            out.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["severity"], "error");
        assert_eq!(lines[0]["location"]["line"], 2);
        assert_eq!(lines[0]["location"]["column"], 2);
        assert_eq!(lines[0]["location"]["file"], "<x>");
        assert_eq!(lines[1]["severity"], "warning");
        assert!(lines[1].get("location").is_none());
    }
}
