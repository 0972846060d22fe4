#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

use clap::Parser as _;
use solcst_config::{CheckArgs, Command, Opts, ParseArgs, TreeFormat};
use solcst_interface::{Result, SourceFile, diagnostics::DiagCtxt};
use solcst_lint::FileReport;
use solcst_parse::{Parser, SyntaxError, lex};
use std::{io::Write, sync::Arc};

pub mod utils;

use tracing as _;

pub fn parse_args<I, T>(itr: I) -> Result<Opts, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Opts::try_parse_from(itr)
}

/// Runs the command, writing its output to stdout and diagnostics to stderr.
pub fn run(opts: Opts) -> Result {
    let dcx = DiagCtxt::from_format(opts.error_format, opts.color);
    let mut out = anstream::stdout().lock();
    let r = run_with(&opts, &dcx, &mut out);
    dcx.print_error_count();
    r.and(dcx.has_errors())
}

/// Runs the command with the given diagnostics context and output.
pub fn run_with(opts: &Opts, dcx: &DiagCtxt, out: &mut dyn Write) -> Result {
    match &opts.command {
        Command::Parse(args) => parse_files(args, dcx, out),
        Command::Check(args) => check(opts, args, dcx, out),
    }
}

fn parse_files(args: &ParseArgs, dcx: &DiagCtxt, out: &mut dyn Write) -> Result {
    for path in &args.paths {
        let file = match SourceFile::read(path) {
            Ok(file) => Arc::new(file),
            Err(e) => {
                dcx.err(format!("couldn't read {}: {e}", path.display())).emit();
                continue;
            }
        };
        let output = Parser::new(lex(Arc::clone(&file.src))).parse();
        emit_syntax_errors(dcx, &file, &output.errors);

        let cst = &output.cst;
        if args.tokens {
            for token in cst.tokens().tokens() {
                let text = token.text(&file.src).escape_debug();
                let channel = if token.is_default_channel() { "" } else { ",channel=hidden" };
                let r = writeln!(
                    out,
                    "[@{},{}:{}='{text}',<{:?}>{channel},{}]",
                    token.index.index(),
                    token.span.lo().to_usize(),
                    token.span.hi().to_usize(),
                    token.kind,
                    token.start,
                );
                write_result(dcx, r)?;
            }
        }
        if args.tree {
            let tree = match args.tree_format {
                TreeFormat::Sexpr => cst.to_string_tree(),
                TreeFormat::Json => {
                    serde_json::to_string_pretty(&cst.root().to_json()).unwrap_or_default()
                }
            };
            write_result(dcx, writeln!(out, "{tree}"))?;
        }
    }
    Ok(())
}

fn check(opts: &Opts, args: &CheckArgs, dcx: &DiagCtxt, out: &mut dyn Write) -> Result {
    let reports = match solcst_lint::check_dir(&args.dir, args.check, opts.threads.into()) {
        Ok(reports) => reports,
        Err(e) => {
            dcx.err(e.to_string()).emit();
            return dcx.has_errors();
        }
    };
    for report in &reports {
        emit_syntax_errors(dcx, &report.source, &report.errors);
        if report.has_findings() {
            write_result(dcx, write_findings(out, report))?;
        }
    }
    Ok(())
}

fn write_findings(out: &mut dyn Write, report: &FileReport) -> std::io::Result<()> {
    writeln!(out, "=============== Contract {}", report.path.display())?;
    write!(out, "{}", report.findings)?;
    writeln!(out)
}

fn emit_syntax_errors(dcx: &DiagCtxt, file: &Arc<SourceFile>, errors: &[SyntaxError]) {
    for error in errors {
        let mut diag = dcx.err(error.message.clone()).span(file, error.span);
        if let Some(rule) = error.rule {
            diag = diag.note(format!("while parsing {}", rule.name()));
        }
        diag.emit();
    }
}

fn write_result(dcx: &DiagCtxt, r: std::io::Result<()>) -> Result {
    match r {
        Ok(()) => Ok(()),
        Err(e) => {
            dcx.err(format!("failed to write output: {e}")).emit();
            dcx.has_errors()
        }
    }
}
