use std::{
    fs, io,
    ops::Range,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{bail, Context, Result};
use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use untyped::{
    parser::ParseError,
    session::{Gate, Mode, Options, Resume, Session, SessionError},
};
use util::{pause, repl};

#[derive(Parser, Debug)]
#[command(
    name = "untyped-lambda",
    version,
    about = "Untyped lambda calculus interpreter",
    long_about = "Evaluates the formulas of FILE, or starts an interactive \
                  session when no file is given. Type `exit` or `quit` to leave."
)]
struct Args {
    /// Source file
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Show each formula before evaluation [default]
    #[arg(short = 'b', long = "before", overrides_with = "only")]
    before: bool,

    /// Show only evaluation results
    #[arg(short = 'o', long = "only", overrides_with = "before")]
    only: bool,

    /// Pause after every rewrite: `c` finishes, `q` drops the formula
    #[arg(short = 's', long = "step")]
    step: bool,

    /// Stop reducing a formula after N rewrites
    #[arg(long = "max-steps", value_name = "N")]
    max_steps: Option<usize>,
}

impl Args {
    fn options(&self) -> Options {
        Options {
            show_before: !self.only,
            step: self.step,
            max_steps: self.max_steps,
        }
    }
}

struct Keyboard;

impl Gate for Keyboard {
    fn wait(&mut self) -> io::Result<Resume> {
        Ok(Resume::from_key(pause::wait_key()?))
    }
}

/// Byte offsets to the char offsets ariadne works with.
fn char_span(source: &[u8], span: Range<usize>) -> Range<usize> {
    let offset = |i: usize| {
        String::from_utf8_lossy(&source[..i.min(source.len())])
            .chars()
            .count()
    };
    offset(span.start)..offset(span.end)
}

fn build_report(e: &ParseError, source: &[u8]) -> Report {
    let span = char_span(source, e.span());
    let report = Report::build(ReportKind::Error, (), span.start).with_message(e.to_string());
    match e {
        ParseError::UnexpectedEof(_) => report.with_label(
            Label::new(span)
                .with_message(format!(
                    "Comment opened here is never closed by {}",
                    "*)".fg(Color::Yellow)
                ))
                .with_color(Color::Yellow),
        ),
        ParseError::Parsing { found, .. } => report.with_label(
            Label::new(span)
                .with_message(format!("Unexpected {}", found.fg(Color::Red)))
                .with_color(Color::Red),
        ),
        ParseError::Failed { .. } => report.with_label(
            Label::new(span)
                .with_message(format!("{}", "Input is not consumed past here".fg(Color::Red)))
                .with_color(Color::Red),
        ),
    }
    .finish()
}

fn report_parse_error(e: &ParseError, source: &[u8]) -> io::Result<()> {
    build_report(e, source).eprint(Source::from(String::from_utf8_lossy(source)))
}

fn run_file(path: &Path, options: Options) -> Result<ExitCode> {
    if !path.exists() {
        bail!("no file exist: {}", path.display());
    }
    let source =
        fs::read(path).with_context(|| format!("file open failed: {}", path.display()))?;
    let mut session = Session::new(options, Mode::Batch, io::stdout(), Keyboard);
    match session.run(&source) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(SessionError::Parse(e)) => {
            report_parse_error(&e, &source)?;
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

struct Interactive {
    session: Session<io::Stdout, Keyboard>,
}

impl repl::Repl for Interactive {
    type Error = SessionError;
    const HISTORY: Option<&'static str> = Some("/tmp/untyped-lambda.history");
    fn evaluate(&mut self, input: String) -> Result<(), Self::Error> {
        match self.session.run(input.as_bytes()) {
            Err(SessionError::Parse(e)) => Ok(report_parse_error(&e, input.as_bytes())?),
            result => result,
        }
    }
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let options = args.options();
    match &args.file {
        Some(path) => run_file(path, options),
        None => {
            let session = Session::new(options, Mode::Interactive, io::stdout(), Keyboard);
            repl::start_repl(Interactive { session })?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
