//! The `minify` command-line front end: argument parsing, file/stdin
//! reading, dispatch to the matching format entry point, and diagnostic
//! rendering. Every fallible internal step stays in the core's typed
//! `MinifyError`; `anyhow` only wraps things at this outer boundary.

use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;

use crate::css::minify_css;
use crate::error::{offset_to_line_col, MinifyError};
use crate::json::minify_json;
use crate::xml::{minify_html, minify_xml};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Css,
    Js,
    Xml,
    Html,
    Json,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "css" => Ok(Format::Css),
            "js" => Ok(Format::Js),
            "xml" => Ok(Format::Xml),
            "html" => Ok(Format::Html),
            "json" => Ok(Format::Json),
            other => Err(format!("unrecognized format `{other}` (expected css|js|xml|html|json)")),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Css => "css",
            Format::Js => "js",
            Format::Xml => "xml",
            Format::Html => "html",
            Format::Json => "json",
        };
        write!(f, "{name}")
    }
}

/// `minify <format> <path|-> [--benchmark]`
#[derive(Parser, Debug)]
#[command(name = "minify", about = "minify <format> <path|-> [--benchmark]")]
pub struct Cli {
    /// One of css, js, xml, html, json
    pub format: Format,

    /// Input file path, or `-` for standard input
    pub path: String,

    /// Print a size-reduction summary instead of the minified output
    #[arg(long)]
    pub benchmark: bool,
}

/// Reads the whole input up front — no bounded-memory streaming, per the
/// crate's resource policy.
pub fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read standard input")?;
        Ok(buf)
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read `{path}`"))
    }
}

/// Resolves a `MinifyError`'s byte offset against `input` and fills in
/// its message template, producing the single-line diagnostic printed
/// to standard error.
pub fn resolve_error(input: &str, err: MinifyError) -> String {
    let (line, column) = offset_to_line_col(input, err.offset);
    err.render(line, column)
}

fn dispatch(format: Format, input: &str) -> Result<String, MinifyError> {
    match format {
        Format::Css => minify_css(input),
        Format::Js => crate::js::minify_js(input),
        Format::Xml => minify_xml(input),
        Format::Html => minify_html(input),
        Format::Json => minify_json(input),
    }
}

pub fn run(cli: &Cli) -> Result<ExitCode> {
    let input = read_input(&cli.path)?;

    match dispatch(cli.format, &input) {
        Ok(minified) => {
            if cli.benchmark {
                let n = input.len();
                let m = minified.len();
                if n == 0 {
                    bail!("cannot benchmark an empty input");
                }
                let percent = 100.0 - 100.0 * (m as f64) / (n as f64);
                println!("Reduced the size by {percent:.1}% from {n} to {m} bytes");
            } else {
                print!("{minified}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("{}", resolve_error(&input, err));
            Ok(ExitCode::FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parses_all_five() {
        for (s, f) in [
            ("css", Format::Css),
            ("js", Format::Js),
            ("xml", Format::Xml),
            ("html", Format::Html),
            ("json", Format::Json),
        ] {
            assert_eq!(s.parse::<Format>().unwrap(), f);
        }
        assert!("yaml".parse::<Format>().is_err());
    }

    #[test]
    fn resolve_error_renders_line_and_column() {
        let input = "a\nb{";
        let err = MinifyError::new("Unexpected end of document, expected } in line %d, column %d", 3);
        assert_eq!(
            resolve_error(input, err),
            "Unexpected end of document, expected } in line 2, column 1"
        );
    }

    #[test]
    fn dispatch_runs_matching_minifier() {
        assert_eq!(dispatch(Format::Json, "[1,  2]").unwrap(), "[1,2]");
        assert_eq!(dispatch(Format::Css, "a  {  color : red ; }").unwrap(), "a{color:red}");
    }
}
