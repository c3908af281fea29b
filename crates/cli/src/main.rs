// ABOUTME: CLI for converting editor HTML into Gutenberg block markup with docpress-core.
// ABOUTME: Reads a file or stdin, applies an optional JSON config, prints blocks or a JSON envelope.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use docpress_core::{convert_named, Config, Conversion, Mode, OutputFormat};

/// Convert messy editor HTML (Google Docs, Word) into WordPress Gutenberg blocks.
#[derive(Parser, Debug)]
#[command(name = "docpress")]
#[command(about = "Convert HTML to Gutenberg block markup", long_about = None)]
struct Args {
    /// Input HTML file. Use "-" to read from stdin.
    input: String,

    /// JSON configuration file.
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Write block markup here instead of stdout.
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Write the conversion report (JSON) to this file.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Print a JSON envelope with markup and report instead of raw markup.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Strict mode: policy failures mark the conversion unsuccessful.
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// Inline <style> rules onto elements before cleaning.
    #[arg(long, default_value_t = false)]
    inline_styles: bool,

    /// Keep class attributes through style inlining.
    #[arg(long, default_value_t = false)]
    keep_classes: bool,

    /// Print execution time to stderr.
    #[arg(long, default_value_t = false)]
    timing: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let (conversion, as_json) = run(&args);
    let failed = !conversion.report.success;

    if let Err(err) = emit(&args, &conversion, as_json) {
        eprintln!("docpress: {err:#}");
        return ExitCode::FAILURE;
    }
    if args.timing {
        eprintln!("docpress: {} ms", conversion.report.execution_time_ms);
    }
    if failed {
        for error in &conversion.report.errors {
            eprintln!("docpress: {error}");
        }
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// Runs the conversion and reports whether output should be the JSON
/// envelope (config `outputFormat`, overridable by `--json`).
fn run(args: &Args) -> (Conversion, bool) {
    log::debug!("converting {}", args.input);

    let mut config = match &args.config {
        Some(path) => {
            let text = match fs::read_to_string(path) {
                Ok(text) => text,
                Err(err) => {
                    return (
                        Conversion::failure(format!("read {}: {err}", path.display())),
                        args.json,
                    )
                }
            };
            match Config::from_json(&text) {
                Ok(config) => config,
                Err(err) => return (Conversion::failure(err.to_string()), args.json),
            }
        }
        None => Config::default(),
    };

    // Flags layer on top of the config file.
    if args.strict {
        config.mode = Mode::Strict;
    }
    if args.inline_styles {
        config.inline_styles = true;
    }
    if args.keep_classes {
        config.keep_classes = true;
    }
    if args.json {
        config.output_format = OutputFormat::Json;
    }
    let as_json = config.output_format == OutputFormat::Json;

    let html = match load_input(&args.input) {
        Ok(html) => html,
        Err(err) => {
            return (
                Conversion::failure(format!("read {}: {err:#}", args.input)),
                as_json,
            )
        }
    };

    let input_name = if args.input == "-" {
        None
    } else {
        Some(args.input.as_str())
    };
    let output_name = args.output.as_ref().and_then(|p| p.to_str());
    (convert_named(&html, &config, input_name, output_name), as_json)
}

fn load_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn emit(args: &Args, conversion: &Conversion, as_json: bool) -> anyhow::Result<()> {
    let payload = if as_json {
        serde_json::to_string_pretty(conversion)?
    } else {
        conversion.html.clone()
    };

    match &args.output {
        Some(path) => fs::write(path, payload)?,
        None => println!("{payload}"),
    }

    if let Some(path) = &args.report {
        fs::write(path, serde_json::to_string_pretty(&conversion.report)?)?;
    }
    Ok(())
}
