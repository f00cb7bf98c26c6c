use schemaviz::ddl::{KeywordCase, ParserOptions, RegexDdlParser};
use schemaviz::interaction::Zoom;
use schemaviz::layout::Viewport;
use schemaviz::render_schema;
use schemaviz::schema::Schema;
use std::env;
use std::fs;
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("Missing value for {0}")]
    MissingValue(String),
    #[error("Invalid number for {flag}: {value}")]
    InvalidNumber { flag: String, value: String },
    #[error("Unknown option: {0}")]
    UnknownOption(String),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to encode schema: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Svg,
    Json,
    Ddl,
}

struct Options {
    input: String,
    output: Option<String>,
    viewport: Viewport,
    zoom: Zoom,
    format: Output,
    keyword_case: KeywordCase,
}

fn usage(program: &str) {
    eprintln!("Usage: {} <input.sql> [options]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -o, --output <file>   Output file (default: stdout)");
    eprintln!("  -w, --width <px>      Diagram width (default: 1200)");
    eprintln!("  -H, --height <px>     Diagram height (default: 800)");
    eprintln!("  -z, --zoom <scale>    Zoom between 0.5 and 2.0 (default: 1.0)");
    eprintln!("      --json            Print the parsed schema as JSON");
    eprintln!("      --ddl             Print DDL regenerated from the parsed tables");
    eprintln!("      --ignore-case     Match SQL keywords in any case");
}

fn number(flag: &str, value: Option<&String>) -> Result<f64, CliError> {
    let value = value.ok_or_else(|| CliError::MissingValue(flag.to_string()))?;
    value.parse().map_err(|_| CliError::InvalidNumber {
        flag: flag.to_string(),
        value: value.clone(),
    })
}

fn parse_args(args: &[String]) -> Result<Options, CliError> {
    let mut options = Options {
        input: args[1].clone(),
        output: None,
        viewport: Viewport::default(),
        zoom: Zoom::default(),
        format: Output::Svg,
        keyword_case: KeywordCase::Sensitive,
    };

    let mut i = 2;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "-o" | "--output" => {
                i += 1;
                let path = args
                    .get(i)
                    .ok_or_else(|| CliError::MissingValue(flag.to_string()))?;
                options.output = Some(path.clone());
            }
            "-w" | "--width" => {
                i += 1;
                options.viewport.width = number(flag, args.get(i))?;
            }
            "-H" | "--height" => {
                i += 1;
                options.viewport.height = number(flag, args.get(i))?;
            }
            "-z" | "--zoom" => {
                i += 1;
                options.zoom = Zoom::from_scale(number(flag, args.get(i))?);
            }
            "--json" => options.format = Output::Json,
            "--ddl" => options.format = Output::Ddl,
            "--ignore-case" => options.keyword_case = KeywordCase::Insensitive,
            _ => return Err(CliError::UnknownOption(flag.to_string())),
        }
        i += 1;
    }

    Ok(options)
}

fn run(options: &Options) -> Result<(), CliError> {
    let ddl = fs::read_to_string(&options.input).map_err(|source| CliError::Read {
        path: options.input.clone(),
        source,
    })?;

    let parser = RegexDdlParser::new(ParserOptions {
        keyword_case: options.keyword_case,
    });
    let name = Path::new(&options.input)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let schema = Schema::from_ddl(name, "", ddl, &parser);

    if schema.tables.is_empty() {
        tracing::warn!(input = %options.input, "no CREATE TABLE statements recognised");
    }

    let rendered = match options.format {
        Output::Svg => render_schema(&schema, options.viewport, options.zoom),
        Output::Json => serde_json::to_string_pretty(&schema)? + "\n",
        Output::Ddl => schema.to_ddl(),
    };

    match &options.output {
        Some(path) => fs::write(path, &rendered).map_err(|source| CliError::Write {
            path: path.clone(),
            source,
        })?,
        None => print!("{}", rendered),
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        usage(args.first().map(String::as_str).unwrap_or("schemaviz"));
        process::exit(1);
    }

    let options = match parse_args(&args) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(&options) {
        eprintln!("{}", e);
        process::exit(1);
    }
}
