//! fb2 - Assemble a FictionBook file from markup sections

use std::process::ExitCode;

use clap::Parser;

use fictionbook::util::decode_markup;
use fictionbook::{Author, Document};

#[derive(Parser)]
#[command(name = "fb2")]
#[command(version, about = "Assemble a FictionBook (FB2) file", long_about = None)]
#[command(after_help = "EXAMPLES:
    fb2 -t \"My Book\" -a \"Jane Doe\" -s \"Chapter 1=ch1.xml\" book.fb2
    fb2 -t \"My Book\" --cover https://example.com/c.jpg -s \"One=1.xml\" -s \"Two=2.xml\" out.fb2")]
struct Cli {
    /// Output file
    #[arg(value_name = "OUTPUT")]
    output: String,

    /// Book title
    #[arg(short, long)]
    title: String,

    /// Author as "First Last" (repeatable)
    #[arg(short, long = "author")]
    authors: Vec<String>,

    /// Language code, e.g. "en"
    #[arg(short, long)]
    lang: Option<String>,

    /// Genre code (repeatable)
    #[arg(short, long = "genre")]
    genres: Vec<String>,

    /// Series as "Name:Number"
    #[arg(long)]
    sequence: Option<String>,

    /// Cover image path or URL
    #[arg(long)]
    cover: Option<String>,

    /// Annotation text or markup
    #[arg(short, long)]
    description: Option<String>,

    /// Stylesheet href (repeatable, type text/css)
    #[arg(long = "css")]
    stylesheets: Vec<String>,

    /// Section as "Heading=FILE" (repeatable, in reading order)
    #[arg(short, long = "section")]
    sections: Vec<String>,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match build(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn build(cli: &Cli) -> Result<(), String> {
    let doc = Document::new(&cli.title);

    for name in &cli.authors {
        doc.set_author(Author::from_display_name(name));
    }
    if let Some(ref lang) = cli.lang {
        doc.set_lang(lang);
    }
    if !cli.genres.is_empty() {
        doc.set_genres(cli.genres.iter().cloned());
    }
    if let Some(ref sequence) = cli.sequence {
        let (name, number) = parse_sequence(sequence)?;
        doc.set_sequence(name, number);
    }
    for href in &cli.stylesheets {
        doc.add_stylesheet("text/css", href);
    }
    if let Some(ref description) = cli.description {
        doc.set_description(description).map_err(|e| e.to_string())?;
    }
    if let Some(ref cover) = cli.cover {
        doc.set_cover(cover).map_err(|e| e.to_string())?;
    }

    for entry in &cli.sections {
        let (heading, path) = entry
            .split_once('=')
            .ok_or_else(|| format!("section '{entry}' must look like Heading=FILE"))?;
        let bytes = std::fs::read(path).map_err(|e| format!("{path}: {e}"))?;
        let markup = decode_markup(&bytes);
        doc.add_section(&markup, heading)
            .map_err(|e| format!("{path}: {e}"))?;
    }

    doc.write_to_file(&cli.output).map_err(|e| e.to_string())?;

    if !cli.quiet {
        println!("Wrote {} ({} section(s))", cli.output, cli.sections.len());
    }
    Ok(())
}

fn parse_sequence(value: &str) -> Result<(&str, u32), String> {
    let (name, number) = value
        .rsplit_once(':')
        .ok_or_else(|| format!("sequence '{value}' must look like Name:Number"))?;
    let number = number
        .trim()
        .parse()
        .map_err(|_| format!("invalid sequence number in '{value}'"))?;
    Ok((name.trim(), number))
}
