// timeline-tags: descriptive tags for historical and political event descriptions.
// Tags a single description, a batch of event records, or a directory of description files.
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use termcolor::{ColorChoice, StandardStream};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use walkdir::WalkDir;

mod nlp;
mod render;

use nlp::tags::{extract_tags, extract_tags_with_sources};
use nlp::vocabulary::CONTEXT_RULES;

const FORMAT_ENV: &str = "TIMELINE_TAGS_FORMAT";

#[derive(Parser)]
#[command(name = "timeline-tags", about = "Descriptive tags for historical and political events")]
struct Cli {
    /// Log at debug level (overrides RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Output format. Falls back to TIMELINE_TAGS_FORMAT, then text.
    #[arg(long, value_enum, global = true)]
    format: Option<OutputFormat>,
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    color: ColorMode,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Tag one description.
    Tag {
        #[arg(short, long, conflicts_with = "file", required_unless_present = "file")]
        text: Option<String>,
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Show which stage produced each tag.
        #[arg(long)]
        sources: bool,
    },
    /// Tag event records from a JSON array, NDJSON, or one-per-line text file.
    Batch {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Tag every description file under a directory.
    Dir {
        #[arg(short, long)]
        dir: PathBuf,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// List the context rules in priority order.
    Rules,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl From<ColorMode> for ColorChoice {
    fn from(mode: ColorMode) -> Self {
        match mode {
            ColorMode::Auto => ColorChoice::Auto,
            ColorMode::Always => ColorChoice::Always,
            ColorMode::Never => ColorChoice::Never,
        }
    }
}

#[derive(Deserialize, Debug)]
struct EventRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
struct TaggedEvent {
    id: Option<String>,
    description: String,
    tags: Vec<String>,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn resolve_format(flag: Option<OutputFormat>) -> Result<OutputFormat> {
    if let Some(format) = flag {
        return Ok(format);
    }
    match std::env::var(FORMAT_ENV) {
        Ok(value) => <OutputFormat as ValueEnum>::from_str(value.trim(), true)
            .map_err(|e| anyhow!("invalid {} value {:?}: {}", FORMAT_ENV, value, e)),
        Err(_) => Ok(OutputFormat::Text),
    }
}

fn read_text_file(p: &Path) -> Result<String> {
    let mut s = String::new();
    let mut f = File::open(p)?;
    f.read_to_string(&mut s)?;
    Ok(s)
}

fn read_file_content(p: &Path) -> Result<String> {
    let ext = p.extension().and_then(|s| s.to_str()).unwrap_or("");
    if ext == "pdf" {
        pdf_extract::extract_text(p).map_err(|e| anyhow!("PDF extraction failed: {}", e))
    } else {
        read_text_file(p)
    }
}

fn parse_ndjson(content: &str) -> Result<Vec<EventRecord>> {
    let mut records = Vec::new();
    for (n, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: EventRecord = serde_json::from_str(line)
            .map_err(|e| anyhow!("malformed record on line {}: {}", n + 1, e))?;
        records.push(record);
    }
    Ok(records)
}

fn parse_lines(content: &str) -> Vec<EventRecord> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| EventRecord {
            id: None,
            description: Some(l.to_string()),
        })
        .collect()
}

fn read_records(path: &Path) -> Result<Vec<EventRecord>> {
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
    let content = read_text_file(path)?;

    let records = match ext {
        "json" if content.trim_start().starts_with('[') => serde_json::from_str(&content)
            .map_err(|e| anyhow!("malformed JSON array in {}: {}", path.display(), e))?,
        "json" | "ndjson" | "jsonl" => parse_ndjson(&content)?,
        "txt" | "md" => parse_lines(&content),
        _ => return Err(anyhow!("Unsupported batch format: {}", ext)),
    };
    debug!(path = %path.display(), count = records.len(), "read event records");
    Ok(records)
}

fn progress_bar(len: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {wide_bar} {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );
    Ok(pb)
}

fn tag_records(records: &[EventRecord], pb: &ProgressBar) -> Vec<TaggedEvent> {
    records
        .par_iter()
        .map(|r| {
            let description = r.description.clone().unwrap_or_default();
            let tags = extract_tags(&description);
            pb.inc(1);
            TaggedEvent {
                id: r.id.clone(),
                description,
                tags,
            }
        })
        .collect()
}

fn collect_description_files(dir: &Path) -> Vec<PathBuf> {
    let allowed_exts = ["txt", "md", "pdf"];
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|s| s.to_str())
                .map(|ext| allowed_exts.contains(&ext))
                .unwrap_or(false)
        })
        .map(|e| e.path().to_path_buf())
        .collect();

    files.sort();
    files
}

fn tag_dir(dir: &Path, pb: &ProgressBar) -> Vec<TaggedEvent> {
    let files = collect_description_files(dir);
    pb.set_length(files.len() as u64);
    info!(dir = %dir.display(), files = files.len(), "tagging description files");

    files
        .par_iter()
        .filter_map(|p| {
            pb.inc(1);
            match read_file_content(p) {
                Ok(text) => {
                    let description = text.trim().to_string();
                    let tags = extract_tags(&description);
                    Some(TaggedEvent {
                        id: Some(p.to_string_lossy().to_string()),
                        description,
                        tags,
                    })
                }
                Err(e) => {
                    warn!(path = %p.display(), error = %e, "skipping unreadable file");
                    None
                }
            }
        })
        .collect()
}

fn write_events(
    events: &[TaggedEvent],
    out: Option<&Path>,
    format: OutputFormat,
    color: ColorMode,
) -> Result<()> {
    if let Some(path) = out {
        let fout = File::create(path)?;
        serde_json::to_writer_pretty(fout, events)?;
        println!("Wrote {} tagged events to {}", events.len(), path.display());
        return Ok(());
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(events)?),
        OutputFormat::Text => {
            let mut stdout = StandardStream::stdout(color.into());
            for (i, event) in events.iter().enumerate() {
                let fallback = format!("#{}", i + 1);
                let label = event.id.as_deref().unwrap_or(&fallback);
                render::write_labels(&mut stdout, Some(label), &event.tags)?;
            }
        }
    }
    Ok(())
}

fn run_tag(
    text: Option<String>,
    file: Option<PathBuf>,
    sources: bool,
    format: OutputFormat,
    color: ColorMode,
) -> Result<()> {
    let description = match (text, file) {
        (Some(text), _) => text,
        (None, Some(path)) => read_file_content(&path)?,
        (None, None) => return Err(anyhow!("either --text or --file is required")),
    };

    let tags = extract_tags_with_sources(&description);
    debug!(count = tags.len(), "extracted tags");

    match format {
        OutputFormat::Json if sources => println!("{}", serde_json::to_string_pretty(&tags)?),
        OutputFormat::Json => {
            let labels: Vec<&str> = tags.iter().map(|t| t.label.as_str()).collect();
            println!("{}", serde_json::to_string(&labels)?);
        }
        OutputFormat::Text => {
            let mut stdout = StandardStream::stdout(color.into());
            if sources {
                render::write_tags(&mut stdout, None, &tags)?;
            } else {
                let labels: Vec<String> = tags.into_iter().map(|t| t.label).collect();
                render::write_labels(&mut stdout, None, &labels)?;
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct RuleView<'a> {
    index: usize,
    tag: &'a str,
    pattern: &'a str,
}

fn run_rules(format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let rules: Vec<RuleView> = CONTEXT_RULES
                .iter()
                .enumerate()
                .map(|(i, r)| RuleView {
                    index: i + 1,
                    tag: r.tag,
                    pattern: r.pattern.as_str(),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rules)?);
        }
        OutputFormat::Text => render::write_rules(&mut io::stdout().lock(), &CONTEXT_RULES)?,
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let format = resolve_format(cli.format)?;

    match cli.command {
        Commands::Tag { text, file, sources } => run_tag(text, file, sources, format, cli.color)?,
        Commands::Batch { input, out } => {
            let records = read_records(&input)?;
            let pb = progress_bar(records.len())?;
            let events = tag_records(&records, &pb);
            pb.finish_with_message("tagging records");
            write_events(&events, out.as_deref(), format, cli.color)?;
        }
        Commands::Dir { dir, out } => {
            let pb = progress_bar(0)?;
            let events = tag_dir(&dir, &pb);
            pb.finish_with_message("tagging files");
            write_events(&events, out.as_deref(), format, cli.color)?;
        }
        Commands::Rules => run_rules(format)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parses_tag_command() {
        let cli = Cli::try_parse_from(["timeline-tags", "tag", "-t", "A coup happened.", "--sources"]).unwrap();
        match cli.command {
            Commands::Tag { text, file, sources } => {
                assert_eq!(text.as_deref(), Some("A coup happened."));
                assert!(file.is_none());
                assert!(sources);
            }
            _ => panic!("expected tag command"),
        }
    }

    #[test]
    fn test_cli_tag_requires_input() {
        assert!(Cli::try_parse_from(["timeline-tags", "tag"]).is_err());
        assert!(Cli::try_parse_from(["timeline-tags", "tag", "-t", "x", "-f", "y.txt"]).is_err());
    }

    #[test]
    fn test_cli_global_format_flag() {
        let cli = Cli::try_parse_from(["timeline-tags", "rules", "--format", "json"]).unwrap();
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert_eq!(cli.color, ColorMode::Auto);
    }

    #[test]
    fn test_resolve_format_prefers_flag() -> Result<()> {
        assert_eq!(resolve_format(Some(OutputFormat::Json))?, OutputFormat::Json);
        Ok(())
    }

    #[test]
    fn test_resolve_format_from_env() -> Result<()> {
        std::env::set_var(FORMAT_ENV, " JSON ");
        assert_eq!(resolve_format(None)?, OutputFormat::Json);

        std::env::set_var(FORMAT_ENV, "yaml");
        let err = resolve_format(None).unwrap_err();
        assert!(err.to_string().contains(FORMAT_ENV));

        std::env::remove_var(FORMAT_ENV);
        assert_eq!(resolve_format(None)?, OutputFormat::Text);
        Ok(())
    }

    #[test]
    fn test_read_text_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let file_path = temp_dir.path().join("event.txt");
        let mut file = File::create(&file_path)?;
        writeln!(file, "The army seized the capital.")?;

        let content = read_file_content(&file_path)?;
        assert_eq!(content, "The army seized the capital.\n");
        Ok(())
    }

    #[test]
    fn test_read_records_json_array() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("events.json");
        std::fs::write(
            &path,
            r#"[{"id": "e1", "description": "A peace treaty was signed yesterday."},
                {"id": "e2", "description": null},
                {"id": "e3"}]"#,
        )?;

        let records = read_records(&path)?;
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].id.as_deref(), Some("e1"));
        assert!(records[1].description.is_none());
        assert!(records[2].description.is_none());
        Ok(())
    }

    #[test]
    fn test_read_records_ndjson_skips_blank_lines() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("events.jsonl");
        std::fs::write(
            &path,
            "{\"id\": \"a\", \"description\": \"The king abdicated.\"}\n\n{\"id\": \"b\", \"description\": \"Flood.\"}\n",
        )?;

        let records = read_records(&path)?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id.as_deref(), Some("b"));
        Ok(())
    }

    #[test]
    fn test_read_records_ndjson_reports_line() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("events.ndjson");
        std::fs::write(&path, "{\"id\": \"a\"}\nnot json\n")?;

        let err = read_records(&path).unwrap_err();
        assert!(err.to_string().contains("line 2"));
        Ok(())
    }

    #[test]
    fn test_read_records_plain_lines() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("events.txt");
        std::fs::write(&path, "The president resigned.\n\n   \nA big flood.\n")?;

        let records = read_records(&path)?;
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.id.is_none()));
        assert_eq!(records[1].description.as_deref(), Some("A big flood."));
        Ok(())
    }

    #[test]
    fn test_read_records_unsupported_extension() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("events.csv");
        std::fs::write(&path, "id,description\n")?;

        assert!(read_records(&path).is_err());
        Ok(())
    }

    #[test]
    fn test_tag_records_preserves_order_and_handles_missing() {
        let records = vec![
            EventRecord {
                id: Some("1".into()),
                description: Some("A peace treaty was signed yesterday.".into()),
            },
            EventRecord {
                id: Some("2".into()),
                description: None,
            },
            EventRecord {
                id: Some("3".into()),
                description: Some("The cat sat on the mat for a while.".into()),
            },
        ];

        let events = tag_records(&records, &ProgressBar::hidden());
        let ids: Vec<&str> = events.iter().filter_map(|e| e.id.as_deref()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(events[0].tags, vec!["peace treaty", "treaty signed"]);
        assert!(events[1].tags.is_empty());
        assert_eq!(events[1].description, "");
        assert_eq!(events[2].tags, vec!["historical event"]);
    }

    #[test]
    fn test_collect_description_files_filters_and_sorts() -> Result<()> {
        let dir = TempDir::new()?;
        std::fs::create_dir(dir.path().join("nested"))?;
        std::fs::write(dir.path().join("b.txt"), "second")?;
        std::fs::write(dir.path().join("a.md"), "first")?;
        std::fs::write(dir.path().join("nested").join("c.txt"), "third")?;
        std::fs::write(dir.path().join("image.png"), [0u8, 1, 2])?;

        let files = collect_description_files(dir.path());
        assert_eq!(files.len(), 3);
        assert!(files[0].ends_with("a.md"));
        assert!(files[1].ends_with("b.txt"));
        assert!(files[2].ends_with("nested/c.txt"));
        Ok(())
    }

    #[test]
    fn test_tag_dir() -> Result<()> {
        let dir = TempDir::new()?;
        std::fs::write(
            dir.path().join("1918.txt"),
            "The king abdicated and the parliament was dissolved.\n",
        )?;
        std::fs::write(dir.path().join("short.txt"), "war")?;

        let events = tag_dir(dir.path(), &ProgressBar::hidden());
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0].tags,
            vec!["leader resigned", "parliament dissolved", "king abdicated"]
        );
        assert_eq!(events[0].description, "The king abdicated and the parliament was dissolved.");
        assert!(events[1].tags.is_empty());
        Ok(())
    }

    #[test]
    fn test_write_events_to_file() -> Result<()> {
        let dir = TempDir::new()?;
        let out = dir.path().join("tagged.json");
        let events = vec![TaggedEvent {
            id: Some("e1".into()),
            description: "A big flood.".into(),
            tags: vec!["flood".into()],
        }];

        write_events(&events, Some(&out), OutputFormat::Text, ColorMode::Never)?;

        let f = File::open(&out)?;
        let back: Vec<TaggedEvent> = serde_json::from_reader(f)?;
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].tags, vec!["flood"]);
        Ok(())
    }

    #[test]
    fn test_tagged_event_serialization() {
        let event = TaggedEvent {
            id: None,
            description: "The president resigned.".into(),
            tags: vec!["leader resigned".into()],
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"id":null,"description":"The president resigned.","tags":["leader resigned"]}"#
        );
    }
}
