// Terminal rendering of tags as colored badges.
use std::io::{self, Write};

use termcolor::{Color, ColorSpec, WriteColor};

use crate::nlp::tags::{ExtractedTag, TagSource};
use crate::nlp::vocabulary::ContextRule;

fn source_color(source: TagSource) -> Color {
    match source {
        TagSource::Phrase => Color::Magenta,
        TagSource::Pattern => Color::Cyan,
        TagSource::Keyword => Color::Green,
        TagSource::SignificantWords => Color::Yellow,
        TagSource::Default => Color::White,
    }
}

fn write_badge<W: WriteColor>(out: &mut W, label: &str, color: Color) -> io::Result<()> {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(color)).set_bold(true);
    out.set_color(&spec)?;
    write!(out, "[{}]", label)?;
    out.reset()
}

fn write_prefix<W: WriteColor>(out: &mut W, prefix: Option<&str>) -> io::Result<()> {
    if let Some(prefix) = prefix {
        write!(out, "{}: ", prefix)?;
    }
    Ok(())
}

/// One line of badges, colored by the stage each tag came from.
pub fn write_tags<W: WriteColor>(
    out: &mut W,
    prefix: Option<&str>,
    tags: &[ExtractedTag],
) -> io::Result<()> {
    write_prefix(out, prefix)?;
    if tags.is_empty() {
        return writeln!(out, "(no tags)");
    }
    for (i, tag) in tags.iter().enumerate() {
        if i > 0 {
            write!(out, " ")?;
        }
        write_badge(out, &tag.label, source_color(tag.source))?;
    }
    writeln!(out)
}

pub fn write_labels<W: WriteColor>(
    out: &mut W,
    prefix: Option<&str>,
    labels: &[String],
) -> io::Result<()> {
    write_prefix(out, prefix)?;
    if labels.is_empty() {
        return writeln!(out, "(no tags)");
    }
    for (i, label) in labels.iter().enumerate() {
        if i > 0 {
            write!(out, " ")?;
        }
        write_badge(out, label, Color::Cyan)?;
    }
    writeln!(out)
}

pub fn write_rules<W: Write>(out: &mut W, rules: &[ContextRule]) -> io::Result<()> {
    for (i, rule) in rules.iter().enumerate() {
        writeln!(out, "{:>2}. {:<24} {}", i + 1, rule.tag, rule.pattern.as_str())?;
    }
    Ok(())
}
