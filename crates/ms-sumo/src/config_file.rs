//! Rewriting the route-file and emission-output paths of a `.sumocfg`.
//!
//! # What is changed
//!
//! | Element                             | Action                                    |
//! |-------------------------------------|-------------------------------------------|
//! | every `<route-files>`               | `value` set to the new route file          |
//! | first `<emission-output>` inside the first `<processing>` | `value` set |
//!
//! Missing pieces are created: `<route-files>` goes into the first `<input>`
//! section (an `<input>` section is appended to the root if there is none),
//! `<emission-output>` into the first `<processing>` section (likewise
//! appended if absent).
//!
//! With [`ConfigPatch::relative_to`], relative paths in the other file-valued
//! options (`net-file`, `additional-files`, any `*-file` / `*-files`) are
//! resolved against the given directory, so the patched copy can be written
//! somewhere other than next to the original.  Output options stay relative
//! to wherever the copy lives.
//!
//! Everything else (other sections, comments, whitespace, attribute order)
//! is copied through unchanged.  The rewrite is deterministic and a fixed
//! point: applying it to its own output reproduces that output byte for byte.

use std::path::{Path, PathBuf};

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::{SumoError, SumoResult};

/// The two paths written into a SUMO configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigPatch {
    pub route_files:     String,
    pub emission_output: String,
    /// Directory relative input paths of the original are resolved against.
    pub base_dir:        Option<PathBuf>,
}

/// What the document already contains, collected before rewriting.
#[derive(Default)]
struct Survey {
    has_route_files: bool,
    has_input:       bool,
    has_processing:  bool,
    /// Whether the *first* `<processing>` already holds an `<emission-output>`.
    has_emission:    bool,
}

/// Tracks one section (`input` / `processing`) while streaming: only the
/// first occurrence in document order is ever patched.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    NotSeen,
    /// Open; holds the depth of its start tag.
    Open(usize),
    Closed,
}

impl ConfigPatch {
    pub fn new(route_files: impl Into<String>, emission_output: impl Into<String>) -> Self {
        Self {
            route_files:     route_files.into(),
            emission_output: emission_output.into(),
            base_dir:        None,
        }
    }

    /// Resolve relative `*-file` / `*-files` values against `dir`, normally
    /// the directory of the configuration being copied.  Pass an absolute
    /// directory to keep the rewrite a fixed point.
    pub fn relative_to(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Apply the patch to an in-memory document.
    pub fn apply(&self, xml: &str) -> SumoResult<String> {
        let survey = survey(xml)?;

        let mut reader = Reader::from_str(xml);
        let mut writer = Writer::new(Vec::new());

        let mut depth = 0usize;
        let mut saw_root = false;
        let mut input = Section::NotSeen;
        let mut processing = Section::NotSeen;
        let mut emission_done = false;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    saw_root = true;
                    let name = e.name().as_ref().to_vec();
                    match name.as_slice() {
                        b"route-files" => {
                            writer.write_event(Event::Start(with_value(&e, &self.route_files)?))?;
                        }
                        b"emission-output"
                            if matches!(processing, Section::Open(_)) && !emission_done =>
                        {
                            emission_done = true;
                            writer.write_event(Event::Start(with_value(&e, &self.emission_output)?))?;
                        }
                        b"input" if input == Section::NotSeen => {
                            input = Section::Open(depth);
                            writer.write_event(Event::Start(e))?;
                        }
                        b"processing" if processing == Section::NotSeen => {
                            processing = Section::Open(depth);
                            writer.write_event(Event::Start(e))?;
                        }
                        _ => writer.write_event(Event::Start(self.rebased(e)?))?,
                    }
                    depth += 1;
                }

                Event::Empty(e) => {
                    let name = e.name().as_ref().to_vec();
                    match name.as_slice() {
                        _ if depth == 0 => {
                            // `<configuration/>`: expand so sections can be added.
                            saw_root = true;
                            let end = BytesEnd::new(element_name(&e));
                            writer.write_event(Event::Start(e))?;
                            self.append_missing_sections(&mut writer, &survey)?;
                            writer.write_event(Event::End(end))?;
                        }
                        b"route-files" => {
                            writer.write_event(Event::Empty(with_value(&e, &self.route_files)?))?;
                        }
                        b"emission-output"
                            if matches!(processing, Section::Open(_)) && !emission_done =>
                        {
                            emission_done = true;
                            writer.write_event(Event::Empty(with_value(&e, &self.emission_output)?))?;
                        }
                        b"input" if input == Section::NotSeen => {
                            input = Section::Closed;
                            if survey.has_route_files {
                                writer.write_event(Event::Empty(e))?;
                            } else {
                                let end = BytesEnd::new(element_name(&e));
                                writer.write_event(Event::Start(e))?;
                                writer.write_event(Event::Empty(value_element("route-files", &self.route_files)))?;
                                writer.write_event(Event::End(end))?;
                            }
                        }
                        b"processing" if processing == Section::NotSeen => {
                            processing = Section::Closed;
                            let end = BytesEnd::new(element_name(&e));
                            writer.write_event(Event::Start(e))?;
                            writer.write_event(Event::Empty(value_element(
                                "emission-output",
                                &self.emission_output,
                            )))?;
                            writer.write_event(Event::End(end))?;
                        }
                        _ => writer.write_event(Event::Empty(self.rebased(e)?))?,
                    }
                }

                Event::End(e) => {
                    depth = depth.saturating_sub(1);
                    if input == Section::Open(depth) {
                        input = Section::Closed;
                        if !survey.has_route_files {
                            writer.write_event(Event::Empty(value_element("route-files", &self.route_files)))?;
                        }
                    }
                    if processing == Section::Open(depth) {
                        processing = Section::Closed;
                        if !survey.has_emission {
                            writer.write_event(Event::Empty(value_element(
                                "emission-output",
                                &self.emission_output,
                            )))?;
                        }
                    }
                    if depth == 0 {
                        self.append_missing_sections(&mut writer, &survey)?;
                    }
                    writer.write_event(Event::End(e))?;
                }

                Event::Eof => break,
                other => writer.write_event(other)?,
            }
        }

        if !saw_root {
            return Err(SumoError::Document("no root element".to_owned()));
        }
        Ok(String::from_utf8(writer.into_inner())?)
    }

    /// Read `input`, apply the patch, write `output` (which may be `input`).
    pub fn apply_file(&self, input: &Path, output: &Path) -> SumoResult<()> {
        let xml = std::fs::read_to_string(input).map_err(|source| SumoError::File {
            path: input.to_path_buf(),
            source,
        })?;
        let patched = self.apply(&xml)?;
        std::fs::write(output, patched).map_err(|source| SumoError::File {
            path: output.to_path_buf(),
            source,
        })?;
        log::debug!(
            "{} → {} (route-files={}, emission-output={})",
            input.display(),
            output.display(),
            self.route_files,
            self.emission_output
        );
        Ok(())
    }

    /// `e` with a relative file-valued `value` resolved against `base_dir`.
    fn rebased<'a>(&self, e: BytesStart<'a>) -> SumoResult<BytesStart<'a>> {
        let Some(dir) = &self.base_dir else {
            return Ok(e);
        };
        if !is_file_option(e.name().as_ref()) {
            return Ok(e);
        }
        let value = match e.try_get_attribute("value")? {
            Some(attr) => Some(attr.unescape_value()?.into_owned()),
            None => None,
        };
        let Some(value) = value else {
            return Ok(e);
        };
        let resolved = resolve_paths(&value, dir);
        if resolved == value {
            return Ok(e);
        }
        with_value(&e, &resolved)
    }

    /// Sections the root lacks entirely, appended just before it closes.
    fn append_missing_sections(&self, writer: &mut Writer<Vec<u8>>, survey: &Survey) -> SumoResult<()> {
        if !survey.has_input && !survey.has_route_files {
            writer.write_event(Event::Start(BytesStart::new("input")))?;
            writer.write_event(Event::Empty(value_element("route-files", &self.route_files)))?;
            writer.write_event(Event::End(BytesEnd::new("input")))?;
        }
        if !survey.has_processing {
            writer.write_event(Event::Start(BytesStart::new("processing")))?;
            writer.write_event(Event::Empty(value_element("emission-output", &self.emission_output)))?;
            writer.write_event(Event::End(BytesEnd::new("processing")))?;
        }
        Ok(())
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn survey(xml: &str) -> SumoResult<Survey> {
    let mut reader = Reader::from_str(xml);
    let mut survey = Survey::default();
    let mut depth = 0usize;
    let mut processing = Section::NotSeen;

    loop {
        let (e, is_start) = match reader.read_event()? {
            Event::Start(e) => (e, true),
            Event::Empty(e) => (e, false),
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if processing == Section::Open(depth) {
                    processing = Section::Closed;
                }
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };

        match e.name().as_ref() {
            b"route-files" => survey.has_route_files = true,
            b"input" => survey.has_input = true,
            b"processing" => {
                if processing == Section::NotSeen {
                    processing = if is_start { Section::Open(depth) } else { Section::Closed };
                }
                survey.has_processing = true;
            }
            b"emission-output" if matches!(processing, Section::Open(_)) => {
                survey.has_emission = true;
            }
            _ => {}
        }
        if is_start {
            depth += 1;
        }
    }
    Ok(survey)
}

/// SUMO names every option that takes input files `*-file` or `*-files`.
fn is_file_option(name: &[u8]) -> bool {
    name.ends_with(b"-file") || name.ends_with(b"-files")
}

/// Join each relative entry of a comma-separated path list onto `dir`.
fn resolve_paths(value: &str, dir: &Path) -> String {
    value
        .split(',')
        .map(|item| {
            let item = item.trim();
            if item.is_empty() || Path::new(item).is_absolute() {
                item.to_owned()
            } else {
                dir.join(item).to_string_lossy().into_owned()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn value_element<'a>(name: &'a str, value: &'a str) -> BytesStart<'a> {
    let mut e = BytesStart::new(name);
    e.push_attribute(("value", value));
    e
}

/// Copy of `e` with its `value` attribute replaced (or appended).
fn with_value(e: &BytesStart<'_>, value: &str) -> SumoResult<BytesStart<'static>> {
    let mut out = BytesStart::new(element_name(e));
    let mut replaced = false;
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"value" {
            out.push_attribute(("value", value));
            replaced = true;
        } else {
            out.push_attribute(attr);
        }
    }
    if !replaced {
        out.push_attribute(("value", value));
    }
    Ok(out)
}
