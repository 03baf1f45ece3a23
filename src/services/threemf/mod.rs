//! Print-settings metadata extraction from 3MF project archives.
//!
//! A 3MF file is a ZIP container. Orca-flavored projects carry two
//! optional metadata entries this module understands:
//! - `Metadata/slice_info.config` — present once the project has been
//!   sliced; freeform text that may embed a time estimate.
//! - `Metadata/Orca_print.config` — XML with `<option key="...">` elements
//!   holding print settings.
//!
//! Only a missing file, a wrong extension or an unreadable ZIP container
//! is fatal. Everything inside a readable archive degrades to a sink
//! warning and a `None` field, including malformed XML.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use crate::logging::DiagnosticSink;
use crate::services::slicer::{format, time_parse};
use crate::types::errors::{SliceError, SliceResult};
use crate::types::metrics::PrintMetadata;

const SLICE_INFO_ENTRY: &str = "Metadata/slice_info.config";
const PRINT_CONFIG_ENTRY: &str = "Metadata/Orca_print.config";

pub struct MetadataExtractor<'a> {
    sink: &'a dyn DiagnosticSink,
}

impl<'a> MetadataExtractor<'a> {
    pub fn new(sink: &'a dyn DiagnosticSink) -> Self {
        Self { sink }
    }

    /// Extract print settings and slice history from a .3mf archive.
    ///
    /// Deterministic: the same archive bytes always yield the same record.
    pub fn extract(&self, file_path: &Path) -> SliceResult<PrintMetadata> {
        if !file_path.exists() {
            return Err(SliceError::NotFound(format!(
                "File not found: {}",
                file_path.display()
            )));
        }

        let is_3mf = file_path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("3mf"));
        if !is_3mf {
            return Err(SliceError::InvalidFormat(format!(
                "File is not a .3mf file: {}",
                file_path.display()
            )));
        }

        let file = File::open(file_path).map_err(|e| {
            SliceError::InvalidFormat(format!(
                "Failed to open {}: {e}",
                file_path.display()
            ))
        })?;
        let mut archive = ZipArchive::new(file).map_err(|e| {
            SliceError::InvalidFormat(format!(
                "File is not a valid .3mf archive: {} ({e})",
                file_path.display()
            ))
        })?;

        let mut metadata = PrintMetadata::default();

        if let Ok(mut entry) = archive.by_name(SLICE_INFO_ENTRY) {
            metadata.previously_sliced = true;

            let mut raw = Vec::new();
            match entry.read_to_end(&mut raw) {
                Ok(_) => match String::from_utf8(raw) {
                    Ok(text) => metadata.last_estimate = last_estimate_from_slice_info(&text),
                    Err(e) => self
                        .sink
                        .warn(&format!("Could not parse {SLICE_INFO_ENTRY}: {e}")),
                },
                Err(e) => self
                    .sink
                    .warn(&format!("Could not read {SLICE_INFO_ENTRY}: {e}")),
            }
        }

        match archive.by_name(PRINT_CONFIG_ENTRY) {
            Ok(mut entry) => {
                let mut xml = String::new();
                match entry.read_to_string(&mut xml) {
                    Ok(_) => match parse_print_config(&xml) {
                        Ok(options) => {
                            for (key, value) in &options {
                                apply_option(&mut metadata, key, value);
                            }
                        }
                        Err(e) => self
                            .sink
                            .warn(&format!("Could not parse {PRINT_CONFIG_ENTRY} XML: {e}")),
                    },
                    Err(e) => self
                        .sink
                        .warn(&format!("Error reading {PRINT_CONFIG_ENTRY}: {e}")),
                }
            }
            Err(_) => self
                .sink
                .warn(&format!("{PRINT_CONFIG_ENTRY} not found in .3mf file")),
        }

        Ok(metadata)
    }
}

/// First line with a time-like token that parses wins.
fn last_estimate_from_slice_info(text: &str) -> Option<String> {
    text.lines()
        .filter(|line| line.to_lowercase().contains("time"))
        .find_map(time_parse::parse_time_estimate)
        .map(format::format_duration)
}

/// Collect `(key, value)` pairs from `<option key="...">value</option>`
/// elements. Parsed fully before any field is applied, so malformed XML
/// can never leave a half-populated record.
fn parse_print_config(xml: &str) -> Result<Vec<(String, String)>, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut options = Vec::new();
    let mut current_key: Option<String> = None;
    let mut current_value = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"option" => {
                current_key = option_key(e)?;
                current_value.clear();
            }
            Ok(Event::Empty(ref e)) if e.local_name().as_ref() == b"option" => {
                if let Some(key) = option_key(e)? {
                    options.push((key, String::new()));
                }
            }
            Ok(Event::Text(ref t)) if current_key.is_some() => {
                let text = t.unescape().map_err(|e| e.to_string())?;
                current_value.push_str(&text);
            }
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"option" => {
                if let Some(key) = current_key.take() {
                    options.push((key, std::mem::take(&mut current_value)));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.to_string()),
            _ => {}
        }
        buf.clear();
    }

    Ok(options)
}

fn option_key(element: &quick_xml::events::BytesStart<'_>) -> Result<Option<String>, String> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        if attr.key.as_ref() == b"key" {
            let value = attr.unescape_value().map_err(|e| e.to_string())?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Apply one whitelisted option to the record. Unknown keys are ignored;
/// unparsable values leave the field `None`.
fn apply_option(metadata: &mut PrintMetadata, key: &str, value: &str) {
    match key {
        "filament_type" => {
            metadata.filament_type = (!value.is_empty()).then(|| value.to_string());
        }
        "nozzle_diameter" => {
            metadata.nozzle_diameter = (!value.is_empty()).then(|| format!("{value}mm"));
        }
        "layer_height" => {
            metadata.layer_height = (!value.is_empty()).then(|| format!("{value}mm"));
        }
        "sparse_infill_density" => {
            // Zero is a valid density, not absence.
            metadata.infill_density = value
                .parse::<f64>()
                .ok()
                .map(format::format_percentage);
        }
        "wall_loops" => {
            metadata.wall_loops = value.parse::<u32>().ok();
        }
        "support_enable" => {
            // Key present always yields Some; only key absence is None.
            let enabled = matches!(value.to_lowercase().as_str(), "true" | "1" | "yes");
            metadata.support_enabled = Some(enabled);
        }
        _ => {}
    }
}

#[cfg(test)]
#[path = "tests/metadata_tests.rs"]
mod tests;
