//! XLSX fill reader: resolves each styled cell's fill foreground colour from
//! styles.xml and the per-cell style IDs in worksheet XML.
//!
//! calamine reads values only, so fills are taken straight from the ZIP
//! archive. Colours are reported the way spreadsheet tooling reports a fill's
//! start colour: an ARGB string, a palette index, or a theme slot.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;
use tracing::{debug, warn};
use worksync_recon::model::FillColor;
use zip::ZipArchive;

use crate::error::IoError;

// =============================================================================
// Public types
// =============================================================================

/// Fill colours of one sheet, keyed by 1-based (row, column).
pub type SheetFills = HashMap<(u32, u32), FillColor>;

/// cellXfs index → fill colour.
#[derive(Debug, Default)]
pub struct FillTable {
    fills: Vec<FillColor>,
    xf_fill_ids: Vec<usize>,
}

impl FillTable {
    /// Fill of cell style `style_id`; unknown styles and fills have no fill.
    pub fn fill_for_style(&self, style_id: usize) -> FillColor {
        self.xf_fill_ids
            .get(style_id)
            .and_then(|fill_id| self.fills.get(*fill_id))
            .cloned()
            .unwrap_or_else(FillColor::no_fill)
    }

    pub fn len(&self) -> usize {
        self.xf_fill_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xf_fill_ids.is_empty()
    }
}

// =============================================================================
// Colour parsing
// =============================================================================

/// Read a colour from `fgColor` attributes. Prefers rgb > indexed > theme.
fn parse_color_attrs(e: &BytesStart) -> Option<FillColor> {
    let mut rgb: Option<String> = None;
    let mut indexed: Option<u32> = None;
    let mut theme: Option<u32> = None;

    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"rgb" => rgb = Some(String::from_utf8_lossy(&attr.value).to_string()),
            b"indexed" => indexed = parse_attr_number(&attr.value),
            b"theme" => theme = parse_attr_number(&attr.value),
            _ => {}
        }
    }

    if let Some(hex) = rgb {
        return Some(FillColor::rgb(&hex));
    }
    if let Some(idx) = indexed {
        return Some(FillColor::Indexed(idx));
    }
    theme.map(|theme| FillColor::Theme { theme })
}

fn parse_attr_number<T: std::str::FromStr>(value: &[u8]) -> Option<T> {
    std::str::from_utf8(value).ok().and_then(|s| s.parse().ok())
}

// =============================================================================
// styles.xml parser
// =============================================================================

/// Parse styles.xml into a FillTable.
pub fn parse_styles_xml(xml: &str) -> FillTable {
    FillTable {
        fills: parse_fills(xml),
        xf_fill_ids: parse_cell_xf_fill_ids(xml),
    }
}

/// Parse `<fills>` into one colour per `<fill>`. A fill without `fgColor`
/// (including gradients) reports no fill.
fn parse_fills(xml: &str) -> Vec<FillColor> {
    let mut fills = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut depth = 0; // 0 = outside, 1 = inside <fills>, 2 = inside <fill>
    let mut in_pattern_fill = false;
    let mut current: Option<FillColor> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"fills" if depth == 0 => depth = 1,
                b"fill" if depth == 1 => {
                    depth = 2;
                    current = None;
                }
                b"patternFill" if depth == 2 => in_pattern_fill = true,
                b"fgColor" if in_pattern_fill => current = parse_color_attrs(e),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"fill" if depth == 1 => fills.push(FillColor::no_fill()),
                b"fgColor" if in_pattern_fill => current = parse_color_attrs(e),
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"patternFill" => in_pattern_fill = false,
                b"fill" if depth == 2 => {
                    fills.push(current.take().unwrap_or_else(FillColor::no_fill));
                    depth = 1;
                    in_pattern_fill = false;
                }
                b"fills" if depth == 1 => break,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!(error = %e, "malformed <fills> in styles.xml");
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    fills
}

/// Parse `<cellXfs>` into the fill ID of each `<xf>`, in order.
fn parse_cell_xf_fill_ids(xml: &str) -> Vec<usize> {
    let mut ids = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut in_cell_xfs = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"cellXfs" => in_cell_xfs = true,
                b"xf" if in_cell_xfs => {
                    let fill_id = e
                        .attributes()
                        .flatten()
                        .find(|attr| attr.key.as_ref() == b"fillId")
                        .and_then(|attr| parse_attr_number(&attr.value))
                        .unwrap_or(0);
                    ids.push(fill_id);
                }
                _ => {}
            },
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"cellXfs" => break,
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!(error = %e, "malformed <cellXfs> in styles.xml");
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    ids
}

// =============================================================================
// Worksheet parser
// =============================================================================

/// Per-cell style IDs from worksheet XML as 1-based (row, column, style_id).
/// Cells on the default style 0 are omitted. A `<row>` or `<c>` without an
/// `r` attribute takes the position after the previous one.
pub fn parse_sheet_styles(xml: &str) -> Vec<(u32, u32, usize)> {
    let mut cell_styles = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut row: u32 = 0;
    let mut next_col: u32 = 1;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                b"row" => {
                    row = e
                        .attributes()
                        .flatten()
                        .find(|attr| attr.key.as_ref() == b"r")
                        .and_then(|attr| parse_attr_number(&attr.value))
                        .unwrap_or(row + 1);
                    next_col = 1;
                }
                b"c" => {
                    let mut style_id: Option<usize> = None;
                    let mut cell_ref: Option<String> = None;
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"s" => style_id = parse_attr_number(&attr.value),
                            b"r" => cell_ref = Some(String::from_utf8_lossy(&attr.value).to_string()),
                            _ => {}
                        }
                    }
                    let position = match cell_ref {
                        Some(cell_ref) => parse_cell_ref(&cell_ref),
                        None if row > 0 => Some((row, next_col)),
                        None => None,
                    };
                    if let Some((cell_row, col)) = position {
                        row = cell_row;
                        next_col = col + 1;
                        if let Some(style_id) = style_id.filter(|id| *id > 0) {
                            cell_styles.push((cell_row, col, style_id));
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!(error = %e, "malformed worksheet XML");
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    cell_styles
}

/// Parse a cell reference like "B5" into 1-based (row, col) = (5, 2).
fn parse_cell_ref(r: &str) -> Option<(u32, u32)> {
    let split = r.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = r.split_at(split);
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let mut col: u32 = 0;
    for ch in letters.chars() {
        col = col
            .checked_mul(26)?
            .checked_add(ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1)?;
    }
    let row: u32 = digits.parse().ok()?;
    if row == 0 {
        return None;
    }
    Some((row, col))
}

// =============================================================================
// Top-level entry point
// =============================================================================

/// Read fill colours for `sheet_names` (in order) from an XLSX file. Cells
/// whose fill is "no fill" are left out of the maps.
pub fn read_sheet_fills(path: &Path, sheet_names: &[String]) -> Result<Vec<SheetFills>, IoError> {
    let styles_err = |message: String| IoError::Styles { path: path.to_path_buf(), message };

    let file = std::fs::File::open(path).map_err(|e| IoError::file(path, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| styles_err(e.to_string()))?;

    let table = match read_zip_file(&mut archive, "xl/styles.xml") {
        Some(xml) => parse_styles_xml(&xml),
        None => {
            debug!("workbook has no styles.xml");
            return Ok(sheet_names.iter().map(|_| SheetFills::new()).collect());
        }
    };
    debug!(cell_styles = table.len(), "parsed styles.xml");

    let workbook_xml = read_zip_file(&mut archive, "xl/workbook.xml").unwrap_or_default();
    let rels_xml = read_zip_file(&mut archive, "xl/_rels/workbook.xml.rels").unwrap_or_default();
    let paths = resolve_worksheet_paths(&workbook_xml, &rels_xml, sheet_names);

    let mut result = Vec::with_capacity(sheet_names.len());
    for (name, ws_path) in sheet_names.iter().zip(paths) {
        let mut fills = SheetFills::new();
        match ws_path.and_then(|p| read_zip_file(&mut archive, &p)) {
            Some(xml) => {
                for (row, col, style_id) in parse_sheet_styles(&xml) {
                    let fill = table.fill_for_style(style_id);
                    if fill != FillColor::no_fill() {
                        fills.insert((row, col), fill);
                    }
                }
            }
            None => warn!(sheet = %name, "worksheet XML not found, treating all cells as unfilled"),
        }
        result.push(fills);
    }

    Ok(result)
}

// =============================================================================
// Helpers
// =============================================================================

/// Unescape the predefined XML entities. `&amp;` goes last so `&amp;lt;`
/// stays literal.
fn unescape_xml(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Read a UTF-8 file from a ZIP archive; `None` if absent or unreadable.
fn read_zip_file<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Option<String> {
    let mut file = archive.by_name(path).ok()?;
    let mut content = String::new();
    file.read_to_string(&mut content).ok()?;
    Some(content)
}

/// Resolve worksheet part paths for `sheet_names` via workbook.xml and its
/// relationships.
fn resolve_worksheet_paths(
    workbook_xml: &str,
    rels_xml: &str,
    sheet_names: &[String],
) -> Vec<Option<String>> {
    let mut name_to_rid: HashMap<String, String> = HashMap::new();
    let mut reader = Reader::from_str(workbook_xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"sheet" => {
                let mut name = None;
                let mut rid = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"name" => name = Some(unescape_xml(&String::from_utf8_lossy(&attr.value))),
                        _ if attr.key.prefix().is_some() && attr.key.local_name().as_ref() == b"id" => {
                            rid = Some(String::from_utf8_lossy(&attr.value).to_string());
                        }
                        _ => {}
                    }
                }
                if let (Some(name), Some(rid)) = (name, rid) {
                    name_to_rid.insert(name, rid);
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    let mut rid_to_target: HashMap<String, String> = HashMap::new();
    let mut reader = Reader::from_str(rels_xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let mut id = None;
                let mut target = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Id" => id = Some(String::from_utf8_lossy(&attr.value).to_string()),
                        b"Target" => {
                            target = Some(String::from_utf8_lossy(&attr.value).to_string());
                        }
                        _ => {}
                    }
                }
                if let (Some(id), Some(target)) = (id, target) {
                    rid_to_target.insert(id, target);
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    sheet_names
        .iter()
        .map(|name| {
            name_to_rid
                .get(name)
                .and_then(|rid| rid_to_target.get(rid))
                .map(|target| match target.strip_prefix('/') {
                    Some(absolute) => absolute.to_string(),
                    None => format!("xl/{target}"),
                })
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
