use crate::error::TimesheetError;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::excel;
use crate::spreadsheet::excel::load_relationships;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::reference::row_to_index;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::SpreadsheetError;
use crate::table::Table;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::collections::HashMap;
use std::io::BufRead;
use std::io::Read;
use std::io::Seek;
use zip::ZipArchive;

// XML tag names for parsing Excel XLSX format
const TAG_CUSTOM_FORMATS: QName = QName(b"numFmts"); // Custom number formats container
const TAG_CUSTOM_FORMAT: QName = QName(b"numFmt");   // Individual custom number format
const TAG_FORMAT_INDEXES: QName = QName(b"cellXfs");  // Cell format indexes container
const TAG_FORMAT_INDEX: QName = QName(b"xf");         // Individual cell format index
const TAG_SHARED_STRING_ITEM: QName = QName(b"si");   // Shared string table item
const TAG_PHONETIC_TEXT: QName = QName(b"rPh");       // Phonetic text for Asian languages
const TAG_TEXT: QName = QName(b"t");                  // Text content within strings
const TAG_WORKBOOK_PROPERTIES: QName = QName(b"workbookPr"); // Workbook properties
const TAG_SHEET: QName = QName(b"sheet");             // Worksheet definition
const TAG_ROW: QName = QName(b"row");                 // Row in worksheet
const TAG_CELL: QName = QName(b"c");                  // Cell in worksheet
const TAG_INLINE_STRING: QName = QName(b"is");        // Inline string value
const TAG_VALUE: QName = QName(b"v");                 // Cell value content

/// An opened `.xlsx` workbook
pub(crate) struct XlsxWorkbook<RS: Read + Seek> {
    /// Upload name of the workbook
    name: String,
    zip: ZipArchive<RS>,
    /// Cell type per style index
    number_formats: Vec<CellType>,
    /// Worksheets as (name, zip_path) pairs in workbook order
    sheets: Vec<(String, String)>,
}

impl<RS: Read + Seek> XlsxWorkbook<RS> {
    /// Opens the workbook container and reads its structure
    ///
    /// # Arguments
    /// * `file_name` - Upload name
    /// * `bytes` - Raw upload bytes, checked for an encrypted package
    /// * `reader` - Seekable reader over the same bytes
    pub(crate) fn open(file_name: &str, bytes: &[u8], reader: RS) -> Result<Self, TimesheetError> {
        let mut zip = excel::open(file_name, bytes, reader)?;
        let (sheets, is_1904) = load_workbook(&mut zip)?;
        if sheets.is_empty() {
            Err(SpreadsheetError::SpreadsheetEmptyError(file_name.to_owned()))?
        }
        let number_formats = load_number_formats(&mut zip, is_1904)?;
        Ok(XlsxWorkbook {
            name: file_name.to_owned(),
            zip,
            number_formats,
            sheets,
        })
    }

    /// Reads the first worksheet into a table, the first data row being the header
    pub(crate) fn read_first_sheet(&mut self) -> Result<Table, TimesheetError> {
        let shared_strings = self.load_shared_strings()?;
        let (sheet_name, zip_path) = self.sheets[0].clone();
        let sheet = self.read_sheet(&sheet_name, &zip_path, &shared_strings)?;
        tracing::debug!(file = %self.name, sheet = %sheet_name, cells = sheet.cells.len(), "read worksheet");
        Ok(sheet.into_table()?)
    }

    /// Loads the shared string table, empty when the part is absent
    fn load_shared_strings(&mut self) -> Result<Vec<String>, TimesheetError> {
        let mut shared_strings = Vec::<String>::new();
        let mut reader = match self.zip.xml_reader("xl/sharedStrings.xml")? {
            Some(reader) => reader,
            None => return Ok(shared_strings),
        };
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
                shared_strings.push(read_string_value(&mut reader, TAG_SHARED_STRING_ITEM, false)?);
            }
        });
        Ok(shared_strings)
    }

    fn read_sheet(&mut self, sheet_name: &str, zip_path: &str, shared_strings: &[String]) -> Result<Sheet, TimesheetError> {
        let mut sheet = Sheet::new(&self.name, sheet_name);
        let mut row_count = 0usize;
        let mut col_count = 0usize;
        let mut row = 0usize;
        let mut col = 0usize;
        let mut kind = CellType::default();
        let mut value = String::new();
        let mut reader = self.zip.xml_reader(zip_path)?
            .ok_or_else(|| SpreadsheetError::FileError(zip_path.to_owned()))?;
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_ROW => {
                if let Some(number) = event.get_attribute_value("r")? {
                    row_count = row_to_index(&number).ok_or_else(|| SpreadsheetError::CellReferenceError(
                        self.name.to_owned(),
                        sheet_name.to_owned(),
                        number.to_string(),
                    ))?;
                }
                col_count = 0;
            }
            Event::End(event) if event.name() == TAG_ROW => {
                row_count += 1;
            }
            Event::Start(event) if event.name() == TAG_CELL => {
                (row, col) = match event.get_attribute_value("r")? {
                    Some(reference) => reference_to_index(&reference).ok_or_else(|| SpreadsheetError::CellReferenceError(
                        self.name.to_owned(),
                        sheet_name.to_owned(),
                        reference.to_string(),
                    ))?,
                    None => (row_count, col_count),
                };
                col_count = col + 1;
                value.clear();
                kind = match event.get_attribute_value("t")?.as_deref() {
                    Some("inlineStr") | Some("str") => CellType::InlineString,
                    Some("s") => CellType::SharedString,
                    Some("d") => CellType::IsoDateTime,
                    Some("b") => CellType::Boolean,
                    Some("e") => CellType::Error,
                    _ => CellType::Number,
                };
                if let Some(format_id) = event.get_attribute_value("s")? {
                    if kind == CellType::Number && !format_id.is_empty() {
                        let index = format_id.parse::<usize>()?;
                        kind = self.number_formats.get(index).copied().unwrap_or(CellType::Number);
                    }
                }
            }
            Event::Start(event) if event.name() == TAG_INLINE_STRING => {
                value = read_string_value(&mut reader, TAG_INLINE_STRING, false)?;
            }
            Event::Start(event) if event.name() == TAG_VALUE => {
                value = read_string_value(&mut reader, TAG_VALUE, true)?;
            }
            Event::End(event) if event.name() == TAG_CELL => {
                if value.is_empty() {
                    continue;
                }
                let text = if kind == CellType::SharedString {
                    let index = value.parse::<usize>()?;
                    shared_strings.get(index).cloned().ok_or_else(|| SpreadsheetError::CellValueError(
                        self.name.to_owned(),
                        sheet_name.to_owned(),
                        index_to_reference(row, col),
                        value.to_owned(),
                    ))?
                } else {
                    cell::to_text(kind, &value).map_err(|_| SpreadsheetError::CellValueError(
                        self.name.to_owned(),
                        sheet_name.to_owned(),
                        index_to_reference(row, col),
                        value.to_owned(),
                    ))?
                };
                value.clear();
                if !text.is_empty() {
                    sheet.push(Cell { row, col, value: text })?;
                }
            }
        });
        Ok(sheet)
    }
}

/// Loads worksheet names and paths from the workbook part, plus the date system flag
fn load_workbook<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<(Vec<(String, String)>, bool), TimesheetError> {
    let relationships = load_relationships(zip, "xl/_rels/workbook.xml.rels")?;
    let mut reader = zip.xml_reader("xl/workbook.xml")?
        .ok_or_else(|| SpreadsheetError::FileError("xl/workbook.xml".to_string()))?;
    let mut sheets: Vec<(String, String)> = Vec::new();
    let mut is_1904 = false;
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHEET => {
            let mut name = None::<String>;
            let mut id = None::<String>;
            for result in event.attributes() {
                let attribute = result?;
                let key = attribute.key.local_name();
                if key.as_ref() == b"name" {
                    name = Some(attribute.unescape_value()?.to_string());
                } else if key.as_ref() == b"id" {
                    id = Some(attribute.unescape_value()?.to_string());
                }
            }
            if let Some((name, id)) = name.zip(id) {
                if let Some(path) = relationships.get(&id) {
                    sheets.push((name, path.to_owned()));
                }
            }
        }
        Event::Start(event) if event.name() == TAG_WORKBOOK_PROPERTIES => {
            is_1904 = event.get_attribute_value("date1904")?
                .map(|value| value == "1" || value == "true")
                .unwrap_or(false);
        }
    });
    Ok((sheets, is_1904))
}

/// Loads custom number formats and the style index table from the styles part
fn load_number_formats<RS: Read + Seek>(zip: &mut ZipArchive<RS>, is_1904: bool) -> Result<Vec<CellType>, TimesheetError> {
    let mut reader = match zip.xml_reader("xl/styles.xml")? {
        Some(reader) => reader,
        None => return Ok(Vec::new()),
    };

    let mut custom_formats_context = false;
    let mut custom_formats = HashMap::<String, CellType>::new();
    let mut format_indexes_context = false;
    let mut format_indexes = Vec::<String>::new();

    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_CUSTOM_FORMATS => custom_formats_context = true,
        Event::End(event) if event.name() == TAG_CUSTOM_FORMATS => custom_formats_context = false,
        Event::Start(event) if custom_formats_context && event.name() == TAG_CUSTOM_FORMAT => {
            let id = event.get_attribute_value("numFmtId")?;
            let format = event.get_attribute_value("formatCode")?;
            if let Some((id, format)) = id.zip(format) {
                let style = CellType::parse_custom_number_format(&format, is_1904);
                custom_formats.insert(id.to_string(), style);
            }
        }
        Event::Start(event) if event.name() == TAG_FORMAT_INDEXES => format_indexes_context = true,
        Event::End(event) if event.name() == TAG_FORMAT_INDEXES => break,
        Event::Start(event) if format_indexes_context && event.name() == TAG_FORMAT_INDEX => {
            let id = event.get_attribute_value("numFmtId")?;
            format_indexes.push(id.map(|id| id.to_string()).unwrap_or_default());
        }
    });

    Ok(excel::load_number_formats(format_indexes, custom_formats, is_1904))
}

/// Reads string content up to `end_tag`, skipping phonetic runs
fn read_string_value<R: BufRead>(
    reader: &mut XmlReader<R>,
    end_tag: QName,
    is_text_content: bool,
) -> Result<String, TimesheetError> {
    let mut is_phonetic_text = false;
    let mut is_text = is_text_content;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.name() == end_tag => break,
        Event::Start(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
        Event::End(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
        Event::Start(event) if !is_phonetic_text && event.name() == TAG_TEXT => is_text = true,
        Event::End(event) if is_text && event.name() == TAG_TEXT => is_text = false,
        Event::Text(event) if is_text => text.push_str(&event.xml_content()?),
        Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
    });
    Ok(text)
}
