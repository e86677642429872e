//! Office Open XML package helpers
use crate::error::TimesheetError;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use std::collections::HashMap;
use std::io::Read;
use std::io::Seek;
use zip::ZipArchive;

/// XML tag name for relationship elements
const TAG_RELATIONSHIP: &[u8] = b"Relationship";

/// Magic number of a compound document; encrypted workbooks are wrapped in one
const CFB_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Opens the zip container of a workbook
///
/// # Arguments
/// * `file_name` - Upload name, used in error messages
/// * `bytes` - Raw upload bytes
/// * `reader` - Seekable reader over the same bytes
pub(super) fn open<RS: Read + Seek>(file_name: &str, bytes: &[u8], reader: RS) -> Result<ZipArchive<RS>, TimesheetError> {
    if bytes.starts_with(&CFB_SIGNATURE) {
        Err(SpreadsheetError::SpreadsheetPasswordProtectedError(file_name.to_owned()))?;
    }
    Ok(ZipArchive::new(reader)?)
}

/// Loads worksheet relationships
///
/// # Returns
/// Mapping of relationship IDs to worksheet paths inside the archive
pub(super) fn load_relationships<RS: Read + Seek>(zip: &mut ZipArchive<RS>, path: &str) -> Result<HashMap<String, String>, TimesheetError> {
    let mut reader = zip.xml_reader(path)?
        .ok_or_else(|| SpreadsheetError::FileError(path.to_string()))?;
    let mut relationships: HashMap<String, String> = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.get_attribute_value("Id")?;
            let kind = event.get_attribute_value("Type")?;
            let target = event.get_attribute_value("Target")?;
            if kind.map(|it| it.ends_with("/worksheet")).unwrap_or(true) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id.to_string(), to_zip_path(&target));
                }
            }
        }
    });
    Ok(relationships)
}

/// Maps style indexes to cell types using custom and built-in formats
pub(super) fn load_number_formats(format_indexes: Vec<String>, custom_formats: HashMap<String, CellType>, is_1904: bool) -> Vec<CellType> {
    format_indexes
        .iter()
        .map(|id| {
            custom_formats
                .get(id)
                .copied()
                .or_else(|| CellType::parse_builtin_number_format_id(id, is_1904))
                .unwrap_or(CellType::Number)
        })
        .collect()
}

/// Normalizes a relationship target into a path inside the archive
pub(crate) fn to_zip_path(path: &str) -> String {
    if let Some(path) = path.strip_prefix('/') {
        path.to_string()
    } else if path.starts_with("xl/") {
        path.to_string()
    } else {
        format!("xl/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zip_paths() {
        assert_eq!(to_zip_path("worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
        assert_eq!(to_zip_path("/xl/worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
        assert_eq!(to_zip_path("xl/worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
    }

    #[test]
    fn number_formats_prefer_custom() {
        let mut custom = HashMap::new();
        custom.insert("164".to_owned(), CellType::NumberTime);
        let formats = load_number_formats(
            vec!["0".to_owned(), "164".to_owned(), "14".to_owned()],
            custom,
            false,
        );
        assert_eq!(formats, vec![CellType::Number, CellType::NumberTime, CellType::NumberDate { is_1904: false }]);
    }

    #[test]
    fn encrypted_workbook_is_rejected() {
        let mut bytes = CFB_SIGNATURE.to_vec();
        bytes.extend_from_slice(&[0u8; 64]);
        let result = open("senha.xlsx", &bytes, std::io::Cursor::new(bytes.as_slice()));
        assert!(matches!(
            result,
            Err(TimesheetError::SpreadsheetError(SpreadsheetError::SpreadsheetPasswordProtectedError(_)))
        ));
    }
}
