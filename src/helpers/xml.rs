//! XML parsing utilities for the Office Open XML parts of a workbook
//! Wraps the quick-xml reader and adds attribute and text helpers

use crate::error::TimesheetError;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::BytesRef;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::borrow::Cow;
use std::io::BufRead;
use thiserror::Error;

/// Errors specific to XML parsing operations
#[derive(Error, Debug)]
pub enum XmlError {
    #[error("Parse entity '{0}' failed")]
    ParseEntityError(String),
}

/// XML reader wrapper configured for worksheet parts
pub(crate) struct XmlReader<R: BufRead> {
    reader: Reader<R>,
    buffer: Vec<u8>,
}

impl<R: BufRead> XmlReader<R> {
    pub(crate) fn new(buf_reader: R) -> XmlReader<R> {
        let mut reader = Reader::from_reader(buf_reader);
        let config = reader.config_mut();
        config.check_comments = false;
        config.check_end_names = false;
        config.expand_empty_elements = true;
        config.trim_text(false);

        let buffer = Vec::with_capacity(1024);
        XmlReader { reader, buffer }
    }

    /// Reads the next XML event, `None` at end of document
    pub(crate) fn next(&'_ mut self) -> Result<Option<Event<'_>>, TimesheetError> {
        self.buffer.clear();
        match self.reader.read_event_into(&mut self.buffer) {
            Ok(Event::Eof) => Ok(None),
            Ok(event) => Ok(Some(event)),
            Err(error) => Err(TimesheetError::XmlError(error)),
        }
    }
}

/// Attribute lookup on element start events
pub(crate) trait XmlNodeHelper<'a> {
    /// Gets the unescaped value of an attribute by its qualified name
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, TimesheetError>;
}

impl<'a> XmlNodeHelper<'a> for BytesStart<'a> {
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, TimesheetError> {
        match self.try_get_attribute(name)? {
            Some(attribute) => Ok(Some(attribute.unescape_value()?)),
            None => Ok(None),
        }
    }
}

/// Builds text content out of entity references
pub(crate) trait XmlTextContextHelper {
    /// Appends the character behind `&name;` or `&#NN;` / `&#xNN;`
    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), TimesheetError>;
}

impl XmlTextContextHelper for String {
    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), TimesheetError> {
        let raw = bytes.xml_content()?;
        if let Some(number) = raw.strip_prefix('#') {
            let code = if let Some(hex) = number.strip_prefix('x') {
                u32::from_str_radix(hex, 16)?
            } else {
                number.parse::<u32>()?
            };
            if let Some(character) = char::from_u32(code) {
                self.push(character);
            }
        } else if let Some(entity) = resolve_xml_entity(&raw) {
            self.push_str(entity);
        } else {
            Err(XmlError::ParseEntityError(raw.to_string()))?;
        }

        Ok(())
    }
}

#[macro_export]
macro_rules! match_xml_events {
    ($reader:expr => { $($arms:tt)* }) => {
        while let Some(result) = $reader.next()? {
            match result {
                Event::Eof => break,
                $($arms)*
                _ => (),
            }
        }
    };
}
