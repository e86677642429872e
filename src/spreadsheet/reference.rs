//! Conversion between `A1`-style cell references and 0-based (row, col) indexes

/// Rows in a worksheet, `1048576`
pub(crate) const MAX_ROWS: usize = 1 << 20;

/// Columns in a worksheet, `A` to `XFD`
pub(crate) const MAX_COLS: usize = 1 << 14;

/// Parses a column name (`A`, `Z`, `AA`, ...) into a 0-based index.
pub(crate) fn col_to_index(name: &str) -> Option<usize> {
    if name.is_empty() {
        return None;
    }
    let mut index = 0usize;
    for character in name.chars() {
        if !character.is_ascii_alphabetic() {
            return None;
        }
        let digit = (character.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        index = index.checked_mul(26)?.checked_add(digit)?;
        if index > MAX_COLS {
            return None;
        }
    }
    Some(index - 1)
}

/// Parses a 1-based row number into a 0-based index.
pub(crate) fn row_to_index(number: &str) -> Option<usize> {
    number
        .parse::<usize>()
        .ok()
        .filter(|row| (1..=MAX_ROWS).contains(row))
        .map(|row| row - 1)
}

/// Splits a reference such as `C12` into `(row, col)`.
pub(crate) fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (col, row) = reference.split_at(split);
    Some((row_to_index(row)?, col_to_index(col)?))
}

/// Formats `(row, col)` back into an `A1`-style reference.
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    let mut column = col + 1;
    let mut name = String::new();
    while column > 0 {
        column -= 1;
        name.insert(0, (b'A' + (column % 26) as u8) as char);
        column /= 26;
    }
    format!("{name}{}", row + 1)
}
