//! Delimited-text decoder
//!
//! Line-oriented, RFC4180-like: the first line is the header, quoted fields
//! may contain the delimiter, and `""` inside a quoted field is a literal
//! quote. Quoted fields spanning lines are not supported. Blank lines are
//! skipped and short rows are padded with empty strings.

use std::collections::HashMap;

/// Decoded table: header plus data rows of equal width
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

/// Borrowed view of one data row, addressed by header name
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    values: &'a [String],
}

impl<'a> Row<'a> {
    /// Field value by header name; empty when the column is absent
    pub fn get(&self, field: &str) -> &'a str {
        self.table
            .index
            .get(field)
            .and_then(|i| self.values.get(*i))
            .map(String::as_str)
            .unwrap_or("")
    }
}

impl Table {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(move |values| Row { table: self, values })
    }
}

/// Decode comma-separated text
pub fn decode(text: &str) -> Table {
    decode_with(text, ',')
}

/// Decode text split by `delimiter`
pub fn decode_with(text: &str, delimiter: char) -> Table {
    let mut lines = text.split('\n');

    let header_line = match lines.next() {
        Some(line) => line.trim_start_matches('\u{feff}').trim(),
        None => return Table::default(),
    };
    if header_line.is_empty() {
        return Table::default();
    }

    let headers: Vec<String> = split_line(header_line, delimiter)
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();
    let index = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.clone(), i))
        .collect();

    let rows = lines
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let mut values = split_line(line, delimiter);
            values.resize(headers.len(), String::new());
            values
        })
        .collect();

    Table { headers, index, rows }
}

/// Split one line into fields, honoring double-quoted sections
pub fn split_line(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '"' {
            if in_quotes && chars.peek() == Some(&'"') {
                current.push('"');
                chars.next();
            } else {
                in_quotes = !in_quotes;
            }
        } else if ch == delimiter && !in_quotes {
            fields.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }
    fields.push(current);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_names_fields() {
        let table = decode("nome,valor\nAna,10\nBeto,20\n");
        assert_eq!(table.headers(), ["nome", "valor"]);
        assert_eq!(table.len(), 2);
        let names: Vec<&str> = table.rows().map(|r| r.get("nome")).collect();
        assert_eq!(names, vec!["Ana", "Beto"]);
    }

    #[test]
    fn test_quoted_delimiter_and_escaped_quote() {
        let table = decode("nome,valor\n\"Silva, Ana\",\"33.924,92\"\n\"Dito \"\"Beto\"\"\",1");
        let rows: Vec<Row> = table.rows().collect();
        assert_eq!(rows[0].get("nome"), "Silva, Ana");
        assert_eq!(rows[0].get("valor"), "33.924,92");
        assert_eq!(rows[1].get("nome"), "Dito \"Beto\"");
    }

    #[test]
    fn test_blank_lines_and_crlf() {
        let table = decode("nome,valor\r\n\r\nAna,1\r\n   \nBeto,2\r\n");
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows().nth(1).unwrap().get("valor"), "2");
    }

    #[test]
    fn test_short_rows_are_padded() {
        let table = decode("nome,valor,cargo\nAna");
        let row = table.rows().next().unwrap();
        assert_eq!(row.get("nome"), "Ana");
        assert_eq!(row.get("valor"), "");
        assert_eq!(row.get("cargo"), "");
    }

    #[test]
    fn test_missing_column_reads_empty() {
        let table = decode("nome\nAna");
        assert_eq!(table.rows().next().unwrap().get("lotacao"), "");
    }

    #[test]
    fn test_header_only_and_empty_input() {
        assert!(decode("nome,valor\n").is_empty());
        assert!(decode("").is_empty());
        assert!(decode("\n\n").is_empty());
    }

    #[test]
    fn test_custom_delimiter() {
        let table = decode_with("nome;valor\nAna;\"1;5\"", ';');
        assert_eq!(table.rows().next().unwrap().get("valor"), "1;5");
    }
}
