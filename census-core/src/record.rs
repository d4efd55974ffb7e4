//! Output records

pub const FOLDER_COLUMN: &str = "Folder";
pub const STATUS_COLUMN: &str = "Status";
pub const COMMIT_COLUMNS: [&str; 3] = ["Last Commit Date", "Last Commit Author", "Last Commit Message"];

/// One table row: ordered column → optional value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusRecord {
    values: Vec<(String, Option<String>)>,
}

impl StatusRecord {
    /// Record with every column present and null
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { values: columns.into_iter().map(|c| (c.into(), None)).collect() }
    }

    /// Set a column, appending it if unknown
    pub fn set(&mut self, column: &str, value: Option<String>) {
        match self.values.iter_mut().find(|(c, _)| c == column) {
            Some((_, slot)) => *slot = value,
            None => self.values.push((column.to_string(), value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.iter().find(|(c, _)| c == column).and_then(|(_, v)| v.as_deref())
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.values.iter().any(|(c, _)| c == column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(c, _)| c.as_str())
    }

    /// Values in column order, nulls as `None`
    pub fn values(&self) -> impl Iterator<Item = Option<&str>> {
        self.values.iter().map(|(_, v)| v.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_columns() {
        let mut record = StatusRecord::with_columns(["Folder", "Codi"]);
        assert!(record.has_column("Codi"));
        assert_eq!(record.get("Codi"), None);

        record.set("Codi", Some("22011".into()));
        record.set("Extra", Some("x".into()));
        assert_eq!(record.get("Codi"), Some("22011"));
        assert_eq!(record.columns().collect::<Vec<_>>(), vec!["Folder", "Codi", "Extra"]);
        assert_eq!(record.values().collect::<Vec<_>>(), vec![None, Some("22011"), Some("x")]);
    }
}
