use crate::ingest::columns::column_key;
use crate::mapping::{TypedRow, ValidationError, ValidationIssue};

/// Rows sharing one grouping key
#[derive(Debug)]
pub struct Group<'a> {
    /// Key as first written
    pub key: String,
    /// Rows in file order
    pub rows: Vec<&'a TypedRow>,
}

/// Group rows by a key attribute in first-seen order.
///
/// A row with a blank key continues the preceding row's group. A blank key
/// on the first row is a `MissingValue` error. Case-insensitively equal keys
/// join the same group even when they are not adjacent.
pub fn group_rows<'a>(rows: &'a [TypedRow], key: &str) -> Result<Vec<Group<'a>>, ValidationError> {
    let mut groups: Vec<Group<'a>> = Vec::new();
    let mut current: Option<usize> = None;

    for row in rows {
        let index = match row.text(key) {
            Some(value) => {
                let normalized = column_key(value);
                match groups.iter().position(|g| column_key(&g.key) == normalized) {
                    Some(existing) => existing,
                    None => {
                        groups.push(Group {
                            key: value.trim().to_string(),
                            rows: Vec::new(),
                        });
                        groups.len() - 1
                    }
                }
            }
            None => current.ok_or_else(|| row.error(key, ValidationIssue::MissingValue))?,
        };
        groups[index].rows.push(row);
        current = Some(index);
    }

    Ok(groups)
}

/// Record-level attribute taken from the first row of a group that sets it.
///
/// A later row with a different non-blank value is a `Conflicting` error.
pub fn record_attribute<T, F>(
    rows: &[&TypedRow],
    attribute: &str,
    read: F,
) -> Result<Option<T>, ValidationError>
where
    T: PartialEq + ToString,
    F: Fn(&TypedRow) -> Option<T>,
{
    let mut first: Option<T> = None;
    for &row in rows {
        let Some(value) = read(row) else {
            continue;
        };
        match &first {
            None => first = Some(value),
            Some(existing) if *existing != value => {
                return Err(row.error(
                    attribute,
                    ValidationIssue::Conflicting {
                        first: existing.to_string(),
                        second: value.to_string(),
                    },
                ));
            }
            Some(_) => {}
        }
    }
    Ok(first)
}
