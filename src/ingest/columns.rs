//! Column header clean-up helpers.

/// Normalise a header for lookups: trimmed and lowercased
pub fn column_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Trim a raw header and drop a trailing duplicate marker such as `.1`
///
/// Exports that went through pandas disambiguate repeated headers by
/// appending `.N`; the template refers to the bare name.
pub fn clean_column_name(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.rsplit_once('.') {
        Some((stem, suffix))
            if !stem.is_empty() && !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()) =>
        {
            stem.trim_end().to_string()
        }
        _ => trimmed.to_string(),
    }
}

/// Rename repeated column blocks so every member column is addressable.
///
/// Each occurrence of `initial` opens a new block. Member columns (the
/// initial column included) seen inside block `n` become `"{name}.{n}"`,
/// with `n` counted from zero. Columns before the first block and columns
/// that are not members keep their names.
pub fn rename_block_columns(names: &[String], initial: &str, members: &[String]) -> Vec<String> {
    let initial_key = column_key(initial);
    let member_keys: Vec<String> = members.iter().map(|m| column_key(m)).collect();

    let mut block: Option<usize> = None;
    names
        .iter()
        .map(|name| {
            let key = column_key(name);
            if key == initial_key {
                block = Some(block.map_or(0, |b| b + 1));
            }
            let is_member = key == initial_key || member_keys.contains(&key);
            match block {
                Some(index) if is_member => format!("{}.{}", name.trim(), index),
                _ => name.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_column_name() {
        assert_eq!(clean_column_name("  Source T.1 "), "Source T");
        assert_eq!(clean_column_name("Flow Metal Carrier"), "Flow Metal Carrier");
        assert_eq!(clean_column_name("Temp. [C]"), "Temp. [C]");
        assert_eq!(clean_column_name(".5"), ".5");
    }

    #[test]
    fn test_rename_block_columns() {
        let names: Vec<String> = ["Name", "Source", "Source T", "Source", "Source T", "Comment"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let renamed = rename_block_columns(&names, "Source", &["Source T".to_string()]);
        assert_eq!(
            renamed,
            vec!["Name", "Source.0", "Source T.0", "Source.1", "Source T.1", "Comment"]
        );
    }

    #[test]
    fn test_members_before_first_block_keep_name() {
        let names: Vec<String> = ["Source T", "Source", "Source T"].iter().map(|s| s.to_string()).collect();
        let renamed = rename_block_columns(&names, "source", &["source t".to_string()]);
        assert_eq!(renamed, vec!["Source T", "Source.0", "Source T.0"]);
    }
}
