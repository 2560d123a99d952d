use std::collections::BTreeMap;

const MARKER: char = '$';

/// Named text values filled by `SAVE_TO_VARIABLE` and `FIND_AND_SAVE` and
/// substituted into later arguments as `$name`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableStore {
    values: BTreeMap<String, String>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.values.clone()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Replaces every `$name` marker of a known variable with its value in a
    /// single left-to-right scan. Substituted text is never scanned again, and
    /// when several names match at one marker the longest wins. Markers of
    /// unknown variables stay verbatim.
    pub fn resolve(&self, text: &str) -> String {
        if self.values.is_empty() || !text.contains(MARKER) {
            return text.to_string();
        }

        let mut resolved = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(position) = rest.find(MARKER) {
            resolved.push_str(&rest[..position]);
            let after = &rest[position + MARKER.len_utf8()..];
            let matched = self
                .values
                .iter()
                .filter(|(name, _)| !name.is_empty() && after.starts_with(name.as_str()))
                .max_by_key(|(name, _)| name.len());
            match matched {
                Some((name, value)) => {
                    resolved.push_str(value);
                    rest = &after[name.len()..];
                }
                None => {
                    resolved.push(MARKER);
                    rest = after;
                }
            }
        }
        resolved.push_str(rest);
        resolved
    }
}
