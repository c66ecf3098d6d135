use indexmap::IndexMap;

/// Per-field settings parsed from a `KEY:VALUE;FLAG` tag string.
///
/// Keys are upper-cased. A flag without a value maps to itself, so
/// `PRIMARY_KEY` is stored as `PRIMARY_KEY => PRIMARY_KEY`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSettings {
    settings: IndexMap<String, String>,
}

impl TagSettings {
    pub fn parse(tag: &str) -> TagSettings {
        let mut settings = IndexMap::new();

        for part in tag.split(';') {
            let mut pieces = part.split(':');
            let key = match pieces.next() {
                Some(key) if !key.trim().is_empty() => key.trim().to_uppercase(),
                _ => continue,
            };
            let value = pieces.collect::<Vec<_>>().join(":");
            let value = value.trim();

            let value = if value.is_empty() {
                key.clone()
            } else {
                value.to_string()
            };
            settings.insert(key, value);
        }

        TagSettings { settings }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.settings.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.settings
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}
