/// A parameter accepted as either a single value or an ordered list of values.
#[derive(Debug, Clone, PartialEq)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }

    /// The comma-joined query value.
    pub fn joined(&self) -> String {
        match self {
            OneOrMany::One(value) => value.clone(),
            OneOrMany::Many(values) => values.join(","),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            OneOrMany::One(value) => value.is_empty(),
            OneOrMany::Many(values) => values.is_empty(),
        }
    }
}

impl From<&str> for OneOrMany {
    fn from(value: &str) -> Self {
        OneOrMany::One(value.to_string())
    }
}

impl From<String> for OneOrMany {
    fn from(value: String) -> Self {
        OneOrMany::One(value)
    }
}

impl From<Vec<String>> for OneOrMany {
    fn from(values: Vec<String>) -> Self {
        OneOrMany::Many(values)
    }
}

impl From<Vec<&str>> for OneOrMany {
    fn from(values: Vec<&str>) -> Self {
        OneOrMany::Many(values.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for OneOrMany {
    fn from(values: [&str; N]) -> Self {
        OneOrMany::Many(values.iter().map(|value| value.to_string()).collect())
    }
}

/// Ordered query parameters. Absent values are never sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters(Vec<(String, String)>);

impl Parameters {
    pub fn new() -> Self {
        Parameters::default()
    }

    pub fn text(mut self, name: &str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.0.push((name.to_string(), value.to_string()));
        }
        self
    }

    pub fn flag(mut self, name: &str, value: Option<bool>) -> Self {
        if let Some(value) = value {
            self.0.push((name.to_string(), value.to_string()));
        }
        self
    }

    pub fn number(mut self, name: &str, value: Option<u32>) -> Self {
        if let Some(value) = value {
            self.0.push((name.to_string(), value.to_string()));
        }
        self
    }

    pub fn list(mut self, name: &str, value: Option<&OneOrMany>) -> Self {
        if let Some(value) = value {
            self.0.push((name.to_string(), value.joined()));
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn into_vec(self) -> Vec<(String, String)> {
        self.0
    }
}
