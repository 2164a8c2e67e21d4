use std::fmt::{self, Write};

/// A segment of a response path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum QueryPathSegment {
    /// Index of a list item.
    Index(usize),
    /// Response key of a field.
    Field(String),
}

impl From<usize> for QueryPathSegment {
    fn from(index: usize) -> Self {
        QueryPathSegment::Index(index)
    }
}

impl From<&str> for QueryPathSegment {
    fn from(name: &str) -> Self {
        QueryPathSegment::Field(name.to_string())
    }
}

/// Path from the response root to the value being resolved.
///
/// Backed by a persistent vector so every nested context can take its own copy cheaply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QueryPath(im::Vector<QueryPathSegment>);

impl QueryPath {
    pub fn empty() -> Self {
        QueryPath::default()
    }

    #[must_use]
    pub fn child(&self, segment: impl Into<QueryPathSegment>) -> Self {
        let mut path = self.clone();
        path.push(segment);
        path
    }

    pub fn push(&mut self, segment: impl Into<QueryPathSegment>) {
        self.0.push_back(segment.into());
    }

    pub fn last(&self) -> Option<&QueryPathSegment> {
        self.0.last()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueryPathSegment> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a QueryPath {
    type Item = &'a QueryPathSegment;
    type IntoIter = im::vector::Iter<'a, QueryPathSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for QueryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, segment) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_char('.')?;
            }
            match segment {
                QueryPathSegment::Index(index) => write!(f, "{index}")?,
                QueryPathSegment::Field(name) => f.write_str(name)?,
            }
        }
        Ok(())
    }
}
