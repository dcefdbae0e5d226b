use indexmap::IndexMap;

/// Label name -> (declaring line number, bound stream address), in
/// declaration order. Populated during pass one, read-only in pass two.
#[derive(Debug, Default)]
pub struct Labels {
    labels: IndexMap<String, (usize, usize)>,
}

impl Labels {
    pub fn new() -> Self {
        Labels {
            labels: IndexMap::new(),
        }
    }

    /// Bind `name` to `addr`, returning the previous binding when the name
    /// was already declared.
    pub fn insert(&mut self, name: String, line: usize, addr: usize) -> Option<(usize, usize)> {
        self.labels.insert(name, (line, addr))
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.labels.get(name).map(|(_, addr)| *addr)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.labels.iter().map(|(name, (_, addr))| (name.as_str(), *addr))
    }
}
