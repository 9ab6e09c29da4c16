// tiledash-core/src/pager.rs

/// Cycles through several data sources (files, repositories) shown one at
/// a time in a single panel.
///
/// Configs accept either one source (`file = "..."`) or a list
/// (`files = [...]`); both are merged here with the single one first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiSource {
    sources: Vec<String>,
    index: usize,
}

impl MultiSource {
    pub fn new(single: Option<String>, plural: Vec<String>) -> Self {
        let sources = single
            .into_iter()
            .chain(plural)
            .filter(|s| !s.is_empty())
            .collect();
        Self { sources, index: 0 }
    }

    pub fn current(&self) -> Option<&str> {
        self.sources.get(self.index).map(String::as_str)
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn next(&mut self) {
        if !self.sources.is_empty() {
            self.index = (self.index + 1) % self.sources.len();
        }
    }

    pub fn prev(&mut self) {
        if !self.sources.is_empty() {
            self.index = self.index.checked_sub(1).unwrap_or(self.sources.len() - 1);
        }
    }
}
