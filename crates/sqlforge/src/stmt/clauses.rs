//! Ordered, named clause list of a rendered statement.

/// One rendered clause, e.g. `("where", "where a = 1")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub name: String,
    pub sql: String,
}

/// Clauses in output order.
///
/// Statements render into this list and hand it to the dialect, which may add,
/// replace, move or drop clauses before the final text is joined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clauses {
    items: Vec<Clause>,
}

impl Clauses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a clause.
    pub fn push(&mut self, name: impl Into<String>, sql: impl Into<String>) {
        self.items.push(Clause {
            name: name.into(),
            sql: sql.into(),
        });
    }

    /// Insert a clause at `index` (clamped to the end).
    pub fn insert(&mut self, index: usize, name: impl Into<String>, sql: impl Into<String>) {
        let index = index.min(self.items.len());
        self.items.insert(
            index,
            Clause {
                name: name.into(),
                sql: sql.into(),
            },
        );
    }

    /// Insert a clause right after the clause called `after`, or append when
    /// there is none.
    pub fn insert_after(&mut self, after: &str, name: impl Into<String>, sql: impl Into<String>) {
        let index = self.position(after).map_or(self.items.len(), |i| i + 1);
        self.insert(index, name, sql);
    }

    /// Replace the text of a named clause. Returns false when it is absent.
    pub fn replace(&mut self, name: &str, sql: impl Into<String>) -> bool {
        match self.items.iter_mut().find(|c| c.name == name) {
            Some(clause) => {
                clause.sql = sql.into();
                true
            }
            None => false,
        }
    }

    /// Remove a named clause.
    pub fn remove(&mut self, name: &str) -> Option<Clause> {
        let index = self.position(name)?;
        Some(self.items.remove(index))
    }

    pub fn remove_at(&mut self, index: usize) -> Option<Clause> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Move a named clause to `index`. Returns false when it is absent.
    pub fn move_to(&mut self, name: &str, index: usize) -> bool {
        let Some(clause) = self.remove(name) else {
            return false;
        };
        let index = index.min(self.items.len());
        self.items.insert(index, clause);
        true
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|c| c.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Clause> {
        self.items.iter().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.items.iter()
    }

    /// Clauses joined by newlines.
    pub fn to_sql(&self) -> String {
        self.items
            .iter()
            .map(|c| c.sql.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
