#![forbid(unsafe_code)]

use crate::{CategoryId, CategoryIdError};
use std::convert::Infallible;

/// A trackable category and the physical table that backs it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub table: String,
}

impl Category {
    pub fn new(id: CategoryId, table: impl Into<String>) -> Self {
        Self {
            id,
            table: table.into(),
        }
    }

    /// Category whose id is the table name itself.
    pub fn for_table(table: impl Into<String>) -> Result<Self, CategoryIdError> {
        let table = table.into();
        let id = CategoryId::try_new(table.clone())?;
        Ok(Self { id, table })
    }
}

/// Source of every category that should carry a total counter.
pub trait CategoryEnumerator {
    type Error: std::fmt::Display;

    fn categories(&self) -> Result<Vec<Category>, Self::Error>;
}

#[derive(Clone, Debug, Default)]
pub struct StaticCategories {
    categories: Vec<Category>,
}

impl StaticCategories {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    pub fn push(&mut self, category: Category) {
        self.categories.push(category);
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl FromIterator<Category> for StaticCategories {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        Self {
            categories: iter.into_iter().collect(),
        }
    }
}

impl CategoryEnumerator for StaticCategories {
    type Error = Infallible;

    fn categories(&self) -> Result<Vec<Category>, Self::Error> {
        Ok(self.categories.clone())
    }
}
