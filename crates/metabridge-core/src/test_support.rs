use crate::{
    catalog::{
        CatalogClient, CatalogError, CatalogObject, CatalogVersion, ObjectUpdate, ResultPage,
        SearchQuery,
    },
    mapping::{MappingRegistry, type_defs},
};
use std::{cell::RefCell, collections::VecDeque};

/// Builtin registry with every builtin type definition offered. Abstract
/// supertypes end up recorded as unimplemented.
pub(crate) fn registry_for(version: CatalogVersion) -> MappingRegistry {
    let mut registry = MappingRegistry::new(version);
    for def in type_defs() {
        let _ = registry.register(def);
    }

    registry
}

pub(crate) fn registry() -> MappingRegistry {
    registry_for(CatalogVersion::V11702)
}

///
/// ScriptedCatalog
///
/// Returns canned pages in order, whatever the query. Used to drive page
/// draining through catalog misbehaviour the in-memory catalog never shows.
///

#[derive(Debug, Default)]
pub(crate) struct ScriptedCatalog {
    pages: RefCell<VecDeque<ResultPage>>,
    queries: RefCell<Vec<SearchQuery>>,
}

impl ScriptedCatalog {
    pub(crate) fn new(pages: impl IntoIterator<Item = ResultPage>) -> Self {
        Self {
            pages: RefCell::new(pages.into_iter().collect()),
            queries: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn queries(&self) -> Vec<SearchQuery> {
        self.queries.borrow().clone()
    }
}

impl CatalogClient for ScriptedCatalog {
    fn get_object(&self, _: &str) -> Result<Option<CatalogObject>, CatalogError> {
        Ok(None)
    }

    fn search(&self, query: &SearchQuery) -> Result<ResultPage, CatalogError> {
        self.queries.borrow_mut().push(query.clone());

        Ok(self.pages.borrow_mut().pop_front().unwrap_or_default())
    }

    fn update(&self, id: &str, _: &ObjectUpdate) -> Result<(), CatalogError> {
        Err(CatalogError::UpdateRejected {
            id: id.to_string(),
            message: "scripted catalog is read-only".to_string(),
        })
    }
}

/// A page of `count` objects of the given type, ids `{stem}{n}`.
pub(crate) fn page_of(stem: &str, object_type: &str, count: usize, has_more: bool) -> ResultPage {
    ResultPage {
        items: (0..count)
            .map(|n| CatalogObject::new(format!("{stem}{n}"), object_type))
            .collect(),
        total: count,
        has_more,
    }
}
