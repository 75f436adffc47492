use crate::catalog::{
    CatalogClient, CatalogError, CatalogObject, FieldValue, ID_FIELD, ObjectUpdate, ResultPage,
    SearchQuery, UpdateValue,
};
use std::{cmp::Ordering, collections::BTreeMap, sync::RwLock};

///
/// MemoryCatalog
///
/// In-process catalog that evaluates condition trees itself. Records every
/// search, lookup and update so callers can assert on the traffic the
/// engine generated.
///

#[derive(Debug, Default)]
pub struct MemoryCatalog {
    objects: RwLock<BTreeMap<String, CatalogObject>>,
    journal: RwLock<Journal>,
    failure: RwLock<Option<String>>,
}

#[derive(Debug, Default)]
struct Journal {
    lookups: Vec<String>,
    searches: Vec<SearchQuery>,
    updates: Vec<(String, ObjectUpdate)>,
}

impl MemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_objects(objects: impl IntoIterator<Item = CatalogObject>) -> Self {
        let catalog = Self::new();
        for object in objects {
            catalog.insert(object);
        }

        catalog
    }

    pub fn insert(&self, object: CatalogObject) {
        self.objects_mut().insert(object.id.clone(), object);
    }

    #[must_use]
    pub fn object(&self, id: &str) -> Option<CatalogObject> {
        self.objects_ref().get(id).cloned()
    }

    /// Make every subsequent request fail with a transport error.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self
            .failure
            .write()
            .expect("memory catalog failure lock poisoned") = Some(message.into());
    }

    pub fn recover(&self) {
        *self
            .failure
            .write()
            .expect("memory catalog failure lock poisoned") = None;
    }

    #[must_use]
    pub fn searches(&self) -> Vec<SearchQuery> {
        self.journal_ref().searches.clone()
    }

    #[must_use]
    pub fn lookups(&self) -> Vec<String> {
        self.journal_ref().lookups.clone()
    }

    #[must_use]
    pub fn updates(&self) -> Vec<(String, ObjectUpdate)> {
        self.journal_ref().updates.clone()
    }

    pub fn clear_journal(&self) {
        *self
            .journal
            .write()
            .expect("memory catalog journal lock poisoned") = Journal::default();
    }

    fn check_failure(&self) -> Result<(), CatalogError> {
        let failure = self
            .failure
            .read()
            .expect("memory catalog failure lock poisoned");

        match failure.as_ref() {
            Some(message) => Err(CatalogError::Transport {
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn objects_ref(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, CatalogObject>> {
        self.objects
            .read()
            .expect("memory catalog object lock poisoned")
    }

    fn objects_mut(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<String, CatalogObject>> {
        self.objects
            .write()
            .expect("memory catalog object lock poisoned")
    }

    fn journal_ref(&self) -> std::sync::RwLockReadGuard<'_, Journal> {
        self.journal
            .read()
            .expect("memory catalog journal lock poisoned")
    }

    fn journal_mut(&self) -> std::sync::RwLockWriteGuard<'_, Journal> {
        self.journal
            .write()
            .expect("memory catalog journal lock poisoned")
    }
}

impl CatalogClient for MemoryCatalog {
    fn get_object(&self, id: &str) -> Result<Option<CatalogObject>, CatalogError> {
        self.journal_mut().lookups.push(id.to_string());
        self.check_failure()?;

        Ok(self.object(id))
    }

    fn search(&self, query: &SearchQuery) -> Result<ResultPage, CatalogError> {
        self.journal_mut().searches.push(query.clone());
        self.check_failure()?;

        let mut matched: Vec<CatalogObject> = self
            .objects_ref()
            .values()
            .filter(|o| query.types.is_empty() || query.types.contains(&o.object_type))
            .filter(|o| query.conditions.matches(o))
            .cloned()
            .collect();

        if let Some(sort) = &query.sort {
            matched.sort_by(|a, b| {
                let ord = compare_field(a, b, &sort.property);
                if sort.ascending { ord } else { ord.reverse() }
            });
        }

        let total = matched.len();
        let page_size = if query.page_size == 0 {
            total
        } else {
            query.page_size
        };
        let items: Vec<CatalogObject> = matched
            .into_iter()
            .skip(query.begin_at)
            .take(page_size)
            .map(|o| o.project(&query.properties))
            .collect();
        let has_more = query.begin_at + items.len() < total;

        Ok(ResultPage {
            items,
            total,
            has_more,
        })
    }

    fn update(&self, id: &str, update: &ObjectUpdate) -> Result<(), CatalogError> {
        self.journal_mut()
            .updates
            .push((id.to_string(), update.clone()));
        self.check_failure()?;

        let mut objects = self.objects_mut();
        let object = objects
            .get_mut(id)
            .ok_or_else(|| CatalogError::UpdateRejected {
                id: id.to_string(),
                message: "no such object".to_string(),
            })?;

        for (field, change) in &update.changes {
            match change {
                UpdateValue::Set(value) => object.set(field.clone(), value.clone()),
                UpdateValue::Append(refs) => {
                    let mut current = object.references(field).to_vec();
                    for r in refs {
                        if !current.iter().any(|c| c.id == r.id) {
                            current.push(r.clone());
                        }
                    }
                    object.set(field.clone(), FieldValue::References(current));
                }
            }
        }

        Ok(())
    }
}

fn compare_field(a: &CatalogObject, b: &CatalogObject, field: &str) -> Ordering {
    if field == ID_FIELD {
        return a.id.cmp(&b.id);
    }

    let left = a.field(field).and_then(FieldValue::literal);
    let right = b.field(field).and_then(FieldValue::literal);

    match (left, right) {
        (Some(l), Some(r)) => match (l.parse::<i64>(), r.parse::<i64>()) {
            (Ok(l), Ok(r)) => l.cmp(&r),
            _ => l.cmp(&r),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.id.cmp(&b.id),
    }
}
