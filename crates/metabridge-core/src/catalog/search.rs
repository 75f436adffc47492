use crate::catalog::{CREATED_ON_FIELD, CatalogObject, FieldValue, ID_FIELD, MODIFIED_ON_FIELD};
use serde::{Serialize, Serializer};
use std::ops::{BitAnd, BitOr};

///
/// Operator
///
/// Comparison operators understood by the catalog. `as_catalog_str` is the
/// wire form; the like-variants embed the value placeholder `{0}`.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[remain::sorted]
pub enum Operator {
    Eq,
    IsNotNull,
    IsNull,
    LikeContains,
    LikeEndsWith,
    LikeStartsWith,
}

impl Operator {
    #[must_use]
    pub const fn as_catalog_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::IsNotNull => "isNotNull",
            Self::IsNull => "isNull",
            Self::LikeContains => "like %{0}%",
            Self::LikeEndsWith => "like %{0}",
            Self::LikeStartsWith => "like {0}%",
        }
    }

    /// True for operators that take no value.
    #[must_use]
    pub const fn is_unary(self) -> bool {
        matches!(self, Self::IsNull | Self::IsNotNull)
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_catalog_str())
    }
}

///
/// Condition
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Condition {
    #[serde(rename = "property")]
    pub field: String,
    pub operator: Operator,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Condition {
    #[must_use]
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: Some(value.into()),
        }
    }

    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, Operator::Eq, value)
    }

    #[must_use]
    pub fn is_null(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator: Operator::IsNull,
            value: None,
        }
    }

    #[must_use]
    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator: Operator::IsNotNull,
            value: None,
        }
    }

    /// Evaluate against an object the way the catalog would.
    /// Reference lists match when any member's id matches.
    #[must_use]
    pub fn matches(&self, object: &CatalogObject) -> bool {
        let field = object.condition_value(&self.field);
        let present = field.as_ref().is_some_and(|v| !v.is_null());

        match self.operator {
            Operator::IsNull => !present,
            Operator::IsNotNull => present,
            _ => self.compare(field.as_ref()),
        }
    }

    fn compare(&self, field: Option<&FieldValue>) -> bool {
        let (Some(field), Some(value)) = (field, self.value.as_deref()) else {
            return false;
        };

        let candidates: Vec<String> = match field {
            FieldValue::References(refs) => refs.iter().map(|r| r.id.clone()).collect(),
            other => other.literal().into_iter().collect(),
        };

        candidates.iter().any(|c| match self.operator {
            Operator::LikeContains => c.contains(value),
            Operator::LikeStartsWith => c.starts_with(value),
            Operator::LikeEndsWith => c.ends_with(value),
            _ => c == value,
        })
    }
}

///
/// Combinator
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub enum Combinator {
    #[default]
    #[serde(rename = "and")]
    All,

    #[serde(rename = "or")]
    Any,
}

///
/// ConditionNode
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConditionNode {
    Leaf(Condition),
    Nested(ConditionSet),
}

impl ConditionNode {
    fn matches(&self, object: &CatalogObject) -> bool {
        match self {
            Self::Leaf(c) => c.matches(object),
            Self::Nested(set) => set.matches(object),
        }
    }
}

///
/// ConditionSet
///
/// A combinator over conditions and nested sets. `negate_all` negates each
/// member before combining. An empty set constrains nothing.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ConditionSet {
    #[serde(rename = "conditions")]
    pub members: Vec<ConditionNode>,

    #[serde(rename = "operator")]
    pub combinator: Combinator,

    #[serde(rename = "negateAll", skip_serializing_if = "std::ops::Not::not")]
    pub negate_all: bool,
}

impl ConditionSet {
    #[must_use]
    pub fn new(combinator: Combinator) -> Self {
        Self {
            members: Vec::new(),
            combinator,
            negate_all: false,
        }
    }

    #[must_use]
    pub fn all() -> Self {
        Self::new(Combinator::All)
    }

    #[must_use]
    pub fn any() -> Self {
        Self::new(Combinator::Any)
    }

    #[must_use]
    pub fn negated(mut self) -> Self {
        self.negate_all = true;
        self
    }

    #[must_use]
    pub fn with(mut self, condition: Condition) -> Self {
        self.push(condition);
        self
    }

    pub fn push(&mut self, condition: Condition) {
        self.members.push(ConditionNode::Leaf(condition));
    }

    /// Add a nested set. Empty sets are dropped.
    pub fn nest(&mut self, set: Self) {
        if !set.is_empty() {
            self.members.push(ConditionNode::Nested(set));
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Leaf conditions at every depth, in document order.
    #[must_use]
    pub fn leaves(&self) -> Vec<&Condition> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Condition>) {
        for member in &self.members {
            match member {
                ConditionNode::Leaf(c) => out.push(c),
                ConditionNode::Nested(set) => set.collect_leaves(out),
            }
        }
    }

    #[must_use]
    pub fn matches(&self, object: &CatalogObject) -> bool {
        let mut results = self
            .members
            .iter()
            .map(|m| m.matches(object) != self.negate_all);

        match self.combinator {
            Combinator::All => results.all(|r| r),
            Combinator::Any => self.members.is_empty() || results.any(|r| r),
        }
    }
}

impl BitAnd for ConditionSet {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        let mut out = Self::all();
        out.nest(self);
        out.nest(rhs);
        out
    }
}

impl BitOr for ConditionSet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        let mut out = Self::any();
        out.nest(self);
        out.nest(rhs);
        out
    }
}

///
/// Sort
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Sort {
    pub property: String,
    pub ascending: bool,
}

impl Sort {
    #[must_use]
    pub fn by_id() -> Self {
        Self {
            property: ID_FIELD.to_string(),
            ascending: true,
        }
    }

    #[must_use]
    pub fn by_creation(ascending: bool) -> Self {
        Self {
            property: CREATED_ON_FIELD.to_string(),
            ascending,
        }
    }

    #[must_use]
    pub fn by_modification(ascending: bool) -> Self {
        Self {
            property: MODIFIED_ON_FIELD.to_string(),
            ascending,
        }
    }
}

///
/// SearchQuery
///
/// One page request: types to search, fields to return, conditions, and
/// paging window.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct SearchQuery {
    pub types: Vec<String>,
    pub properties: Vec<String>,

    #[serde(rename = "where")]
    pub conditions: ConditionSet,

    #[serde(rename = "begin")]
    pub begin_at: usize,

    #[serde(rename = "pageSize")]
    pub page_size: usize,

    #[serde(rename = "sorts", skip_serializing_if = "Option::is_none")]
    pub sort: Option<Sort>,
}

impl SearchQuery {
    #[must_use]
    pub fn new(object_type: impl Into<String>) -> Self {
        Self {
            types: vec![object_type.into()],
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_properties(mut self, properties: Vec<String>) -> Self {
        self.properties = properties;
        self
    }

    #[must_use]
    pub fn with_conditions(mut self, conditions: ConditionSet) -> Self {
        self.conditions = conditions;
        self
    }

    #[must_use]
    pub const fn with_paging(mut self, begin_at: usize, page_size: usize) -> Self {
        self.begin_at = begin_at;
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: Option<Sort>) -> Self {
        self.sort = sort;
        self
    }

    /// JSON body in the catalog's search wire format.
    #[must_use]
    pub fn to_wire(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// The same query, advanced to the next page.
    #[must_use]
    pub fn next_page(&self, consumed: usize) -> Self {
        let mut next = self.clone();
        next.begin_at = self.begin_at.saturating_add(consumed);
        next
    }
}

///
/// ResultPage
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultPage {
    pub items: Vec<CatalogObject>,
    pub total: usize,
    pub has_more: bool,
}
