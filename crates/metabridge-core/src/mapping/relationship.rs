use derive_more::Display;

///
/// End
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum End {
    One,
    Two,
}

impl End {
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }
}

///
/// RelationshipKind
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum RelationshipKind {
    /// Both ends are independent catalog objects linked by a reference field.
    EntityLevel,

    /// Each relationship is a catalog object of its own whose reference
    /// fields lead to the two ends.
    ObjectLevel,

    /// Both ends are derived from the same catalog object.
    SelfContained,
}

///
/// PropertyHolder
///
/// Catalog object relationship properties are read from.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PropertyHolder {
    End(End),
    RelationshipObject,
}

impl From<End> for PropertyHolder {
    fn from(end: End) -> Self {
        Self::End(end)
    }
}

///
/// Endpoint
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Endpoint {
    pub generic_type: String,
    pub external_types: Vec<String>,
    pub prefix: Option<String>,

    /// Reference field on this end's object that points at the other end,
    /// or at the relationship objects of an object-level mapping.
    pub link_field: Option<String>,

    /// Reference field on the relationship object that leads to this end.
    pub via_field: Option<String>,
}

impl Endpoint {
    #[must_use]
    pub fn new(generic_type: impl Into<String>, external_types: &[&str]) -> Self {
        Self {
            generic_type: generic_type.into(),
            external_types: external_types.iter().map(ToString::to_string).collect(),
            prefix: None,
            link_field: None,
            via_field: None,
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn linked_by(mut self, field: impl Into<String>) -> Self {
        self.link_field = Some(field.into());
        self
    }

    #[must_use]
    pub fn reached_by(mut self, field: impl Into<String>) -> Self {
        self.via_field = Some(field.into());
        self
    }

    #[must_use]
    pub fn accepts_type(&self, external_type: &str) -> bool {
        self.external_types.iter().any(|t| t == external_type)
    }

    #[must_use]
    pub fn accepts(&self, external_type: &str, prefix: Option<&str>) -> bool {
        self.accepts_type(external_type) && self.prefix.as_deref() == prefix
    }
}

///
/// RelationshipMapping
///
/// One concrete realisation of a generic relationship. A generic name may
/// have several, distinguished by the endpoint types they accept.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RelationshipMapping {
    pub generic_type: String,
    pub one: Endpoint,
    pub two: Endpoint,
    pub kind: RelationshipKind,

    /// Catalog type of the relationship objects of an object-level mapping.
    pub object_type: Option<String>,

    /// Generic property to catalog field, read from `properties_from`.
    pub properties: Vec<(String, String)>,
    pub properties_from: PropertyHolder,
}

impl RelationshipMapping {
    #[must_use]
    pub fn entity_level(generic_type: impl Into<String>, one: Endpoint, two: Endpoint) -> Self {
        Self {
            generic_type: generic_type.into(),
            one,
            two,
            kind: RelationshipKind::EntityLevel,
            object_type: None,
            properties: Vec::new(),
            properties_from: PropertyHolder::End(End::One),
        }
    }

    /// Mapping whose relationships are catalog objects of `object_type`.
    /// Each end's `link_field` points at those objects and its `via_field`
    /// leads back from them. Properties are read from the relationship
    /// object.
    #[must_use]
    pub fn object_level(
        generic_type: impl Into<String>,
        object_type: impl Into<String>,
        one: Endpoint,
        two: Endpoint,
    ) -> Self {
        Self {
            kind: RelationshipKind::ObjectLevel,
            object_type: Some(object_type.into()),
            properties_from: PropertyHolder::RelationshipObject,
            ..Self::entity_level(generic_type, one, two)
        }
    }

    #[must_use]
    pub fn self_contained(generic_type: impl Into<String>, one: Endpoint, two: Endpoint) -> Self {
        Self {
            kind: RelationshipKind::SelfContained,
            ..Self::entity_level(generic_type, one, two)
        }
    }

    #[must_use]
    pub fn with_property(
        mut self,
        generic: impl Into<String>,
        field: impl Into<String>,
        from: impl Into<PropertyHolder>,
    ) -> Self {
        self.properties.push((generic.into(), field.into()));
        self.properties_from = from.into();
        self
    }

    #[must_use]
    pub const fn end(&self, end: End) -> &Endpoint {
        match end {
            End::One => &self.one,
            End::Two => &self.two,
        }
    }

    /// Ends an entity of the given catalog type and prefix can play.
    #[must_use]
    pub fn ends_for(&self, external_type: &str, prefix: Option<&str>) -> Vec<End> {
        [End::One, End::Two]
            .into_iter()
            .filter(|e| self.end(*e).accepts(external_type, prefix))
            .collect()
    }

    /// Whether this mapping joins the given pair of typed ends.
    #[must_use]
    pub fn joins(
        &self,
        one: (&str, Option<&str>),
        two: (&str, Option<&str>),
    ) -> bool {
        self.one.accepts(one.0, one.1) && self.two.accepts(two.0, two.1)
    }

    #[must_use]
    pub const fn is_self_contained(&self) -> bool {
        matches!(self.kind, RelationshipKind::SelfContained)
    }

    #[must_use]
    pub const fn is_object_level(&self) -> bool {
        matches!(self.kind, RelationshipKind::ObjectLevel)
    }

    /// Whether catalog objects of this type stand for relationships of
    /// this mapping.
    #[must_use]
    pub fn is_held_by(&self, external_type: &str) -> bool {
        self.object_type.as_deref() == Some(external_type)
    }

    /// Catalog types and fields the mapping reads, for schema checks.
    #[must_use]
    pub fn fields_by_type(&self) -> Vec<(&str, Vec<&str>)> {
        let mut out = Vec::new();
        for end in [&self.one, &self.two] {
            for external_type in &end.external_types {
                out.push((external_type.as_str(), end.link_field.as_deref().into_iter().collect()));
            }
        }

        let property_fields = || self.properties.iter().map(|(_, f)| f.as_str());
        match self.properties_from {
            PropertyHolder::End(end) => {
                for external_type in &self.end(end).external_types {
                    out.push((external_type.as_str(), property_fields().collect()));
                }
            }
            PropertyHolder::RelationshipObject => {
                if let Some(object_type) = &self.object_type {
                    let via = [&self.one, &self.two]
                        .into_iter()
                        .filter_map(|e| e.via_field.as_deref());
                    out.push((object_type.as_str(), via.chain(property_fields()).collect()));
                }
            }
        }

        out
    }

    #[must_use]
    pub fn mapped_properties(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|(g, _)| g.as_str())
    }
}
