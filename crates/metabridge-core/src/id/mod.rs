//! Module: id
//! Responsibility: reversible encoding of catalog ids into generic
//! identifiers, including mapping prefixes, relationship identifiers and
//! qualified-name identity strings.
//! Does not own: choosing which prefix a mapping uses.
//! Boundary: every generic guid the engine emits passes through here.
//!
//! Formats:
//! - prefixed entity id: `__|{prefix}|__{external_id}`
//! - relationship id: `{one_guid}(({relationship_type})){two_guid}`
//! - identity: `({external_type})={external_id}`, optionally prefixed


///
/// CONSTANTS
///

const PREFIX_OPEN: &str = "__|";
const PREFIX_CLOSE: &str = "|__";
const RELATIONSHIP_OPEN: &str = "((";
const RELATIONSHIP_CLOSE: &str = "))";
const IDENTITY_SEPARATOR: &str = ")=";

/// Attach a mapping prefix to a catalog id. `None` leaves the id bare.
#[must_use]
pub fn encode_prefixed(prefix: Option<&str>, external_id: &str) -> String {
    match prefix {
        Some(prefix) => format!("{PREFIX_OPEN}{prefix}{PREFIX_CLOSE}{external_id}"),
        None => external_id.to_string(),
    }
}

/// The prefix carried by a generic id, if it carries a well-formed one.
#[must_use]
pub fn decode_prefix(guid: &str) -> Option<&str> {
    split_prefixed(guid).map(|(prefix, _)| prefix)
}

/// The catalog id inside a generic id. Ids without a well-formed prefix are
/// returned unchanged.
#[must_use]
pub fn decode_external_id(guid: &str) -> &str {
    split_prefixed(guid).map_or(guid, |(_, id)| id)
}

fn split_prefixed(guid: &str) -> Option<(&str, &str)> {
    let rest = guid.strip_prefix(PREFIX_OPEN)?;
    let (prefix, id) = rest.split_once(PREFIX_CLOSE)?;

    (!prefix.is_empty()).then_some((prefix, id))
}

///
/// RelationshipId
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RelationshipId {
    pub one_guid: String,
    pub two_guid: String,
    pub relationship_type: String,
}

impl RelationshipId {
    #[must_use]
    pub fn new(
        one_guid: impl Into<String>,
        two_guid: impl Into<String>,
        relationship_type: impl Into<String>,
    ) -> Self {
        Self {
            one_guid: one_guid.into(),
            two_guid: two_guid.into(),
            relationship_type: relationship_type.into(),
        }
    }

    #[must_use]
    pub fn encode(&self) -> String {
        format!(
            "{}{RELATIONSHIP_OPEN}{}{RELATIONSHIP_CLOSE}{}",
            self.one_guid, self.relationship_type, self.two_guid
        )
    }

    /// Parse a relationship id. Anything not in the relationship format,
    /// including plain entity ids, yields `None`.
    #[must_use]
    pub fn decode(guid: &str) -> Option<Self> {
        let (one, rest) = guid.split_once(RELATIONSHIP_OPEN)?;
        let (relationship_type, two) = rest.split_once(RELATIONSHIP_CLOSE)?;

        if one.is_empty() || two.is_empty() || relationship_type.is_empty() {
            return None;
        }

        Some(Self::new(one, two, relationship_type))
    }

    /// Both ends name the same catalog object.
    #[must_use]
    pub fn is_self_contained(&self) -> bool {
        decode_external_id(&self.one_guid) == decode_external_id(&self.two_guid)
    }
}

///
/// Identity
///
/// The identity string carried in an entity's qualified name: the catalog
/// type and id, with the mapping prefix when the mapping has one.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Identity {
    pub prefix: Option<String>,
    pub external_type: String,
    pub external_id: String,
}

impl Identity {
    #[must_use]
    pub fn new(
        prefix: Option<&str>,
        external_type: impl Into<String>,
        external_id: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.map(ToString::to_string),
            external_type: external_type.into(),
            external_id: external_id.into(),
        }
    }

    #[must_use]
    pub fn encode(&self) -> String {
        let bare = format!(
            "({}{IDENTITY_SEPARATOR}{}",
            self.external_type, self.external_id
        );

        encode_prefixed(self.prefix.as_deref(), &bare)
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let prefix = decode_prefix(value);
        let bare = decode_external_id(value);
        let (external_type, external_id) = bare.strip_prefix('(')?.split_once(IDENTITY_SEPARATOR)?;

        if external_type.is_empty() || external_id.is_empty() {
            return None;
        }

        Some(Self::new(prefix, external_type, external_id))
    }

    /// Prefix and catalog type of a value starting with a complete identity
    /// head `({type})=`, whatever follows it.
    #[must_use]
    pub fn parse_head(value: &str) -> Option<(Option<&str>, &str)> {
        let prefix = decode_prefix(value);
        let (external_type, _) = decode_external_id(value)
            .strip_prefix('(')?
            .split_once(IDENTITY_SEPARATOR)?;

        (!external_type.is_empty()).then_some((prefix, external_type))
    }

    /// Generic guid of the entity this identity names.
    #[must_use]
    pub fn guid(&self) -> String {
        encode_prefixed(self.prefix.as_deref(), &self.external_id)
    }
}
