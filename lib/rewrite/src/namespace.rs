use oxrdf::{IriParseError, NamedNode, NamedNodeRef};
use uuid::Uuid;

/// The IRI namespace under which variables are written out as named nodes
/// for the duration of one run.
///
/// The prefix has the form `<base><token>#` where the token is a freshly
/// drawn UUID. With 122 random bits, two runs picking the same prefix, or a
/// data set already containing an IRI under it, is vanishingly unlikely;
/// [`encode_bgp`](crate::encode_bgp) still rejects inputs that do collide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableNamespace {
    prefix: String,
}

impl VariableNamespace {
    /// Draws a fresh namespace below `base`.
    pub fn generate(base: &str) -> Self {
        let token = Uuid::new_v4().simple().to_string();
        Self {
            prefix: format!("{base}{token}#"),
        }
    }

    /// Reuses an existing prefix instead of drawing one.
    pub fn from_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The full prefix string, ending in `#`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Builds the IRI that stands in for the variable `name`.
    pub fn variable_iri(&self, name: &str) -> Result<NamedNode, IriParseError> {
        NamedNode::new(format!("{}{name}", self.prefix))
    }

    /// Returns the variable name `iri` stands for, or `None` if `iri` does
    /// not lie under this namespace.
    ///
    /// This is a pure prefix test: an IRI a transformation minted itself is
    /// treated exactly like one produced by encoding.
    pub fn variable_name<'a>(&self, iri: NamedNodeRef<'a>) -> Option<&'a str> {
        iri.as_str().strip_prefix(self.prefix.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_namespaces_differ() {
        let first = VariableNamespace::generate("http://example.org/");
        let second = VariableNamespace::generate("http://example.org/");
        assert_ne!(first.prefix(), second.prefix());
    }

    #[test]
    fn variable_iri_round_trips_through_name() {
        let namespace = VariableNamespace::generate("http://example.org/");
        let iri = namespace.variable_iri("population").unwrap();
        assert_eq!(namespace.variable_name(iri.as_ref()), Some("population"));
    }

    #[test]
    fn foreign_iris_are_not_variable_names() {
        let namespace = VariableNamespace::from_prefix("http://example.org/abc#");
        let iri = NamedNodeRef::new_unchecked("http://example.org/def#x");
        assert_eq!(namespace.variable_name(iri), None);
    }
}
