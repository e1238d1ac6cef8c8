/// Declarative description of where a capability may live.
///
/// Earlier entries of both candidate lists take precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityDescriptor {
    pub name: String,
    pub candidate_locations: Vec<String>,
    pub candidate_operations: Vec<String>,
    /// Service members the located module must expose, authenticated.
    pub required_services: Vec<String>,
}

impl CapabilityDescriptor {
    /// Creates a descriptor with no candidates.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            candidate_locations: Vec::new(),
            candidate_operations: Vec::new(),
            required_services: Vec::new(),
        }
    }

    /// Appends candidate locations, in preference order.
    pub fn with_locations<I, S>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.candidate_locations
            .extend(locations.into_iter().map(Into::into));
        self
    }

    /// Appends candidate operation names, in preference order.
    pub fn with_operations<I, S>(mut self, operations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.candidate_operations
            .extend(operations.into_iter().map(Into::into));
        self
    }

    /// Requires an authenticated service member next to the operation.
    pub fn requires_service(mut self, member: impl Into<String>) -> Self {
        self.required_services.push(member.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_preserves_order() {
        let descriptor = CapabilityDescriptor::new("email")
            .with_locations(["pkg.a.email_tool", "pkg.b.email_tool"])
            .with_operations(["send_email"])
            .with_operations(["send"]);

        assert_eq!(descriptor.name, "email");
        assert_eq!(
            descriptor.candidate_locations,
            vec!["pkg.a.email_tool", "pkg.b.email_tool"]
        );
        assert_eq!(descriptor.candidate_operations, vec!["send_email", "send"]);
        assert!(descriptor.required_services.is_empty());
    }
}
