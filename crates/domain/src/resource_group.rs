use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Subscription visible to the caller's credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    subscription_id: String,
    display_name: Option<String>,
}

impl Subscription {
    /// Creates a subscription value.
    #[must_use]
    pub fn new(subscription_id: impl Into<String>, display_name: Option<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            display_name,
        }
    }

    /// Returns the subscription identifier.
    #[must_use]
    pub fn subscription_id(&self) -> &str {
        self.subscription_id.as_str()
    }

    /// Returns the display name, if known.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }
}

/// Handle to a resource group: where it lives and its tag set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGroupRef {
    subscription_id: String,
    name: String,
    location: Option<String>,
    tags: BTreeMap<String, String>,
}

impl ResourceGroupRef {
    /// Creates an untagged resource group handle.
    #[must_use]
    pub fn new(subscription_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            name: name.into(),
            location: None,
            tags: BTreeMap::new(),
        }
    }

    /// Sets the Azure region.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Replaces the tag set.
    #[must_use]
    pub fn with_tags(mut self, tags: BTreeMap<String, String>) -> Self {
        self.tags = tags;
        self
    }

    /// Returns the owning subscription identifier.
    #[must_use]
    pub fn subscription_id(&self) -> &str {
        self.subscription_id.as_str()
    }

    /// Returns the resource group name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the Azure region, if known.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Returns the tag set.
    #[must_use]
    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Returns one tag value.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Adds a tag, replacing any existing value for the key.
    ///
    /// Returns the previous value.
    pub fn add_tag(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.tags.insert(key.into(), value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::ResourceGroupRef;

    #[test]
    fn add_tag_keeps_keys_unique() {
        let mut resource_group = ResourceGroupRef::new("sub1", "rg1");

        assert_eq!(resource_group.add_tag("compliance", "pending"), None);
        assert_eq!(
            resource_group.add_tag("compliance", "sox"),
            Some("pending".to_owned())
        );
        assert_eq!(resource_group.tags().len(), 1);
        assert_eq!(resource_group.tag("compliance"), Some("sox"));
    }
}
