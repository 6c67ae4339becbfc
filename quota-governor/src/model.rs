//! Subscription and workspace records as supplied by the collaborators.
//!
//! The governor never owns these records: subscriptions are read and validated,
//! workspaces are read, their attribute map is rewritten, and they are handed back to
//! the [`WorkspaceStore`](crate::store::WorkspaceStore).

use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

/// Subscription property holding the tier name.
pub const PACKAGE_PROPERTY: &str = "Package";

/// Subscription property holding the RAM size, e.g. `"2GB"`.
pub const RAM_PROPERTY: &str = "RAM";

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an identifier issued by the owning store.
            #[must_use]
            pub fn new<S: Into<String>>(id: S) -> Self {
                Self(id.into())
            }

            /// Returns the inner string reference.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }
    };
}

string_id!(
    /// Identifier of the account that owns subscriptions and workspaces.
    AccountId
);
string_id!(
    /// Identifier of a workspace record.
    WorkspaceId
);
string_id!(
    /// Identifier of the service a subscription is bought for, e.g. `Saas`.
    ServiceId
);
string_id!(
    /// Identifier of a subscription record.
    SubscriptionId
);

/// Snapshot of a subscription handed to a lifecycle hook.
///
/// `properties` is `None` when the subscription was created without any property
/// mapping at all; this is distinct from an empty mapping only in the error message
/// the governor reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Subscription identifier.
    pub id: SubscriptionId,
    /// Owning account.
    pub account_id: AccountId,
    /// Service the subscription belongs to.
    pub service_id: ServiceId,
    /// Billing plan reference, used only for log correlation.
    #[serde(default)]
    pub plan_id: Option<String>,
    /// Property mapping, e.g. `Package` and `RAM`.
    #[serde(default)]
    pub properties: Option<HashMap<String, String>>,
}

impl Subscription {
    /// Creates a subscription snapshot without properties.
    #[must_use]
    pub fn new(
        id: impl Into<SubscriptionId>,
        account_id: impl Into<AccountId>,
        service_id: impl Into<ServiceId>,
    ) -> Self {
        Self {
            id: id.into(),
            account_id: account_id.into(),
            service_id: service_id.into(),
            plan_id: None,
            properties: None,
        }
    }

    /// Sets a single property, creating the mapping if it is absent.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.get_or_insert_with(HashMap::new).insert(name.into(), value.into());
        self
    }

    /// Replaces the whole property mapping.
    #[must_use]
    pub fn with_properties(mut self, properties: HashMap<String, String>) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Sets the billing plan reference.
    #[must_use]
    pub fn with_plan_id(mut self, plan_id: impl Into<String>) -> Self {
        self.plan_id = Some(plan_id.into());
        self
    }

    /// Returns a property value, or `None` if the mapping or the key is absent.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.as_ref()?.get(name).map(String::as_str)
    }

    /// Returns the raw `Package` property.
    #[must_use]
    pub fn package(&self) -> Option<&str> {
        self.property(PACKAGE_PROPERTY)
    }

    /// Returns the raw `RAM` property.
    #[must_use]
    pub fn ram(&self) -> Option<&str> {
        self.property(RAM_PROPERTY)
    }
}

/// A workspace record with its mutable attribute mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    /// Workspace identifier.
    pub id: WorkspaceId,
    /// Owning account.
    pub account_id: AccountId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Free-form attributes; the governor rewrites the quota keys only.
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl Workspace {
    /// Creates a workspace without attributes.
    #[must_use]
    pub fn new(id: impl Into<WorkspaceId>, account_id: impl Into<AccountId>) -> Self {
        Self {
            id: id.into(),
            account_id: account_id.into(),
            name: String::new(),
            attributes: HashMap::new(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets an attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Returns an attribute value.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}
