//! Namespaced Kubernetes resources are identified by the combination of the
//! `namespace` and `name` fields from the `metadata`.
//!
//! `ObjectIdRef` borrows both, typically from the configuration of a data source.
//! It displays as `namespace/name`, which is the form used in logs and api error
//! messages. The `id` attribute that a data source writes into its state uses the
//! opposite order, `name/namespace`, and is produced by `state_id`.
use std::fmt::{self, Display};

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct ObjectIdRef<'a> {
    pub namespace: &'a str,
    pub name: &'a str,
}

impl<'a> ObjectIdRef<'a> {
    pub fn new(namespace: &'a str, name: &'a str) -> ObjectIdRef<'a> {
        ObjectIdRef { namespace, name }
    }

    /// The value of the `id` attribute in data source state: `name/namespace`
    pub fn state_id(&self) -> String {
        format!("{}/{}", self.name, self.namespace)
    }
}

impl<'a> Display for ObjectIdRef<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
