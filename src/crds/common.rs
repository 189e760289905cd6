//! Kubernetes core types that appear inside custom resource specs.
//!
//! The small selector types are declared field by field, so that they show up in the schema.
//! The large pod level types are aliases of `Value`: they hold the json the api server returned,
//! whatever Kubernetes release produced it.
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use serde_json::Value;

use std::collections::BTreeMap;

dynamic_attributes!(IntOrString);

pub type Affinity = Value;
pub type Container = Value;
pub type EmptyDirVolumeSource = Value;
pub type EphemeralVolumeSource = Value;
pub type PersistentVolumeClaimSpec = Value;
pub type PersistentVolumeClaimStatus = Value;
pub type PodSecurityContext = Value;
pub type ResourceRequirements = Value;
pub type Toleration = Value;
pub type TopologySpreadConstraint = Value;
pub type Volume = Value;
pub type VolumeMount = Value;

schema_object! {
    /// Selects a key of a secret in the resource's namespace
    pub struct SecretKeySelector {
        /// The key of the secret to select from. Must be a valid secret key.
        key: String => "key",
        /// Name of the referent.
        name: String => "name",
        /// Specify whether the Secret or its key must be defined
        optional: bool => "optional",
    }
}

schema_object! {
    /// Selects a key of a config map in the resource's namespace
    pub struct ConfigMapKeySelector {
        /// The key to select.
        key: String => "key",
        /// Name of the referent.
        name: String => "name",
        /// Specify whether the ConfigMap or its key must be defined
        optional: bool => "optional",
    }
}

schema_object! {
    pub struct LocalObjectReference {
        /// Name of the referent.
        name: String => "name",
    }
}

schema_object! {
    pub struct LabelSelectorRequirement {
        /// key is the label key that the selector applies to.
        key: String => "key",
        /// operator represents a key's relationship to a set of values. Valid operators are In,
        /// NotIn, Exists and DoesNotExist.
        operator: String => "operator",
        values: Vec<String> => "values",
    }
}

schema_object! {
    /// A label query over a set of resources. An empty selector matches all objects, a null
    /// selector matches none.
    pub struct LabelSelector {
        /// matchExpressions is a list of label selector requirements. The requirements are ANDed.
        match_expressions: Vec<LabelSelectorRequirement> => "matchExpressions",
        /// matchLabels is a map of {key,value} pairs.
        match_labels: BTreeMap<String, String> => "matchLabels",
    }
}

schema_object! {
    /// Secret or ConfigMap containing data to use for the targets.
    pub struct SecretOrConfigMap {
        config_map: ConfigMapKeySelector => "configMap",
        secret: SecretKeySelector => "secret",
    }
}

schema_object! {
    /// The subset of object metadata that may be set on embedded resources
    pub struct EmbeddedObjectMetadata {
        /// Annotations is an unstructured key value map stored with a resource.
        annotations: BTreeMap<String, String> => "annotations",
        /// Map of string keys and values that can be used to organize and categorize objects.
        labels: BTreeMap<String, String> => "labels",
        /// Name must be unique within a namespace.
        name: String => "name",
    }
}
