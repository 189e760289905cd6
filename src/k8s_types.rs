use std::fmt::{self, Display};
use std::hash::{self, Hash};

/// A basic description of a Kubernetes resource type, with just enough information to build
/// request urls for the api server. We use `&'static str` for all of these so that it's easy
/// to pass references around without copying. You can define your own k8s types simply by declaring
/// a static, like:
///
/// ```no_run
/// use k8s_crd_datasource::k8s_types::K8sType;
///
/// #[allow(non_upper_case_globals)]
/// pub static MyCrd: &K8sType = &K8sType {
///     group: "example.com",
///     version: "v1",
///     kind: "MyCrd",
///     plural_kind: "mycrds"
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct K8sType {
    pub group: &'static str,
    pub version: &'static str,
    pub kind: &'static str,
    pub plural_kind: &'static str,
}

impl Hash for K8sType {
    fn hash<H: hash::Hasher>(&self, hasher: &mut H) {
        self.group.hash(hasher);
        self.version.hash(hasher);
        self.kind.hash(hasher);
    }
}

impl K8sType {
    /// Returns the `apiVersion` as it appears in resources of this type, which is `<group>/<version>`
    /// or just `<version>` for the core group
    pub fn format_api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.to_owned()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    pub fn is_core(&self) -> bool {
        self.group.is_empty()
    }

    /// The suffix that's appended to a provider type name to form the data source type name, for
    /// example `_monitoring_coreos_com_prometheus_v1`.
    pub fn type_name_suffix(&self) -> String {
        let kind = self.kind.to_lowercase();
        if self.is_core() {
            format!("_{}_{}", kind, self.version)
        } else {
            let group = self.group.replace('.', "_").replace('-', "_");
            format!("_{}_{}_{}", group, kind, self.version)
        }
    }
}

impl Display for K8sType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_core() {
            write!(f, "{}/{}", self.version, self.plural_kind)
        } else {
            write!(f, "{}/{}/{}", self.group, self.version, self.plural_kind)
        }
    }
}

macro_rules! k8s_type {
    ($ref_name:ident, $group:expr, $version:expr, $kind:expr, $plural_kind:expr) => {
        #[allow(non_upper_case_globals)]
        pub static $ref_name: &crate::k8s_types::K8sType = &crate::k8s_types::K8sType {
            group: $group,
            version: $version,
            kind: $kind,
            plural_kind: $plural_kind,
        };
    };
}

pub mod monitoring_coreos_com {
    pub mod v1 {
        k8s_type!(Prometheus, "monitoring.coreos.com", "v1", "Prometheus", "prometheuses");
    }
}

#[cfg(test)]
mod test {
    use super::*;

    static POD: &K8sType = &K8sType {
        group: "",
        version: "v1",
        kind: "Pod",
        plural_kind: "pods",
    };

    #[test]
    fn api_version_includes_group_when_present() {
        let subject = monitoring_coreos_com::v1::Prometheus;
        assert_eq!("monitoring.coreos.com/v1", subject.format_api_version());
        assert_eq!("monitoring.coreos.com/v1/prometheuses", subject.to_string());
    }

    #[test]
    fn api_version_is_only_the_version_for_the_core_group() {
        assert_eq!("v1", POD.format_api_version());
        assert_eq!("v1/pods", POD.to_string());
    }

    #[test]
    fn type_name_suffix_flattens_the_group() {
        let subject = monitoring_coreos_com::v1::Prometheus;
        assert_eq!("_monitoring_coreos_com_prometheus_v1", subject.type_name_suffix());
        assert_eq!("_pod_v1", POD.type_name_suffix());
    }
}
