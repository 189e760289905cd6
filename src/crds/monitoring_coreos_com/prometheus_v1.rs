//! `monitoring.coreos.com/v1` `Prometheus`, as defined by Prometheus Operator v0.66.0.
//!
//! Every property of that release's CRD schema is declared. Pod level properties (containers,
//! volumes, affinity and so on) are kept as the api server's json.
use crate::crds::common::{
    Affinity, Container, EmbeddedObjectMetadata, EmptyDirVolumeSource, EphemeralVolumeSource,
    LabelSelector, LocalObjectReference, PersistentVolumeClaimSpec, PersistentVolumeClaimStatus,
    PodSecurityContext, ResourceRequirements, SecretKeySelector, SecretOrConfigMap, Toleration,
    TopologySpreadConstraint, Volume, VolumeMount,
};
use crate::datasource::{CrdDataSource, CustomResource};
use crate::k8s_types::{self, K8sType};

use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use serde_json::Value;

use std::collections::BTreeMap;

/// Reads `Prometheus` resources
pub type PrometheusV1DataSource = CrdDataSource<PrometheusV1>;

pub struct PrometheusV1;

impl CustomResource for PrometheusV1 {
    type Spec = PrometheusSpec;

    fn k8s_type() -> &'static K8sType {
        k8s_types::monitoring_coreos_com::v1::Prometheus
    }

    fn description() -> &'static str {
        "Prometheus defines a Prometheus deployment."
    }
}

schema_object! {
    pub struct Argument {
        /// Name of the argument, e.g. "scrape.discovery-reload-interval".
        name: String => "name",
        /// Argument value, e.g. 30s. Can be empty for name-only arguments (e.g. --storage.tsdb.no-lockfile)
        value: String => "value",
    }
}

schema_object! {
    /// BasicAuth allow an endpoint to authenticate over basic authentication
    pub struct BasicAuth {
        /// The secret in the service monitor namespace that contains the password for authentication.
        password: SecretKeySelector => "password",
        /// The secret in the service monitor namespace that contains the username for authentication.
        username: SecretKeySelector => "username",
    }
}

schema_object! {
    pub struct SafeAuthorization {
        /// The secret's key that contains the credentials of the request
        credentials: SecretKeySelector => "credentials",
        /// Set the authentication type. Defaults to Bearer, Basic will cause an error
        r#type: String => "type",
    }
}

schema_object! {
    /// Authorization section for the remote endpoint
    pub struct Authorization {
        credentials: SecretKeySelector => "credentials",
        /// File to read a secret from, mutually exclusive with Credentials (from SafeAuthorization)
        credentials_file: String => "credentialsFile",
        r#type: String => "type",
    }
}

schema_object! {
    /// TLS configuration for a scrape or remote endpoint
    pub struct TlsConfig {
        /// Certificate authority used when verifying server certificates.
        ca: SecretOrConfigMap => "ca",
        /// Path to the CA cert in the Prometheus container to use for the targets.
        ca_file: String => "caFile",
        /// Client certificate to present when doing client-authentication.
        cert: SecretOrConfigMap => "cert",
        /// Path to the client cert file in the Prometheus container for the targets.
        cert_file: String => "certFile",
        /// Disable target certificate validation.
        insecure_skip_verify: bool => "insecureSkipVerify",
        /// Path to the client key file in the Prometheus container for the targets.
        key_file: String => "keyFile",
        /// Secret containing the client key file for the targets.
        key_secret: SecretKeySelector => "keySecret",
        /// Used to verify the hostname for the targets.
        server_name: String => "serverName",
    }
}

schema_object! {
    pub struct OAuth2 {
        /// The secret or configmap containing the OAuth2 client id
        client_id: SecretOrConfigMap => "clientId",
        /// The secret containing the OAuth2 client secret
        client_secret: SecretKeySelector => "clientSecret",
        /// Parameters to append to the token URL
        endpoint_params: BTreeMap<String, String> => "endpointParams",
        /// OAuth2 scopes used for the token request
        scopes: Vec<String> => "scopes",
        /// The URL to fetch the token from
        token_url: String => "tokenUrl",
    }
}

schema_object! {
    /// Sigv4 allows to configures AWS's Signature Verification 4
    pub struct Sigv4 {
        access_key: SecretKeySelector => "accessKey",
        profile: String => "profile",
        region: String => "region",
        role_arn: String => "roleArn",
        secret_key: SecretKeySelector => "secretKey",
    }
}

schema_object! {
    /// RelabelConfig allows dynamic rewriting of the label set, being applied to samples before
    /// ingestion.
    pub struct RelabelConfig {
        /// Action to perform based on regex matching. Default is 'replace'.
        action: String => "action",
        /// Modulus to take of the hash of the source label values.
        modulus: i64 => "modulus",
        /// Regular expression against which the extracted value is matched. Default is '(.*)'
        regex: String => "regex",
        /// Replacement value against which a regex replace is performed if the regular
        /// expression matches. Regex capture groups are available. Default is '$1'
        replacement: String => "replacement",
        /// Separator placed between concatenated source label values. default is ';'.
        separator: String => "separator",
        /// The source labels select values from existing labels.
        source_labels: Vec<String> => "sourceLabels",
        /// Label to which the resulting value is written in a replace action.
        target_label: String => "targetLabel",
    }
}

schema_object! {
    /// QueueConfig allows tuning of the remote write queue parameters.
    pub struct QueueConfig {
        batch_send_deadline: String => "batchSendDeadline",
        capacity: i64 => "capacity",
        max_backoff: String => "maxBackoff",
        max_retries: i64 => "maxRetries",
        max_samples_per_send: i64 => "maxSamplesPerSend",
        max_shards: i64 => "maxShards",
        min_backoff: String => "minBackoff",
        min_shards: i64 => "minShards",
        /// Retry upon receiving a 429 status code from the remote-write storage.
        retry_on_rate_limit: bool => "retryOnRateLimit",
    }
}

schema_object! {
    pub struct MetadataConfig {
        /// Whether metric metadata is sent to remote storage or not.
        send: bool => "send",
        /// How frequently metric metadata is sent to remote storage.
        send_interval: String => "sendInterval",
    }
}

schema_object! {
    /// RemoteWriteSpec defines the configuration to write samples from Prometheus to a remote
    /// endpoint.
    pub struct RemoteWriteSpec {
        authorization: Authorization => "authorization",
        basic_auth: BasicAuth => "basicAuth",
        /// Bearer token for remote write.
        bearer_token: String => "bearerToken",
        /// File to read bearer token for remote write.
        bearer_token_file: String => "bearerTokenFile",
        /// Custom HTTP headers to be sent along with each remote write request. Be aware that
        /// headers that are set by Prometheus itself can't be overwritten.
        headers: BTreeMap<String, String> => "headers",
        metadata_config: MetadataConfig => "metadataConfig",
        /// The name of the remote write queue, it must be unique if specified.
        name: String => "name",
        oauth2: OAuth2 => "oauth2",
        proxy_url: String => "proxyUrl",
        queue_config: QueueConfig => "queueConfig",
        /// Timeout for requests to the remote write endpoint.
        remote_timeout: String => "remoteTimeout",
        send_exemplars: bool => "sendExemplars",
        send_native_histograms: bool => "sendNativeHistograms",
        sigv4: Sigv4 => "sigv4",
        tls_config: TlsConfig => "tlsConfig",
        /// The URL of the endpoint to send samples to.
        url: String => "url",
        /// The list of remote write relabel configurations.
        write_relabel_configs: Vec<RelabelConfig> => "writeRelabelConfigs",
    }
}

schema_object! {
    /// RemoteReadSpec defines the configuration for Prometheus to read back samples from a
    /// remote endpoint.
    pub struct RemoteReadSpec {
        authorization: Authorization => "authorization",
        basic_auth: BasicAuth => "basicAuth",
        bearer_token: String => "bearerToken",
        bearer_token_file: String => "bearerTokenFile",
        /// Whether to use the external labels as selectors for the remote read endpoint.
        filter_external_labels: bool => "filterExternalLabels",
        follow_redirects: bool => "followRedirects",
        headers: BTreeMap<String, String> => "headers",
        name: String => "name",
        oauth2: OAuth2 => "oauth2",
        proxy_url: String => "proxyUrl",
        /// Whether reads should be made for queries for time ranges that the local storage
        /// should have complete data for.
        read_recent: bool => "readRecent",
        remote_timeout: String => "remoteTimeout",
        /// An optional list of equality matchers which have to be present in a selector to
        /// query the remote read endpoint.
        required_matchers: BTreeMap<String, String> => "requiredMatchers",
        tls_config: TlsConfig => "tlsConfig",
        /// The URL of the endpoint to query from.
        url: String => "url",
    }
}

schema_object! {
    /// AlertmanagerEndpoints defines a selection of a single Endpoints object containing
    /// alertmanager IPs to fire alerts against.
    pub struct AlertmanagerEndpoints {
        /// Version of the Alertmanager API that Prometheus uses to send alerts. It can be "v1"
        /// or "v2".
        api_version: String => "apiVersion",
        authorization: SafeAuthorization => "authorization",
        basic_auth: BasicAuth => "basicAuth",
        bearer_token_file: String => "bearerTokenFile",
        /// Whether to enable HTTP2.
        enable_http2: bool => "enableHttp2",
        /// Name of Endpoints object in Namespace.
        name: String => "name",
        /// Namespace of Endpoints object.
        namespace: String => "namespace",
        /// Prefix for the HTTP path alerts are pushed to.
        path_prefix: String => "pathPrefix",
        /// Port the Alertmanager API is exposed on.
        port: IntOrString => "port",
        /// Scheme to use when firing alerts.
        scheme: String => "scheme",
        /// Timeout is a per-target Alertmanager timeout when pushing alerts.
        timeout: String => "timeout",
        tls_config: TlsConfig => "tlsConfig",
    }
}

schema_object! {
    pub struct AlertingSpec {
        /// AlertmanagerEndpoints Prometheus should fire alerts against.
        alertmanagers: Vec<AlertmanagerEndpoints> => "alertmanagers",
    }
}

schema_object! {
    /// APIServerConfig defines a host and auth methods to access apiserver.
    pub struct ApiServerConfig {
        authorization: Authorization => "authorization",
        basic_auth: BasicAuth => "basicAuth",
        bearer_token: String => "bearerToken",
        bearer_token_file: String => "bearerTokenFile",
        /// Host of apiserver. A valid string consisting of a hostname or IP followed by an
        /// optional port number
        host: String => "host",
        tls_config: TlsConfig => "tlsConfig",
    }
}

schema_object! {
    /// When true, ServiceMonitor, PodMonitor and Probe object are forbidden to reference
    /// arbitrary files on the file system of the 'prometheus' container.
    pub struct ArbitraryFsAccessThroughSms {
        deny: bool => "deny",
    }
}

schema_object! {
    pub struct Exemplars {
        /// Maximum number of exemplars stored in memory for all series.
        max_size: i64 => "maxSize",
    }
}

schema_object! {
    pub struct HostAlias {
        /// Hostnames for the above IP address.
        hostnames: Vec<String> => "hostnames",
        /// IP address of the host file entry.
        ip: String => "ip",
    }
}

schema_object! {
    /// ObjectReference references a PodMonitor, ServiceMonitor, Probe or PrometheusRule object.
    pub struct ObjectReference {
        group: String => "group",
        /// Name of the referent. When not set, all resources are matched.
        name: String => "name",
        namespace: String => "namespace",
        /// Resource of the referent.
        resource: String => "resource",
    }
}

schema_object! {
    pub struct PrometheusRuleExcludeConfig {
        /// RuleNamespace - name of excluded rule
        rule_name: String => "ruleName",
        /// RuleNamespace - namespace of excluded rule
        rule_namespace: String => "ruleNamespace",
    }
}

schema_object! {
    /// QuerySpec defines the query command line flags when starting Prometheus.
    pub struct QuerySpec {
        /// The delta difference allowed for retrieving metrics during expression evaluations.
        lookback_delta: String => "lookbackDelta",
        /// Number of concurrent queries that can be run at once.
        max_concurrency: i64 => "maxConcurrency",
        /// Maximum number of samples a single query can load into memory.
        max_samples: i64 => "maxSamples",
        /// Maximum time a query may take before being aborted.
        timeout: String => "timeout",
    }
}

schema_object! {
    pub struct PrometheusRuleAlerting {
        /// Minimum duration between alert and restored 'for' state.
        for_grace_period: String => "forGracePeriod",
        /// Max time to tolerate prometheus outage for restoring 'for' state of alert.
        for_outage_tolerance: String => "forOutageTolerance",
        /// Minimum amount of time to wait before resending an alert to Alertmanager.
        resend_delay: String => "resendDelay",
    }
}

schema_object! {
    /// /--rules.*/ command-line arguments.
    pub struct Rules {
        alert: PrometheusRuleAlerting => "alert",
    }
}

schema_object! {
    /// EmbeddedPersistentVolumeClaim is an embedded version of k8s.io/api/core/v1.PersistentVolumeClaim.
    pub struct EmbeddedPersistentVolumeClaim {
        api_version: String => "apiVersion",
        kind: String => "kind",
        metadata: EmbeddedObjectMetadata => "metadata",
        spec: PersistentVolumeClaimSpec => "spec",
        status: PersistentVolumeClaimStatus => "status",
    }
}

schema_object! {
    /// StorageSpec defines the configured storage for a group Prometheus servers.
    pub struct StorageSpec {
        /// Deprecated: subPath usage will be disabled by default in a future release.
        disable_mount_sub_path: bool => "disableMountSubPath",
        empty_dir: EmptyDirVolumeSource => "emptyDir",
        ephemeral: EphemeralVolumeSource => "ephemeral",
        /// A PVC spec to be used by the Prometheus StatefulSets.
        volume_claim_template: EmbeddedPersistentVolumeClaim => "volumeClaimTemplate",
    }
}

schema_object! {
    /// ThanosSpec defines parameters for a Prometheus server within a Thanos deployment.
    pub struct ThanosSpec {
        additional_args: Vec<Argument> => "additionalArgs",
        base_image: String => "baseImage",
        /// BlockDuration controls the size of TSDB blocks produced by Prometheus.
        block_size: String => "blockSize",
        /// If true, the Thanos sidecar listens on the loopback interface for the gRPC endpoints.
        grpc_listen_local: bool => "grpcListenLocal",
        /// GRPCServerTLSConfig configures the TLS parameters for the gRPC server providing the
        /// StoreAPI.
        grpc_server_tls_config: TlsConfig => "grpcServerTlsConfig",
        http_listen_local: bool => "httpListenLocal",
        /// Image if specified has precedence over baseImage, tag and sha combinations.
        image: String => "image",
        listen_local: bool => "listenLocal",
        log_format: String => "logFormat",
        log_level: String => "logLevel",
        /// MinTime for Thanos sidecar to be configured with.
        min_time: String => "minTime",
        /// ObjectStorageConfig configures object storage in Thanos.
        object_storage_config: SecretKeySelector => "objectStorageConfig",
        object_storage_config_file: String => "objectStorageConfigFile",
        ready_timeout: String => "readyTimeout",
        resources: ResourceRequirements => "resources",
        sha: String => "sha",
        tag: String => "tag",
        tracing_config: SecretKeySelector => "tracingConfig",
        tracing_config_file: String => "tracingConfigFile",
        /// Version describes the version of Thanos to use.
        version: String => "version",
        volume_mounts: Vec<VolumeMount> => "volumeMounts",
    }
}

schema_object! {
    pub struct TsdbSpec {
        /// Configures how old an out-of-order/out-of-bounds sample can be w.r.t. the TSDB max
        /// time.
        out_of_order_time_window: String => "outOfOrderTimeWindow",
    }
}

schema_object! {
    pub struct WebHttpHeaders {
        content_security_policy: String => "contentSecurityPolicy",
        strict_transport_security: String => "strictTransportSecurity",
        x_content_type_options: String => "xContentTypeOptions",
        x_frame_options: String => "xFrameOptions",
        x_xss_protection: String => "xXSSProtection",
    }
}

schema_object! {
    pub struct WebHttpConfig {
        headers: WebHttpHeaders => "headers",
        /// Enable HTTP/2 support.
        http2: bool => "http2",
    }
}

schema_object! {
    pub struct WebTlsConfig {
        /// Contains the TLS certificate for the server.
        cert: SecretOrConfigMap => "cert",
        cipher_suites: Vec<String> => "cipherSuites",
        client_auth_type: String => "clientAuthType",
        /// Contains the CA certificate for client certificate authentication to the server.
        client_ca: SecretOrConfigMap => "client_ca",
        curve_preferences: Vec<String> => "curvePreferences",
        /// Secret containing the TLS key for the server.
        key_secret: SecretKeySelector => "keySecret",
        max_version: String => "maxVersion",
        min_version: String => "minVersion",
        prefer_server_cipher_suites: bool => "preferServerCipherSuites",
    }
}

schema_object! {
    /// Defines the web command line flags when starting Prometheus.
    pub struct PrometheusWebSpec {
        http_config: WebHttpConfig => "httpConfig",
        /// Defines the maximum number of simultaneous connections.
        max_connections: i64 => "maxConnections",
        /// The prometheus web page title
        page_title: String => "pageTitle",
        tls_config: WebTlsConfig => "tlsConfig",
    }
}

schema_object! {
    /// Configures the OTLP exporter that Prometheus sends traces with.
    pub struct PrometheusTracingConfig {
        /// Client used to export the traces. Supported values are `http` or `grpc`.
        client_type: String => "clientType",
        /// Compression key for supported compression types. The only supported value is `gzip`.
        compression: String => "compression",
        /// Endpoint to send the traces to. Should be provided in format <host>:<port>.
        endpoint: String => "endpoint",
        /// Key-value pairs to be used as headers associated with gRPC or HTTP requests.
        headers: BTreeMap<String, String> => "headers",
        /// If disabled, the client will use a secure connection.
        insecure: bool => "insecure",
        /// Sets the probability a given trace will be sampled. Must be a float from 0 through 1.
        sampling_fraction: Value => "samplingFraction",
        /// Maximum time the exporter will wait for each batch export.
        timeout: String => "timeout",
        /// TLS Config to use when sending traces.
        tls_config: TlsConfig => "tlsConfig",
    }
}

schema_object! {
    pub struct PodMetadata {
        annotations: BTreeMap<String, String> => "annotations",
        labels: BTreeMap<String, String> => "labels",
        name: String => "name",
    }
}

schema_object! {
    /// Specification of the desired behavior of the Prometheus cluster.
    pub struct PrometheusSpec {
        /// AdditionalAlertManagerConfigs allows specifying a key of a Secret containing
        /// additional Prometheus AlertManager configurations.
        additional_alert_manager_configs: SecretKeySelector => "additionalAlertManagerConfigs",
        /// AdditionalAlertRelabelConfigs allows specifying a key of a Secret containing
        /// additional Prometheus alert relabel configurations.
        additional_alert_relabel_configs: SecretKeySelector => "additionalAlertRelabelConfigs",
        /// AdditionalArgs allows setting additional arguments for the Prometheus container.
        additional_args: Vec<Argument> => "additionalArgs",
        /// AdditionalScrapeConfigs allows specifying a key of a Secret containing additional
        /// Prometheus scrape configurations.
        additional_scrape_configs: SecretKeySelector => "additionalScrapeConfigs",
        /// If specified, the pod's scheduling constraints.
        affinity: Affinity => "affinity",
        /// Define details regarding alerting.
        alerting: AlertingSpec => "alerting",
        /// AllowOverlappingBlocks enables vertical compaction and vertical query merge in
        /// Prometheus.
        allow_overlapping_blocks: bool => "allowOverlappingBlocks",
        /// APIServerConfig allows specifying a host and auth methods to access apiserver.
        apiserver_config: ApiServerConfig => "apiserverConfig",
        arbitrary_fs_access_through_s_ms: ArbitraryFsAccessThroughSms => "arbitraryFSAccessThroughSMs",
        /// Base image to use for a Prometheus deployment.
        base_image: String => "baseImage",
        /// ConfigMaps is a list of ConfigMaps in the same namespace as the Prometheus object,
        /// which shall be mounted into the Prometheus Pods.
        config_maps: Vec<String> => "configMaps",
        /// Containers allows injecting additional containers or modifying operator generated
        /// containers.
        containers: Vec<Container> => "containers",
        disable_compaction: bool => "disableCompaction",
        /// Enable access to prometheus web admin API.
        enable_admin_api: bool => "enableAdminAPI",
        /// Enable access to Prometheus disabled features.
        enable_features: Vec<String> => "enableFeatures",
        /// Enable Prometheus to be used as a receiver for the Prometheus remote write protocol.
        enable_remote_write_receiver: bool => "enableRemoteWriteReceiver",
        enforced_body_size_limit: String => "enforcedBodySizeLimit",
        enforced_label_limit: i64 => "enforcedLabelLimit",
        enforced_label_name_length_limit: i64 => "enforcedLabelNameLengthLimit",
        enforced_label_value_length_limit: i64 => "enforcedLabelValueLengthLimit",
        /// EnforcedNamespaceLabel If set, a label will be added to all user-defined metrics
        /// and alerts.
        enforced_namespace_label: String => "enforcedNamespaceLabel",
        enforced_sample_limit: i64 => "enforcedSampleLimit",
        enforced_target_limit: i64 => "enforcedTargetLimit",
        /// Interval between consecutive evaluations. Default: '30s'
        evaluation_interval: String => "evaluationInterval",
        /// List of references to PodMonitor, ServiceMonitor, Probe and PrometheusRule objects
        /// to be excluded from enforcing a namespace label of origin.
        excluded_from_enforcement: Vec<ObjectReference> => "excludedFromEnforcement",
        exemplars: Exemplars => "exemplars",
        /// The labels to add to any time series or alerts when communicating with external
        /// systems.
        external_labels: BTreeMap<String, String> => "externalLabels",
        /// The external URL the Prometheus instances will be available under.
        external_url: String => "externalUrl",
        host_aliases: Vec<HostAlias> => "hostAliases",
        /// Use the host's network namespace if true.
        host_network: bool => "hostNetwork",
        ignore_namespace_selectors: bool => "ignoreNamespaceSelectors",
        /// Image if specified has precedence over baseImage, tag and sha combinations.
        image: String => "image",
        image_pull_policy: String => "imagePullPolicy",
        image_pull_secrets: Vec<LocalObjectReference> => "imagePullSecrets",
        init_containers: Vec<Container> => "initContainers",
        /// ListenLocal makes the Prometheus server listen on loopback.
        listen_local: bool => "listenLocal",
        log_format: String => "logFormat",
        log_level: String => "logLevel",
        min_ready_seconds: i64 => "minReadySeconds",
        /// Define which Nodes the Pods are scheduled on.
        node_selector: BTreeMap<String, String> => "nodeSelector",
        override_honor_labels: bool => "overrideHonorLabels",
        override_honor_timestamps: bool => "overrideHonorTimestamps",
        /// When a Prometheus deployment is paused, no actions except for deletion will be
        /// performed on the underlying objects.
        paused: bool => "paused",
        /// PodMetadata configures Labels and Annotations which are propagated to the
        /// prometheus pods.
        pod_metadata: PodMetadata => "podMetadata",
        pod_monitor_namespace_selector: LabelSelector => "podMonitorNamespaceSelector",
        /// *Experimental* PodMonitors to be selected for target discovery.
        pod_monitor_selector: LabelSelector => "podMonitorSelector",
        pod_target_labels: Vec<String> => "podTargetLabels",
        /// Port name used for the pods and governing service. Defaults to 'web'.
        port_name: String => "portName",
        priority_class_name: String => "priorityClassName",
        probe_namespace_selector: LabelSelector => "probeNamespaceSelector",
        probe_selector: LabelSelector => "probeSelector",
        /// Name of Prometheus external label used to denote Prometheus instance name.
        prometheus_external_label_name: String => "prometheusExternalLabelName",
        prometheus_rules_excluded_from_enforce: Vec<PrometheusRuleExcludeConfig> => "prometheusRulesExcludedFromEnforce",
        /// QuerySpec defines the query command line flags when starting Prometheus.
        query: QuerySpec => "query",
        query_log_file: String => "queryLogFile",
        /// remoteRead is the list of remote read configurations.
        remote_read: Vec<RemoteReadSpec> => "remoteRead",
        /// remoteWrite is the list of remote write configurations.
        remote_write: Vec<RemoteWriteSpec> => "remoteWrite",
        replica_external_label_name: String => "replicaExternalLabelName",
        /// Number of replicas of each shard to deploy for a Prometheus deployment.
        replicas: i64 => "replicas",
        /// Define resources requests and limits for single Pods.
        resources: ResourceRequirements => "resources",
        /// Time duration Prometheus shall retain data for. Default is '24h' if
        /// retentionSize is not set.
        retention: String => "retention",
        /// Maximum amount of disk space used by blocks.
        retention_size: String => "retentionSize",
        /// The route prefix Prometheus registers HTTP handlers for.
        route_prefix: String => "routePrefix",
        /// Namespaces to be selected for PrometheusRules discovery.
        rule_namespace_selector: LabelSelector => "ruleNamespaceSelector",
        /// A selector to select which PrometheusRules to mount for loading alerting/recording
        /// rules from.
        rule_selector: LabelSelector => "ruleSelector",
        rules: Rules => "rules",
        /// Namespaces to be selected for ScrapeConfig discovery.
        scrape_config_namespace_selector: LabelSelector => "scrapeConfigNamespaceSelector",
        /// *Experimental* ScrapeConfigs to be selected for target discovery.
        scrape_config_selector: LabelSelector => "scrapeConfigSelector",
        /// Interval between consecutive scrapes. Default: '30s'
        scrape_interval: String => "scrapeInterval",
        scrape_timeout: String => "scrapeTimeout",
        /// Secrets is a list of Secrets in the same namespace as the Prometheus object, which
        /// shall be mounted into the Prometheus Pods.
        secrets: Vec<String> => "secrets",
        /// SecurityContext holds pod-level security attributes and common container settings.
        security_context: PodSecurityContext => "securityContext",
        /// ServiceAccountName is the name of the ServiceAccount to use to run the Prometheus
        /// Pods.
        service_account_name: String => "serviceAccountName",
        /// Namespaces to be selected for ServiceMonitor discovery.
        service_monitor_namespace_selector: LabelSelector => "serviceMonitorNamespaceSelector",
        /// ServiceMonitors to be selected for target discovery.
        service_monitor_selector: LabelSelector => "serviceMonitorSelector",
        sha: String => "sha",
        /// EXPERIMENTAL: Number of shards to distribute targets onto.
        shards: i64 => "shards",
        /// Storage spec to specify how storage shall be used.
        storage: StorageSpec => "storage",
        tag: String => "tag",
        /// Thanos configuration allows configuring various aspects of a Prometheus server in a
        /// Thanos environment.
        thanos: ThanosSpec => "thanos",
        /// If specified, the pod's tolerations.
        tolerations: Vec<Toleration> => "tolerations",
        /// If specified, the pod's topology spread constraints.
        topology_spread_constraints: Vec<TopologySpreadConstraint> => "topologySpreadConstraints",
        /// Configures tracing in Prometheus.
        tracing_config: PrometheusTracingConfig => "tracingConfig",
        /// Defines the TSDB command line flags when starting Prometheus.
        tsdb: TsdbSpec => "tsdb",
        /// Version of Prometheus to be deployed.
        version: String => "version",
        /// VolumeMounts allows configuration of additional VolumeMounts on the output
        /// StatefulSet definition.
        volume_mounts: Vec<VolumeMount> => "volumeMounts",
        /// Volumes allows configuration of additional volumes on the output StatefulSet
        /// definition.
        volumes: Vec<Volume> => "volumes",
        /// Enable compression of the write-ahead log using Snappy.
        wal_compression: bool => "walCompression",
        /// Defines the web command line flags when starting Prometheus.
        web: PrometheusWebSpec => "web",
    }
}

/// Creates an unconfigured data source for `Prometheus` resources
pub fn data_source() -> PrometheusV1DataSource {
    CrdDataSource::new()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::datasource::{DataSource, ReadRequest, ResourceDocument};
    use crate::schema::{AttributeType, ToAttribute};
    use serde_json::json;

    #[test]
    fn data_source_has_the_expected_type_name() {
        assert_eq!(
            "k8s_monitoring_coreos_com_prometheus_v1",
            data_source().type_name("k8s")
        );
    }

    #[test]
    fn spec_schema_uses_snake_case_names_for_camel_case_properties() {
        let schema = data_source().schema();
        let cases: &[(&[&str], &str)] = &[
            (&["spec", "enable_admin_api"], "enableAdminAPI"),
            (&["spec", "arbitrary_fs_access_through_s_ms"], "arbitraryFSAccessThroughSMs"),
            (&["spec", "remote_write", "queue_config", "max_shards"], "maxShards"),
            (&["spec", "web", "tls_config", "client_ca"], "client_ca"),
            (&["spec", "alerting", "alertmanagers", "authorization", "type"], "type"),
            (&["spec", "scrape_config_selector", "match_labels"], "matchLabels"),
            (&["spec", "scrape_config_namespace_selector"], "scrapeConfigNamespaceSelector"),
            (&["spec", "tracing_config", "sampling_fraction"], "samplingFraction"),
            (&["spec", "remote_write", "send_native_histograms"], "sendNativeHistograms"),
        ];
        for (path, json_name) in cases.iter() {
            let attr = schema
                .attribute_at(path)
                .unwrap_or_else(|| panic!("missing attribute: {:?}", path));
            assert_eq!(*json_name, attr.json_key(), "json name of {:?}", path);
        }
    }

    #[test]
    fn pod_level_fields_are_dynamic() {
        let schema = data_source().schema();
        let containers = schema
            .attribute_at(&["spec", "containers"])
            .expect("containers missing");
        assert_eq!(AttributeType::list_of(AttributeType::Dynamic), containers.attribute_type);
        let affinity = schema
            .attribute_at(&["spec", "affinity"])
            .expect("affinity missing");
        assert_eq!(AttributeType::Dynamic, affinity.attribute_type);
    }

    #[test]
    fn alertmanager_port_accepts_numbers_and_names() {
        let spec: PrometheusSpec = serde_json::from_value(json!({
            "alerting": {
                "alertmanagers": [
                    {"name": "alertmanager-main", "namespace": "monitoring", "port": "web"},
                    {"name": "alertmanager-backup", "namespace": "monitoring", "port": 9093}
                ]
            }
        }))
        .expect("failed to deserialize spec");
        let managers = spec.alerting.and_then(|a| a.alertmanagers).expect("alertmanagers missing");
        assert_eq!(Some(IntOrString::String("web".to_owned())), managers[0].port);
        assert_eq!(Some(IntOrString::Int(9093)), managers[1].port);
    }

    #[test]
    fn unconfigured_prometheus_data_source_reports_unconfigured_client() {
        let response = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("failed to create runtime")
            .block_on(data_source().read_resource(ReadRequest::for_resource("monitoring", "k8s")));
        assert!(response.state.is_none());
        let errors = response.diagnostics.errors().collect::<Vec<_>>();
        assert_eq!(1, errors.len());
        assert_eq!("Unconfigured client", errors[0].summary);
    }

    #[test]
    fn prometheus_document_without_spec_deserializes() {
        let document: ResourceDocument<PrometheusSpec> = serde_json::from_value(json!({
            "apiVersion": "monitoring.coreos.com/v1",
            "kind": "Prometheus",
            "metadata": {"name": "k8s", "namespace": "monitoring"}
        }))
        .expect("failed to deserialize document");
        assert!(document.spec.is_none());
    }

    #[test]
    fn wrong_property_type_fails_to_deserialize() {
        let result = serde_json::from_value::<PrometheusSpec>(json!({"replicas": "two"}));
        assert!(result.is_err());
    }

    #[test]
    fn spec_schema_is_an_object() {
        match PrometheusSpec::attribute_type() {
            AttributeType::Object(attrs) => assert!(attrs.len() > 80, "only {} attributes", attrs.len()),
            other => panic!("expected an object, got: {:?}", other),
        }
    }
}
