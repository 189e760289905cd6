use crate::k8s_types::K8sType;

use prometheus::{
    exponential_buckets, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry,
};

use std::fmt::{self, Debug};

const METHOD_AND_STATUS: &[&str] = &["method", "status"];
const API_VERSION_AND_KIND: &[&str] = &["apiVersion", "kind"];

/// Status label used for requests that failed before a response was received
pub const NO_RESPONSE_STATUS: &str = "none";

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    api_server_request_times: Histogram,
    requests_by_status: IntCounterVec,
    reads_by_type: IntCounterVec,
    read_errors_by_type: IntCounterVec,
}

impl Debug for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Metrics")
    }
}

impl Default for Metrics {
    fn default() -> Metrics {
        Metrics::new()
    }
}

impl Metrics {
    pub fn new() -> Metrics {
        let registry = Registry::new();

        // 5ms .. ~10s
        let request_time_opts = HistogramOpts::new(
            "api_server_request_time",
            "Total time from sending the request to receiving the response headers",
        )
        .subsystem("client")
        .buckets(exponential_buckets(0.005, 2.0, 12).unwrap());
        let api_server_request_times = Histogram::with_opts(request_time_opts).unwrap();
        registry
            .register(Box::new(api_server_request_times.clone()))
            .unwrap();

        let request_opts = Opts::new(
            "api_server_requests",
            "number of requests sent to the api server by method and response status",
        )
        .subsystem("client");
        let requests_by_status = IntCounterVec::new(request_opts, METHOD_AND_STATUS).unwrap();
        registry
            .register(Box::new(requests_by_status.clone()))
            .unwrap();

        let read_opts = Opts::new("reads", "number of data source reads by resource type")
            .subsystem("datasource");
        let reads_by_type = IntCounterVec::new(read_opts, API_VERSION_AND_KIND).unwrap();
        registry.register(Box::new(reads_by_type.clone())).unwrap();

        let read_error_opts = Opts::new(
            "read_errors",
            "number of data source reads that produced an error diagnostic",
        )
        .subsystem("datasource");
        let read_errors_by_type = IntCounterVec::new(read_error_opts, API_VERSION_AND_KIND).unwrap();
        registry
            .register(Box::new(read_errors_by_type.clone()))
            .unwrap();

        Metrics {
            registry,
            api_server_request_times,
            requests_by_status,
            reads_by_type,
            read_errors_by_type,
        }
    }

    pub fn client_metrics(&self) -> ClientMetrics {
        ClientMetrics {
            api_server_request_times: self.api_server_request_times.clone(),
            requests_by_status: self.requests_by_status.clone(),
        }
    }

    pub fn data_source_metrics(&self, k8s_type: &K8sType) -> DataSourceMetrics {
        let api_version = k8s_type.format_api_version();
        let labels = &[api_version.as_str(), k8s_type.kind];
        DataSourceMetrics {
            reads: self.reads_by_type.with_label_values(labels),
            read_errors: self.read_errors_by_type.with_label_values(labels),
        }
    }

    /// Returns the number of requests with the given method and status that have been counted so far
    pub fn request_count(&self, method: &str, status: &str) -> u64 {
        self.requests_by_status
            .with_label_values(&[method, status])
            .get() as u64
    }

    pub fn encode_as_text(&self) -> Result<Vec<u8>, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::with_capacity(4096);
        encoder.encode(self.registry.gather().as_slice(), &mut buffer)?;
        Ok(buffer)
    }
}

#[derive(Clone)]
pub struct ClientMetrics {
    api_server_request_times: Histogram,
    requests_by_status: IntCounterVec,
}

impl Debug for ClientMetrics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("ClientMetrics")
    }
}

impl ClientMetrics {
    pub fn request_started(&self) -> prometheus::HistogramTimer {
        self.api_server_request_times.start_timer()
    }

    pub fn request_finished(&self, method: &str, status: &str) {
        self.requests_by_status
            .with_label_values(&[method, status])
            .inc();
    }
}

#[derive(Clone)]
pub struct DataSourceMetrics {
    reads: IntCounter,
    read_errors: IntCounter,
}

impl Debug for DataSourceMetrics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("DataSourceMetrics")
    }
}

impl DataSourceMetrics {
    pub fn read_started(&self) {
        self.reads.inc();
    }

    pub fn read_failed(&self) {
        self.read_errors.inc();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::k8s_types::monitoring_coreos_com::v1::Prometheus;

    #[test]
    fn metrics_are_created_successfully() {
        let _metrics = Metrics::new();
    }

    #[test]
    fn request_counts_are_tracked_by_method_and_status() {
        let metrics = Metrics::new();
        let client_metrics = metrics.client_metrics();
        client_metrics.request_finished("GET", "200");
        client_metrics.request_finished("GET", "200");
        client_metrics.request_finished("GET", "404");

        assert_eq!(2, metrics.request_count("GET", "200"));
        assert_eq!(1, metrics.request_count("GET", "404"));
        assert_eq!(0, metrics.request_count("GET", NO_RESPONSE_STATUS));
    }

    #[test]
    fn data_source_metrics_are_encoded_with_type_labels() {
        let metrics = Metrics::new();
        let ds_metrics = metrics.data_source_metrics(Prometheus);
        ds_metrics.read_started();
        ds_metrics.read_failed();

        let text = metrics.encode_as_text().expect("failed to encode metrics");
        let text = String::from_utf8(text).expect("metrics were not utf8");
        assert!(text.contains("datasource_reads"), "metrics text: {}", text);
        assert!(text.contains("monitoring.coreos.com/v1"), "metrics text: {}", text);
    }
}
