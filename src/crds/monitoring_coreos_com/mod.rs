pub mod prometheus_v1;
