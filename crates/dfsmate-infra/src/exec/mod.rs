//! Command execution against the namenode container.

mod docker;

pub use docker::DockerExecRunner;
