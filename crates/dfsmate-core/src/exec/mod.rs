//! Command construction and the execution seam.
//!
//! [`command`] builds allow-listed `hdfs` argv vectors; [`runner`] defines
//! the [`CommandRunner`] trait that infra implements with docker exec.

pub mod command;
pub mod runner;

pub use runner::{backoff_delay, CommandRunner, ExecOutput};
