//! CLI subcommand implementations

pub(crate) mod build;
pub(crate) mod info;
pub(crate) mod init;
pub(crate) mod probe;
