//! Test suites for the daemon library.

pub(crate) mod support;
