pub(crate) mod config;
pub(crate) mod repair;
pub(crate) mod sanitize;
pub(crate) mod score;
pub(crate) mod status;
