#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::doc_markdown,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::return_self_not_must_use,
    clippy::uninlined_format_args,
    clippy::unused_async
)]

pub mod config;
pub mod gateway;
pub(crate) mod health;
pub mod sessions;

pub use config::Config;
