#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod assets;
pub mod builder;
pub mod context;
pub mod error;
pub mod meta;
pub mod modules;
pub mod resolve;
pub mod settings;

pub use builder::{BuildReport, UserscriptBuilder};
pub use context::{BuildContext, BuildStamp, COMBINED_SCRIPT_NAME, PluginWrapper};
pub use error::BundleError;
pub use resolve::{Token, resolve};
