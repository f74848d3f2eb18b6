//! Blueprint-driven API generation.
//!
//! [`BlueprintSource`] produces the API Blueprint text, [`parse_blueprint`]
//! turns it into a [`Blueprint`], and [`generate_api`] binds every
//! resource/action pair to a [`GeneratedMethod`] following the rules in
//! [`naming`].

mod generator;
mod loader;
pub mod naming;
mod parser;
pub mod types;

pub use generator::{generate_api, GeneratedApi, GeneratedMethod, MethodCall, Namespace};
pub use loader::{
    BlueprintConfig, BlueprintLoader, BlueprintSource, StaticBlueprint, BLUEPRINT_FILE,
    DEFAULT_BLUEPRINT_URL,
};
pub use parser::parse_blueprint;
pub use types::{Action, Blueprint, Parameter, Resource, ResourceGroup};
