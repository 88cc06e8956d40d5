//! CLI Registry (spec §4.A): static descriptors of known CLIs, layered
//! config loading, and per-CLI override application.

pub mod config;
pub mod descriptor;
pub mod registry;

pub use config::{load_layered, RegistryOverrides};
pub use descriptor::{AgentSkillCaps, CliDescriptor, CliDescriptorOverride, InvocationTemplate};
pub use registry::Registry;
