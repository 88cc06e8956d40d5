//! Command Synthesiser (spec §4.C): turns a `CliDescriptor` + prompt + a
//! small context block into a concrete argv, deterministically.

pub mod skills;
pub mod synth;

pub use synth::{synthesise, SynthContext};
