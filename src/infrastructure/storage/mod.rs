pub mod local;

pub use local::{Artifact, ArtifactNames, LocalStorage};
