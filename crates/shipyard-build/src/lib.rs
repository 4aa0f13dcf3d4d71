//! shipyard Docker image build and push
//!
//! This crate resolves what to build, packs the build context,
//! builds the image, logs into the registry, pushes the image and removes
//! the local copy.

pub mod auth;
pub mod builder;
pub mod context;
pub mod docker;
pub mod engine;
pub mod error;
pub mod progress;
pub mod publisher;
pub mod pusher;
pub mod resolver;

pub use auth::{CredentialSource, RegistryCredentials};
pub use builder::ImageBuilder;
pub use context::ContextBuilder;
pub use docker::DockerEngine;
pub use engine::ContainerEngine;
pub use error::{BuildError, BuildResult};
pub use progress::BuildProgress;
pub use publisher::{Advisory, ImagePublisher, PublishOptions, PublishReport};
pub use pusher::{ImagePusher, validate_tag};
pub use resolver::{BuildResolver, BuildSpec, DOCKERFILE_PATH, IMAGE_TAG};
