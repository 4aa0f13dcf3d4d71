use crate::auth::RegistryCredentials;
use crate::builder::ImageBuilder;
use crate::engine::ContainerEngine;
use crate::error::{BuildError, BuildResult};
use crate::pusher::ImagePusher;
use crate::resolver::BuildSpec;
use async_trait::async_trait;
use bollard::Docker;
use bollard::auth::DockerCredentials;
use colored::Colorize;

/// Bollard 経由でローカルの Docker デーモンを操作するエンジン
pub struct DockerEngine {
    docker: Docker,
    builder: ImageBuilder,
    pusher: ImagePusher,
    credentials: Option<DockerCredentials>,
}

impl DockerEngine {
    pub fn new(docker: Docker) -> Self {
        Self {
            builder: ImageBuilder::new(docker.clone()),
            pusher: ImagePusher::new(docker.clone()),
            docker,
            credentials: None,
        }
    }

    /// Docker接続を初期化（接続テスト付き）
    pub async fn connect() -> BuildResult<Self> {
        let docker = Docker::connect_with_local_defaults().inspect_err(print_connection_help)?;
        docker.ping().await.inspect_err(print_connection_help)?;
        Ok(Self::new(docker))
    }
}

fn print_connection_help(e: &bollard::errors::Error) {
    eprintln!();
    eprintln!("{}", "✗ Docker connection error".red().bold());
    eprintln!();
    eprintln!("{}", "Cause:".yellow());
    eprintln!("  {}", e);
    eprintln!();
    eprintln!("{}", "How to fix:".yellow());
    eprintln!("  • Make sure the Docker daemon is running");
    eprintln!("  • Make sure `docker ps` works for the current user");
}

#[async_trait]
impl ContainerEngine for DockerEngine {
    async fn build(&self, spec: &BuildSpec, context: Vec<u8>) -> BuildResult<()> {
        self.builder.build_image(spec, context).await
    }

    async fn login(&mut self, credentials: RegistryCredentials) -> BuildResult<()> {
        if credentials.username.is_empty() || credentials.password.is_empty() {
            return Err(BuildError::AuthFailed {
                registry: credentials.server_address,
                message: "Empty username or password".to_string(),
            });
        }

        tracing::debug!("Logging into {}", credentials.server_address);
        self.credentials = Some(credentials.to_docker_credentials());
        Ok(())
    }

    async fn push(&self, image: &str, tag: &str) -> BuildResult<String> {
        self.pusher.push(image, tag, self.credentials.clone()).await
    }

    async fn remove_image(&self, image: &str, force: bool) -> BuildResult<()> {
        #[allow(deprecated)]
        let options = bollard::image::RemoveImageOptions {
            force,
            ..Default::default()
        };

        self.docker
            .remove_image(image, Some(options), None)
            .await
            .map_err(|e| BuildError::CleanupFailed {
                image: image.to_string(),
                message: e.to_string(),
            })?;

        tracing::debug!("Removed local image {}", image);
        Ok(())
    }
}
