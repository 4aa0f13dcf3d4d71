use crate::error::{BuildError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// コンテキストからの相対パスで固定された Dockerfile の位置
pub const DOCKERFILE_PATH: &str = "assets/Dockerfile";

/// デプロイ時に常に使うイメージタグ
pub const IMAGE_TAG: &str = "latest";

/// 1回のビルドを完全に記述する設定
///
/// 構築後は変更しない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSpec {
    pub context_path: PathBuf,
    pub dockerfile_path: PathBuf,
    pub build_args: BTreeMap<String, String>,
    pub image_name: String,
    pub image_tag: String,
    pub platform: String,
}

impl BuildSpec {
    /// `{image_name}:{image_tag}` 形式の参照
    pub fn image_ref(&self) -> String {
        format!("{}:{}", self.image_name, self.image_tag)
    }

    /// Dockerfile の存在確認
    pub fn ensure_dockerfile(&self) -> Result<()> {
        if self.dockerfile_path.is_file() {
            Ok(())
        } else {
            Err(BuildError::DockerfileNotFound(self.dockerfile_path.clone()))
        }
    }

    /// コンテキストからの相対パス（Docker API の `dockerfile` オプション用）
    pub fn dockerfile_in_context(&self) -> Result<String> {
        let relative = self
            .dockerfile_path
            .strip_prefix(&self.context_path)
            .map_err(|_| {
                BuildError::InvalidConfig(format!(
                    "Dockerfile {} is outside of the build context {}",
                    self.dockerfile_path.display(),
                    self.context_path.display()
                ))
            })?;

        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Ok(parts.join("/"))
    }
}

pub struct BuildResolver {
    context_root: PathBuf,
}

impl BuildResolver {
    pub fn new(context_root: PathBuf) -> Self {
        Self { context_root }
    }

    /// ビルドコンテキストのパスを解決
    pub fn resolve_context(&self) -> Result<PathBuf> {
        let context = &self.context_root;

        if !context.exists() {
            return Err(BuildError::ContextNotFound(context.clone()));
        }

        if !context.is_dir() {
            return Err(BuildError::InvalidConfig(format!(
                "Build context is not a directory: {}",
                context.display()
            )));
        }

        Ok(context.clone())
    }

    /// Dockerfileのパス（存在確認はビルド直前に行う）
    pub fn dockerfile_path(&self, context: &Path) -> PathBuf {
        context.join(DOCKERFILE_PATH)
    }

    /// BuildSpec を組み立てる
    ///
    /// ビルド引数は `PLATFORM` と `ENVIRONMENT` の2つ。
    pub fn resolve(&self, image_name: &str, platform: &str, environment: &str) -> Result<BuildSpec> {
        let context_path = self.resolve_context()?;
        let dockerfile_path = self.dockerfile_path(&context_path);

        let mut build_args = BTreeMap::new();
        build_args.insert("PLATFORM".to_string(), platform.to_string());
        build_args.insert("ENVIRONMENT".to_string(), environment.to_string());

        let spec = BuildSpec {
            context_path,
            dockerfile_path,
            build_args,
            image_name: image_name.to_string(),
            image_tag: IMAGE_TAG.to_string(),
            platform: platform.to_string(),
        };

        tracing::info!(">> docker_context:    `{}`", spec.context_path.display());
        tracing::info!(">> docker_filepath:   `{}`", spec.dockerfile_path.display());
        tracing::info!(">> image_name:        `{}`", spec.image_name);
        tracing::info!(">> image_tag:         `{}`", spec.image_tag);

        Ok(spec)
    }
}
