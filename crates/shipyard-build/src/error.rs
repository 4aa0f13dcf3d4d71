use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Dockerfile not found: {0}")]
    DockerfileNotFound(PathBuf),

    #[error("Build context directory not found: {0}")]
    ContextNotFound(PathBuf),

    #[error("Docker connection error: {0}")]
    DockerConnection(#[from] bollard::errors::Error),

    #[error("Build failed: {0}")]
    BuildFailed(String),

    #[error("Registry authentication failed for {registry}: {message}")]
    AuthFailed { registry: String, message: String },

    #[error("Push failed: {message}")]
    PushFailed { message: String },

    #[error("Failed to remove image {image}: {message}")]
    CleanupFailed { image: String, message: String },

    #[error("Invalid tag: {tag}")]
    InvalidTag { tag: String },

    #[error("Invalid build configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    /// ユーザー向けの分かりやすいエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            BuildError::DockerfileNotFound(path) => {
                format!(
                    "Dockerfileが見つかりません: {}\n\
                     \n\
                     解決方法:\n\
                     1. --context で指定したディレクトリを確認してください\n\
                     2. Dockerfileは <context>/assets/Dockerfile に配置してください",
                    path.display()
                )
            }
            BuildError::BuildFailed(msg) => {
                format!(
                    "ビルドに失敗しました: {}\n\
                     \n\
                     Dockerfileの内容を確認してください。",
                    msg
                )
            }
            BuildError::ContextNotFound(path) => {
                format!(
                    "ビルドコンテキストが見つかりません: {}\n\
                     \n\
                     --context のパスを確認してください。",
                    path.display()
                )
            }
            BuildError::PushFailed { message } => {
                format!(
                    "プッシュに失敗しました: {}\n\
                     \n\
                     レジストリへのログインが成功しているか確認してください。",
                    message
                )
            }
            _ => format!("{}", self),
        }
    }
}

pub type BuildResult<T> = std::result::Result<T, BuildError>;
pub type Result<T> = BuildResult<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_dockerfile_not_found() {
        let err = BuildError::DockerfileNotFound(PathBuf::from("/app/assets/Dockerfile"));
        let msg = err.user_message();
        assert!(msg.contains("/app/assets/Dockerfile"));
        assert!(msg.contains("assets/Dockerfile"));
    }

    #[test]
    fn test_user_message_falls_back_to_display() {
        let err = BuildError::InvalidTag {
            tag: "-bad".to_string(),
        };
        assert_eq!(err.user_message(), "Invalid tag: -bad");
    }
}
