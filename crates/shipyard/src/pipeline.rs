//! 1回の実行: 接続 → 環境変数チェック → メタデータ取得 → ビルド・プッシュ

use colored::Colorize;
use shipyard_build::{
    Advisory, BuildResolver, ContainerEngine, CredentialSource, DockerEngine, ImagePublisher,
    PublishOptions, PublishReport,
};
use shipyard_cloud_aws::{AwsClients, ParameterStore, fetch_registry_metadata};
use shipyard_config::{RunParameters, check_environment_variables};
use std::path::Path;

/// 実行前に設定されている必要がある環境変数（現在はなし）
const REQUIRED_VARIABLES: &[&str] = &[];

/// 外部サービスへのハンドル
pub struct ServiceHandles {
    pub registry: Box<dyn CredentialSource>,
    pub parameter_store: Box<dyn ParameterStore>,
    pub container_engine: Box<dyn ContainerEngine>,
}

impl ServiceHandles {
    /// `region` のAWSクライアントとローカルのDockerデーモンに接続
    pub async fn connect(region: &str) -> anyhow::Result<Self> {
        tracing::debug!("Connecting to AWS ({}) and the local Docker daemon", region);
        let aws = AwsClients::connect(region).await;
        let engine = DockerEngine::connect().await?;

        Ok(Self {
            registry: Box::new(aws.registry()),
            parameter_store: Box::new(aws.parameter_store()),
            container_engine: Box::new(engine),
        })
    }
}

pub async fn run(params: &RunParameters, context: &Path) -> anyhow::Result<PublishReport> {
    params.show();

    let mut handles = ServiceHandles::connect(&params.region_name).await?;
    let report = deploy(params, context, &mut handles, REQUIRED_VARIABLES).await?;

    print_summary(&report);
    Ok(report)
}

/// 接続済みのハンドルでイメージを公開する
pub async fn deploy(
    params: &RunParameters,
    context: &Path,
    handles: &mut ServiceHandles,
    required_variables: &[&str],
) -> anyhow::Result<PublishReport> {
    check_environment_variables(required_variables)?;

    let environment = params.environment.as_str();
    let metadata = fetch_registry_metadata(
        handles.parameter_store.as_ref(),
        &params.application_name,
        environment,
    )
    .await?;

    let spec = BuildResolver::new(context.to_path_buf()).resolve(
        &metadata.repository_uri,
        &params.platform,
        environment,
    )?;

    let options = PublishOptions {
        push: params.push_to_repo,
        remove_image: params.remove_image,
    };
    let report = ImagePublisher::new(handles.container_engine.as_mut(), handles.registry.as_ref())
        .publish(&spec, options)
        .await?;

    Ok(report)
}

fn print_summary(report: &PublishReport) {
    match &report.pushed {
        Some(image) => println!("{} {}", "✓ Pushed".green().bold(), image.cyan()),
        None => println!("{} {}", "✓ Built".green().bold(), report.image.cyan()),
    }

    for advisory in &report.advisories {
        let message = match advisory {
            Advisory::AuthenticationFailed(msg) => format!("registry login failed: {}", msg),
            Advisory::CleanupFailed(msg) => format!("local image was not removed: {}", msg),
        };
        println!("  {} {}", "⚠".yellow(), message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shipyard_build::{BuildError, BuildResult, BuildSpec, RegistryCredentials};
    use shipyard_cloud_aws::CloudError;
    use shipyard_config::{ConfigError, Environment};
    use std::collections::HashMap;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    type CallLog = Arc<Mutex<Vec<String>>>;

    struct FakeEngine {
        calls: CallLog,
        logged_in: bool,
    }

    #[async_trait]
    impl ContainerEngine for FakeEngine {
        async fn build(&self, spec: &BuildSpec, _context: Vec<u8>) -> BuildResult<()> {
            self.calls.lock().unwrap().push(format!("build {}", spec.image_ref()));
            Ok(())
        }

        async fn login(&mut self, credentials: RegistryCredentials) -> BuildResult<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("login {}", credentials.server_address));
            self.logged_in = true;
            Ok(())
        }

        async fn push(&self, image: &str, tag: &str) -> BuildResult<String> {
            self.calls.lock().unwrap().push(format!("push {}:{}", image, tag));
            if !self.logged_in {
                return Err(BuildError::PushFailed {
                    message: "no basic auth credentials".to_string(),
                });
            }
            Ok(format!("{}:{}", image, tag))
        }

        async fn remove_image(&self, image: &str, _force: bool) -> BuildResult<()> {
            self.calls.lock().unwrap().push(format!("remove {}", image));
            Ok(())
        }
    }

    struct FakeRegistry {
        fail: bool,
    }

    #[async_trait]
    impl CredentialSource for FakeRegistry {
        async fn registry_credentials(&self) -> BuildResult<RegistryCredentials> {
            if self.fail {
                return Err(BuildError::AuthFailed {
                    registry: "ecr".to_string(),
                    message: "AccessDeniedException".to_string(),
                });
            }
            Ok(RegistryCredentials {
                username: "AWS".to_string(),
                password: "secret".to_string(),
                server_address: "https://123.dkr.ecr.us-west-2.amazonaws.com".to_string(),
            })
        }
    }

    struct MemoryStore {
        values: HashMap<String, String>,
        calls: CallLog,
    }

    #[async_trait]
    impl ParameterStore for MemoryStore {
        async fn get_parameter(
            &self,
            name: &str,
            _with_decryption: bool,
        ) -> shipyard_cloud_aws::Result<String> {
            self.calls.lock().unwrap().push(format!("ssm {}", name));
            self.values
                .get(name)
                .cloned()
                .ok_or_else(|| CloudError::ParameterNotFound(name.to_string()))
        }
    }

    const REPO: &str = "123.dkr.ecr.us-west-2.amazonaws.com/demo";

    fn metadata_json() -> String {
        format!(
            r#"{{"ecr_repo": "{}", "ecr_registry_id": "123", "ecr_repository_name": "demo"}}"#,
            REPO
        )
    }

    fn context_with_dockerfile() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("assets")).unwrap();
        fs::write(dir.path().join("assets/Dockerfile"), "FROM alpine:3.20\n").unwrap();
        dir
    }

    fn handles(metadata: Option<String>, auth_fails: bool, calls: &CallLog) -> ServiceHandles {
        let mut values = HashMap::new();
        if let Some(raw) = metadata {
            values.insert("/demo/dev/config".to_string(), raw);
        }
        ServiceHandles {
            registry: Box::new(FakeRegistry { fail: auth_fails }),
            parameter_store: Box::new(MemoryStore {
                values,
                calls: calls.clone(),
            }),
            container_engine: Box::new(FakeEngine {
                calls: calls.clone(),
                logged_in: false,
            }),
        }
    }

    fn params(push_to_repo: bool, remove_image: bool) -> RunParameters {
        RunParameters {
            application_name: "demo".to_string(),
            region_name: "us-west-2".to_string(),
            environment: Environment::Dev,
            platform: "linux/amd64".to_string(),
            push_to_repo,
            remove_image,
        }
    }

    fn recorded(calls: &CallLog) -> Vec<String> {
        calls.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn test_deploy_pushes_and_cleans_up() {
        let dir = context_with_dockerfile();
        let calls = CallLog::default();
        let mut handles = handles(Some(metadata_json()), false, &calls);

        let report = deploy(&params(true, true), dir.path(), &mut handles, &[])
            .await
            .unwrap();

        assert_eq!(report.pushed.as_deref(), Some(&*format!("{}:latest", REPO)));
        assert!(report.removed);
        assert!(report.is_clean());
        assert_eq!(
            recorded(&calls),
            vec![
                "ssm /demo/dev/config".to_string(),
                format!("build {}:latest", REPO),
                "login https://123.dkr.ecr.us-west-2.amazonaws.com".to_string(),
                format!("push {}:latest", REPO),
                format!("remove {}:latest", REPO),
            ]
        );
    }

    #[tokio::test]
    async fn test_deploy_build_only() {
        let dir = context_with_dockerfile();
        let calls = CallLog::default();
        let mut handles = handles(Some(metadata_json()), false, &calls);

        let report = deploy(&params(false, false), dir.path(), &mut handles, &[])
            .await
            .unwrap();

        assert_eq!(report.pushed, None);
        assert!(!report.removed);
        let calls = recorded(&calls);
        assert!(calls.iter().any(|c| c.starts_with("build ")));
        assert!(!calls.iter().any(|c| c.starts_with("push ") || c.starts_with("remove ")));
    }

    #[tokio::test]
    async fn test_deploy_auth_failure_then_push_fails() {
        let dir = context_with_dockerfile();
        let calls = CallLog::default();
        let mut handles = handles(Some(metadata_json()), true, &calls);

        let err = deploy(&params(true, true), dir.path(), &mut handles, &[])
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::PushFailed { .. })
        ));
        let calls = recorded(&calls);
        assert!(calls.iter().any(|c| c.starts_with("build ")));
        assert!(!calls.iter().any(|c| c.starts_with("login ")));
        assert!(!calls.iter().any(|c| c.starts_with("remove ")));
    }

    #[tokio::test]
    async fn test_deploy_malformed_metadata_skips_build() {
        let dir = context_with_dockerfile();
        let calls = CallLog::default();
        let mut handles = handles(
            Some(r#"{"ecr_registry_id": "123", "ecr_repository_name": "demo"}"#.to_string()),
            false,
            &calls,
        );

        let err = deploy(&params(true, true), dir.path(), &mut handles, &[])
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<CloudError>(),
            Some(CloudError::MetadataMalformed { .. })
        ));
        assert_eq!(recorded(&calls), vec!["ssm /demo/dev/config".to_string()]);
    }

    #[tokio::test]
    async fn test_deploy_missing_metadata() {
        let dir = context_with_dockerfile();
        let calls = CallLog::default();
        let mut handles = handles(None, false, &calls);

        let err = deploy(&params(true, true), dir.path(), &mut handles, &[])
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<CloudError>(),
            Some(CloudError::MetadataNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_deploy_missing_dockerfile() {
        let dir = TempDir::new().unwrap();
        let calls = CallLog::default();
        let mut handles = handles(Some(metadata_json()), false, &calls);

        let err = deploy(&params(true, true), dir.path(), &mut handles, &[])
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::DockerfileNotFound(_))
        ));
        assert!(!recorded(&calls).iter().any(|c| c.starts_with("build ")));
    }

    #[tokio::test]
    async fn test_deploy_required_variable_missing() {
        let dir = context_with_dockerfile();
        let calls = CallLog::default();
        let mut handles = handles(Some(metadata_json()), false, &calls);

        let err = deploy(
            &params(true, true),
            dir.path(),
            &mut handles,
            &["SHIPYARD_TEST_SURELY_UNSET_VARIABLE"],
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MissingVariables(_))
        ));
        assert!(recorded(&calls).is_empty());
    }
}
