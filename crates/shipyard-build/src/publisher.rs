//! ビルド → 認証 → プッシュ → 後片付け のパイプライン
//!
//! 順序は固定。認証とローカルイメージ削除はベストエフォートで、失敗しても
//! 実行は止めずに [`Advisory`] として [`PublishReport`] に記録する。
//! それ以外の失敗はそのまま呼び出し元に返す。

use crate::auth::CredentialSource;
use crate::context::ContextBuilder;
use crate::engine::ContainerEngine;
use crate::error::BuildResult;
use crate::resolver::BuildSpec;

/// 実行を止めなかった失敗
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory {
    AuthenticationFailed(String),
    CleanupFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishOptions {
    pub push: bool,
    pub remove_image: bool,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            push: true,
            remove_image: true,
        }
    }
}

/// パイプラインの結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// ビルドしたイメージ（タグ込み）
    pub image: String,
    pub authenticated: bool,
    /// プッシュした完全なイメージ名
    pub pushed: Option<String>,
    pub removed: bool,
    pub advisories: Vec<Advisory>,
}

impl PublishReport {
    /// 助言的な失敗が1つもなかったか
    pub fn is_clean(&self) -> bool {
        self.advisories.is_empty()
    }
}

pub struct ImagePublisher<'a, E: ?Sized, R: ?Sized> {
    engine: &'a mut E,
    registry: &'a R,
}

impl<'a, E, R> ImagePublisher<'a, E, R>
where
    E: ContainerEngine + ?Sized,
    R: CredentialSource + ?Sized,
{
    pub fn new(engine: &'a mut E, registry: &'a R) -> Self {
        Self { engine, registry }
    }

    pub async fn publish(
        &mut self,
        spec: &BuildSpec,
        options: PublishOptions,
    ) -> BuildResult<PublishReport> {
        tracing::info!(">>> Building and pushing Docker image ....");

        let mut report = PublishReport {
            image: spec.image_ref(),
            ..Default::default()
        };

        // エンジンを呼ぶ前に確認する
        if let Err(e) = spec.ensure_dockerfile() {
            tracing::error!(">> Dockerfile `{}` does not exist!", spec.dockerfile_path.display());
            return Err(e);
        }

        let context = ContextBuilder::create_context(&spec.context_path)?;
        self.engine.build(spec, context).await?;

        tracing::info!(">>> Logging into Docker ....");
        match self.authenticate().await {
            Ok(()) => report.authenticated = true,
            Err(e) => {
                tracing::error!("Registry login failed: {}", e);
                report
                    .advisories
                    .push(Advisory::AuthenticationFailed(e.to_string()));
            }
        }
        tracing::info!(">>> Logging into Docker .... DONE");

        if options.push {
            tracing::info!(">> Pushing image to repository `{}` ...", spec.image_name);
            let pushed = self.engine.push(&spec.image_name, &spec.image_tag).await?;
            tracing::info!(">> Pushing image to repository `{}` ... DONE", spec.image_name);
            report.pushed = Some(pushed);
        }

        if options.remove_image {
            match self.engine.remove_image(&report.image, true).await {
                Ok(()) => report.removed = true,
                Err(e) => {
                    tracing::debug!("Ignoring cleanup failure: {}", e);
                    report.advisories.push(Advisory::CleanupFailed(e.to_string()));
                }
            }
        }

        tracing::info!(">>> Building and pushing Docker image .... DONE");
        Ok(report)
    }

    async fn authenticate(&mut self) -> BuildResult<()> {
        let credentials = self.registry.registry_credentials().await?;
        self.engine.login(credentials).await
    }
}
