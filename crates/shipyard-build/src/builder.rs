use crate::error::{BuildError, Result};
use crate::progress::BuildProgress;
use crate::resolver::BuildSpec;
use bollard::Docker;
use colored::Colorize;
use futures_util::stream::StreamExt;
use std::collections::HashMap;

pub struct ImageBuilder {
    docker: Docker,
}

impl ImageBuilder {
    pub fn new(docker: Docker) -> Self {
        Self { docker }
    }

    /// イメージをビルド
    ///
    /// キャッシュは使わず、中間コンテナも残す。
    pub async fn build_image(&self, spec: &BuildSpec, context_data: Vec<u8>) -> Result<()> {
        let tag = spec.image_ref();
        let dockerfile = spec.dockerfile_in_context()?;
        tracing::info!(">> Building docker image: `{}` ...", spec.image_name);

        // build_argsを&str型に変換
        let build_args_refs: HashMap<&str, &str> = spec
            .build_args
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        #[allow(deprecated)]
        let options = bollard::image::BuildImageOptions {
            dockerfile: dockerfile.as_str(),
            t: tag.as_str(),
            buildargs: build_args_refs,
            platform: spec.platform.as_str(),
            nocache: true,
            rm: false,
            ..Default::default()
        };

        tracing::debug!("Build options: {:?}", options);
        tracing::debug!("Build args: {:?}", spec.build_args);

        // ビルドストリームの開始
        use bytes::Bytes;
        use http_body_util::{Either, Full};
        let body = Full::new(Bytes::from(context_data));
        let mut stream = self
            .docker
            .build_image(options, None, Some(Either::Left(body)));

        let progress = BuildProgress::new(&tag);

        while let Some(msg) = stream.next().await {
            let result = match msg {
                Ok(output) => self.handle_build_output(output, &progress),
                Err(e) => Err(BuildError::DockerConnection(e)),
            };
            if let Err(e) = result {
                progress.finish_error(&e.to_string());
                return Err(e);
            }
        }

        progress.finish_success();
        tracing::info!(">> Building docker image: `{}` ... DONE", spec.image_name);
        Ok(())
    }

    /// ビルド出力の処理
    fn handle_build_output(
        &self,
        output: bollard::models::BuildInfo,
        progress: &BuildProgress,
    ) -> Result<()> {
        if let Some(stream) = output.stream {
            let line = stream.trim();
            if !line.is_empty() {
                tracing::debug!("{}", line);
                progress.set_message(line);
            }
        }

        if let Some(error) = output.error {
            return Err(BuildError::BuildFailed(error));
        }

        if let Some(error_detail) = output.error_detail {
            let error_msg = error_detail
                .message
                .unwrap_or_else(|| "Unknown build error".to_string());
            return Err(BuildError::BuildFailed(error_msg));
        }

        if let Some(status) = output.status {
            progress.set_message(&status.cyan().to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextBuilder;
    use crate::resolver::BuildResolver;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    #[ignore] // Docker接続が必要なため、通常のテストではスキップ
    async fn test_build_simple_image() {
        let docker = Docker::connect_with_local_defaults().unwrap();
        let builder = ImageBuilder::new(docker.clone());

        let temp_dir = tempdir().unwrap();
        fs::create_dir(temp_dir.path().join("assets")).unwrap();
        fs::write(
            temp_dir.path().join("assets/Dockerfile"),
            "FROM alpine:latest\nARG PLATFORM\nARG ENVIRONMENT\nCMD echo $ENVIRONMENT",
        )
        .unwrap();

        let spec = BuildResolver::new(temp_dir.path().to_path_buf())
            .resolve("shipyard-test", "linux/amd64", "dev")
            .unwrap();
        let context_data = ContextBuilder::create_context(&spec.context_path).unwrap();

        let result = builder.build_image(&spec, context_data).await;
        assert!(result.is_ok());

        #[allow(deprecated)]
        let options = bollard::image::RemoveImageOptions {
            force: true,
            ..Default::default()
        };
        docker
            .remove_image("shipyard-test:latest", Some(options), None)
            .await
            .ok();
    }
}
