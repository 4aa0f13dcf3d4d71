//! レジストリへのプッシュ
//!
//! プッシュのストリームをレイヤーの状態ごとに数えながらスピナーに流し、
//! 最後に集計を1行ログに出す。

use crate::error::{BuildError, BuildResult};
use crate::progress::BuildProgress;
use bollard::Docker;
use bollard::auth::DockerCredentials;
use bollard::models::PushImageInfo;
use futures_util::StreamExt;
use std::fmt;

/// Docker タグの最大長
const MAX_TAG_LEN: usize = 128;

pub struct ImagePusher {
    docker: Docker,
}

/// ストリームから見えたレイヤーの状態の集計
#[derive(Debug, Default, PartialEq, Eq)]
struct PushTally {
    pushed: usize,
    existing: usize,
}

impl PushTally {
    /// 1行を記録し、スピナーに出す文字列を返す
    fn record(&mut self, info: &PushImageInfo) -> Option<String> {
        let status = info.status.as_deref()?;
        match status {
            "Pushed" => self.pushed += 1,
            "Layer already exists" => self.existing += 1,
            "Preparing" | "Waiting" => return None,
            _ => {}
        }

        match info.progress.as_deref() {
            Some(progress) if !progress.is_empty() => Some(format!("{} {}", status, progress)),
            _ => Some(status.to_string()),
        }
    }
}

impl fmt::Display for PushTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} layer(s) pushed, {} already present",
            self.pushed, self.existing
        )
    }
}

impl ImagePusher {
    pub fn new(docker: Docker) -> Self {
        Self { docker }
    }

    /// `image:tag` をプッシュし、完全なイメージ名を返す
    ///
    /// `credentials` が `None` ならデーモン側の認証設定に任せる。
    pub async fn push(
        &self,
        image: &str,
        tag: &str,
        credentials: Option<DockerCredentials>,
    ) -> BuildResult<String> {
        validate_tag(tag)?;
        let full_image = format!("{}:{}", image, tag);

        #[allow(deprecated)]
        let options = bollard::image::PushImageOptions::<String> {
            tag: tag.to_string(),
        };
        #[allow(deprecated)]
        let mut stream = self.docker.push_image(image, Some(options), credentials);

        let progress = BuildProgress::push(&full_image);
        let mut tally = PushTally::default();

        while let Some(item) = stream.next().await {
            let message = match item {
                Ok(info) => match info.error {
                    Some(error) => Some(error),
                    None => {
                        if let Some(line) = tally.record(&info) {
                            progress.set_message(&line);
                        }
                        None
                    }
                },
                Err(e) => Some(e.to_string()),
            };

            if let Some(message) = message {
                progress.finish_error(&message);
                return Err(BuildError::PushFailed { message });
            }
        }

        progress.finish_success();
        tracing::info!(">> Pushed `{}` ({})", full_image, tally);
        Ok(full_image)
    }
}

/// Docker タグの文法チェック
///
/// 128文字以下、`[A-Za-z0-9_.-]` のみ、先頭は `.` と `-` 以外。
pub fn validate_tag(tag: &str) -> BuildResult<()> {
    let invalid = |reason: String| -> BuildResult<()> { Err(BuildError::InvalidTag { tag: reason }) };

    if tag.is_empty() {
        return invalid("(empty)".to_string());
    }
    if tag.len() > MAX_TAG_LEN {
        return invalid(format!(
            "Tag too long ({} characters, max {})",
            tag.len(),
            MAX_TAG_LEN
        ));
    }
    if tag.starts_with(['.', '-']) {
        return invalid(tag.to_string());
    }
    match tag
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')))
    {
        Some(c) => invalid(format!("Invalid character '{}' in tag: {}", c, tag)),
        None => Ok(()),
    }
}
