use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// ビルド・プッシュ中のスピナー
pub struct BuildProgress {
    progress_bar: ProgressBar,
    stage: &'static str,
}

impl BuildProgress {
    pub fn new(image: &str) -> Self {
        Self::start("Build", image)
    }

    pub fn push(image: &str) -> Self {
        Self::start("Push", image)
    }

    fn start(stage: &'static str, image: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.set_message(format!("{} {}...", stage, image));
        pb.enable_steady_tick(Duration::from_millis(120));

        Self {
            progress_bar: pb,
            stage,
        }
    }

    pub fn set_message(&self, msg: &str) {
        self.progress_bar.set_message(msg.to_string());
    }

    pub fn finish_success(&self) {
        self.progress_bar
            .finish_with_message(format!("{} completed ✓", self.stage));
    }

    pub fn finish_error(&self, error: &str) {
        self.progress_bar
            .finish_with_message(format!("{} failed: {}", self.stage, error));
    }
}
