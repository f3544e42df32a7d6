use chrono::{DateTime, Utc};
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub exists: bool,
    pub bytes: u64,
    pub md5: Option<String>,
}

impl FileInfo {
    /// `None` means the file does not exist.
    pub fn from_contents(contents: Option<&[u8]>) -> Self {
        match contents {
            Some(data) => Self {
                exists: true,
                bytes: data.len() as u64,
                md5: Some(format!("{:x}", Md5::digest(data))),
            },
            None => Self {
                exists: false,
                bytes: 0,
                md5: None,
            },
        }
    }

    pub fn is_complete(&self) -> bool {
        self.exists && self.bytes > 0
    }

    fn summary(&self) -> String {
        format!("{}/{}B", if self.exists { "Y" } else { "N" }, self.bytes)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubInfo {
    pub sha: Option<String>,
    pub run_id: Option<String>,
    pub repo: Option<String>,
}

impl GithubInfo {
    pub fn from_env() -> Self {
        Self {
            sha: std::env::var("GITHUB_SHA").ok(),
            run_id: std::env::var("GITHUB_RUN_ID").ok(),
            repo: std::env::var("GITHUB_REPOSITORY").ok(),
        }
    }
}

/// `status.json`: a health snapshot of the two pipeline inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    pub updated_at: String,
    pub snapshot: FileInfo,
    pub schedule: FileInfo,
    pub github: GithubInfo,
}

impl StatusReport {
    pub fn new(snapshot: FileInfo, schedule: FileInfo, github: GithubInfo, now: DateTime<Utc>) -> Self {
        Self {
            updated_at: now.to_rfc3339(),
            snapshot,
            schedule,
            github,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.snapshot.is_complete() && self.schedule.is_complete()
    }

    pub fn summary_line(&self) -> String {
        format!(
            "status: {} (snapshot:{}, schedule:{})",
            if self.is_ok() { "OK" } else { "INCOMPLETE" },
            self.snapshot.summary(),
            self.schedule.summary()
        )
    }
}
