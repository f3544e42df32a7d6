use crate::utils::error::{Result, SiteError};
use crate::utils::validation::{self, Validate};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

/// `site.toml`. Every table and field has a default, so an empty file is a valid config.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SiteConfig {
    pub site: SiteInfo,
    pub enrollware: EnrollwareConfig,
    pub paths: PathsConfig,
    pub schedule: ScheduleConfig,
    pub landers: LandersConfig,
    pub prices: PricesConfig,
    pub homepage: HomepageConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteInfo {
    pub name: String,
    pub legal_name: String,
    pub home_url: String,
    pub phone: String,
    pub email: String,
    pub service_area: String,
    pub timezone: String,
    pub default_image: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            name: "910 CPR".to_string(),
            legal_name: "Coastal CPR Training".to_string(),
            home_url: "https://910cpr.com/".to_string(),
            phone: "(910) 395-5193".to_string(),
            email: "brian@910cpr.com".to_string(),
            service_area: "Wilmington, Burgaw, Jacksonville and across Southeastern North Carolina"
                .to_string(),
            timezone: "America/New_York".to_string(),
            default_image: "/images/910cpr-default-class.jpg".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrollwareConfig {
    pub base_url: String,
    pub schedule_url: String,
}

impl Default for EnrollwareConfig {
    fn default() -> Self {
        Self {
            base_url: "https://coastalcprtraining.enrollware.com/".to_string(),
            schedule_url: "https://coastalcprtraining.enrollware.com/schedule".to_string(),
        }
    }
}

/// Paths are relative to the repository root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub snapshot: String,
    pub schedule_json: String,
    pub output_dir: String,
    pub templates_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            snapshot: "docs/data/enrollware-schedule.html".to_string(),
            schedule_json: "docs/data/schedule.json".to_string(),
            output_dir: "docs".to_string(),
            templates_dir: "templates".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub max_sessions_per_course: usize,
    pub hide_past_sessions: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            max_sessions_per_course: 12,
            hide_past_sessions: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LandersConfig {
    pub future_sessions_limit: usize,
    pub other_classes_limit: usize,
    pub router_config: String,
}

impl Default for LandersConfig {
    fn default() -> Self {
        Self {
            future_sessions_limit: 5,
            other_classes_limit: 4,
            router_config: "landers.config.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricesConfig {
    pub cache: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub throttle_millis: u64,
}

impl Default for PricesConfig {
    fn default() -> Self {
        Self {
            cache: "docs/data/prices-cache.json".to_string(),
            user_agent: "910CPR-schedule-scraper/1.0 (+https://910cpr.com)".to_string(),
            timeout_seconds: 15,
            throttle_millis: 400,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HomepageConfig {
    pub template: String,
    pub output: String,
    /// Prefix rewrites applied to the finished page, e.g. forcing the legacy site to http.
    pub link_rewrites: BTreeMap<String, String>,
}

impl Default for HomepageConfig {
    fn default() -> Self {
        let mut link_rewrites = BTreeMap::new();
        link_rewrites.insert(
            "https://coastalcprtraining.com".to_string(),
            "http://coastalcprtraining.com".to_string(),
        );
        link_rewrites.insert(
            "https://www.coastalcprtraining.com".to_string(),
            "http://coastalcprtraining.com".to_string(),
        );
        Self {
            template: "docs/data/index-base.html".to_string(),
            output: "docs/index.html".to_string(),
            link_rewrites,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl SiteConfig {
    /// Loads `site.toml`; a missing file yields the built-in defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(SiteError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| SiteError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn timezone(&self) -> Tz {
        Tz::from_str(&self.site.timezone).unwrap_or(chrono_tz::America::New_York)
    }

    /// `docs/<rel>` under the configured output directory.
    pub fn output_path(&self, rel: &str) -> String {
        let dir = self.paths.output_dir.trim_end_matches('/');
        if dir.is_empty() {
            rel.to_string()
        } else {
            format!("{}/{}", dir, rel)
        }
    }

    pub fn template_path(&self, name: &str) -> String {
        format!("{}/{}", self.paths.templates_dir.trim_end_matches('/'), name)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.enabled
    }
}

impl Validate for SiteConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("site.name", &self.site.name)?;
        validation::validate_url("site.home_url", &self.site.home_url)?;
        validation::validate_timezone("site.timezone", &self.site.timezone)?;

        validation::validate_url("enrollware.base_url", &self.enrollware.base_url)?;
        validation::validate_url("enrollware.schedule_url", &self.enrollware.schedule_url)?;

        validation::validate_path("paths.snapshot", &self.paths.snapshot)?;
        validation::validate_path("paths.schedule_json", &self.paths.schedule_json)?;
        validation::validate_path("paths.output_dir", &self.paths.output_dir)?;
        validation::validate_path("paths.templates_dir", &self.paths.templates_dir)?;
        validation::validate_path("prices.cache", &self.prices.cache)?;
        validation::validate_path("homepage.template", &self.homepage.template)?;
        validation::validate_path("homepage.output", &self.homepage.output)?;

        validation::validate_positive_number(
            "schedule.max_sessions_per_course",
            self.schedule.max_sessions_per_course,
            1,
        )?;
        validation::validate_positive_number(
            "prices.timeout_seconds",
            self.prices.timeout_seconds as usize,
            1,
        )?;

        Ok(())
    }
}
