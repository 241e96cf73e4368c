//! Deployment configuration.
//!
//! The configuration is built once at process start and passed down to every
//! composition step. All validation happens here, so nothing downstream reads
//! the environment.

use crate::error::{BlueprintError, Result};

/// Environment variable holding the target AWS account id.
pub const ENV_ACCOUNT: &str = "AWS_ACCOUNT_ID";

/// Environment variable holding the target AWS region.
pub const ENV_REGION: &str = "AWS_REGION";

/// Environment variable selecting the environment profile.
pub const ENV_PROFILE: &str = "DEPLOY_PROFILE";

/// Environment profile selecting capacity strategy and add-on set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Profile {
    /// Development cluster on a spot managed node group.
    #[default]
    Dev,
    /// Production cluster on a self-managed scaling group.
    Prod,
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dev => write!(f, "dev"),
            Self::Prod => write!(f, "prod"),
        }
    }
}

impl std::str::FromStr for Profile {
    type Err = BlueprintError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dev" => Ok(Self::Dev),
            "prod" => Ok(Self::Prod),
            _ => Err(BlueprintError::UnknownProfile(s.to_string())),
        }
    }
}

/// Target environment for both stacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployConfig {
    /// AWS account id (12 digits).
    pub account: String,
    /// AWS region id (e.g., "us-east-1").
    pub region: String,
    /// Environment profile.
    pub profile: Profile,
}

impl DeployConfig {
    /// Create a validated configuration.
    ///
    /// # Errors
    /// Returns an error if the account id or region is malformed.
    pub fn new(
        account: impl Into<String>,
        region: impl Into<String>,
        profile: Profile,
    ) -> Result<Self> {
        let account = account.into();
        let region = region.into();

        if !is_valid_account(&account) {
            return Err(BlueprintError::InvalidAccount(account));
        }
        if !is_valid_region(&region) {
            return Err(BlueprintError::InvalidRegion(region));
        }

        Ok(Self {
            account,
            region,
            profile,
        })
    }

    /// Create configuration from environment variables.
    ///
    /// # Required Environment Variables
    /// - `AWS_ACCOUNT_ID`: target account
    /// - `AWS_REGION`: target region
    ///
    /// # Optional Environment Variables
    /// - `DEPLOY_PROFILE`: `dev` or `prod` (default: dev)
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or any value is invalid.
    pub fn from_env() -> Result<Self> {
        let profile = match std::env::var(ENV_PROFILE) {
            Ok(value) if !value.trim().is_empty() => value.parse()?,
            _ => Profile::default(),
        };

        Self::from_env_with(profile)
    }

    /// Read account and region from the environment with a profile the
    /// caller already resolved. `DEPLOY_PROFILE` is not consulted.
    ///
    /// # Errors
    /// Returns an error if account or region is missing or invalid.
    pub fn from_env_with(profile: Profile) -> Result<Self> {
        let account = read_env(ENV_ACCOUNT)?;
        let region = read_env(ENV_REGION)?;

        Self::new(account, region, profile)
    }

    /// Replace the profile, keeping account and region.
    #[must_use]
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    /// Availability zones used for zone-scoped resources (`a`, `b`, `c`).
    #[must_use]
    pub fn availability_zones(&self) -> Vec<String> {
        ["a", "b", "c"]
            .iter()
            .map(|suffix| format!("{}{suffix}", self.region))
            .collect()
    }
}

fn read_env(name: &'static str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(BlueprintError::MissingEnv(name)),
    }
}

fn is_valid_account(account: &str) -> bool {
    account.len() == 12 && account.bytes().all(|b| b.is_ascii_digit())
}

/// Region ids look like `us-east-1`, `ap-southeast-2` or `us-gov-west-1`.
fn is_valid_region(region: &str) -> bool {
    let parts: Vec<&str> = region.split('-').collect();
    if parts.len() < 3 {
        return false;
    }
    let Some((number, words)) = parts.split_last() else {
        return false;
    };
    !number.is_empty()
        && number.bytes().all(|b| b.is_ascii_digit())
        && words
            .iter()
            .all(|w| !w.is_empty() && w.bytes().all(|b| b.is_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        // SAFETY: callers run serially via #[serial] to avoid env var races
        unsafe {
            std::env::remove_var(ENV_ACCOUNT);
            std::env::remove_var(ENV_REGION);
            std::env::remove_var(ENV_PROFILE);
        }
    }

    #[test]
    fn test_new_validates_account() {
        assert!(DeployConfig::new("111111111111", "us-east-1", Profile::Dev).is_ok());
        assert!(matches!(
            DeployConfig::new("1111", "us-east-1", Profile::Dev),
            Err(BlueprintError::InvalidAccount(_))
        ));
        assert!(matches!(
            DeployConfig::new("11111111111a", "us-east-1", Profile::Dev),
            Err(BlueprintError::InvalidAccount(_))
        ));
    }

    #[test]
    fn test_new_validates_region() {
        for region in ["us-east-1", "eu-central-1", "us-gov-west-1", "ap-southeast-2"] {
            assert!(DeployConfig::new("111111111111", region, Profile::Dev).is_ok());
        }
        for region in ["", "us-east", "US-EAST-1", "us--1", "useast1"] {
            assert!(matches!(
                DeployConfig::new("111111111111", region, Profile::Dev),
                Err(BlueprintError::InvalidRegion(_))
            ));
        }
    }

    #[test]
    fn test_profile_parsing() {
        assert_eq!("dev".parse::<Profile>().unwrap(), Profile::Dev);
        assert_eq!("PROD".parse::<Profile>().unwrap(), Profile::Prod);
        assert!("staging".parse::<Profile>().is_err());
        assert_eq!(Profile::Prod.to_string(), "prod");
    }

    #[test]
    fn test_availability_zones() {
        let config = DeployConfig::new("111111111111", "us-east-1", Profile::Dev).unwrap();
        assert_eq!(
            config.availability_zones(),
            vec!["us-east-1a", "us-east-1b", "us-east-1c"]
        );
    }

    #[test]
    #[serial]
    fn test_from_env_requires_account() {
        clear_env();
        // SAFETY: This test runs serially via #[serial] to avoid env var races
        unsafe {
            std::env::set_var(ENV_REGION, "us-east-1");
        }
        assert!(matches!(
            DeployConfig::from_env(),
            Err(BlueprintError::MissingEnv(ENV_ACCOUNT))
        ));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_requires_region() {
        clear_env();
        // SAFETY: This test runs serially via #[serial] to avoid env var races
        unsafe {
            std::env::set_var(ENV_ACCOUNT, "111111111111");
        }
        assert!(matches!(
            DeployConfig::from_env(),
            Err(BlueprintError::MissingEnv(ENV_REGION))
        ));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_reads_profile() {
        clear_env();
        // SAFETY: This test runs serially via #[serial] to avoid env var races
        unsafe {
            std::env::set_var(ENV_ACCOUNT, "111111111111");
            std::env::set_var(ENV_REGION, "us-east-1");
            std::env::set_var(ENV_PROFILE, "prod");
        }
        let config = DeployConfig::from_env().unwrap();
        assert_eq!(config.account, "111111111111");
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.profile, Profile::Prod);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_with_ignores_profile_variable() {
        clear_env();
        // SAFETY: This test runs serially via #[serial] to avoid env var races
        unsafe {
            std::env::set_var(ENV_ACCOUNT, "111111111111");
            std::env::set_var(ENV_REGION, "us-east-1");
            std::env::set_var(ENV_PROFILE, "staging");
        }
        assert!(matches!(
            DeployConfig::from_env(),
            Err(BlueprintError::UnknownProfile(_))
        ));
        let config = DeployConfig::from_env_with(Profile::Prod).unwrap();
        assert_eq!(config.profile, Profile::Prod);
        clear_env();
    }
}
