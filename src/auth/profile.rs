//! Credential discovery.
//!
//! Credentials are resolved once at startup, in this order:
//!
//! 1. `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` from the environment,
//!    unless a profile is named explicitly
//! 2. The named profile in the shared credentials file
//!    (`AWS_SHARED_CREDENTIALS_FILE`, or `~/.aws/credentials`). Without the
//!    variable and a home directory there is no file to read.
//!
//! The region comes from an explicit override, then `AWS_REGION`, then
//! `AWS_DEFAULT_REGION`, then the profile's `region` key, and finally
//! [`Region::DEFAULT`].
//!
//! # Example
//!
//! ```rust
//! use apigate::auth::profile::parse_shared_credentials;
//!
//! let contents = "[default]\naws_access_key_id = AKID\naws_secret_access_key = secret\n";
//! let entry = parse_shared_credentials(contents, "default").unwrap();
//! assert_eq!(entry.access_key_id, "AKID");
//! ```

use std::path::{Path, PathBuf};

use crate::auth::Credentials;
use crate::config::{AccessKeyId, Region, SecretAccessKey};
use crate::error::ConfigError;

/// Environment variable holding the access key id.
pub const ACCESS_KEY_ID_VAR: &str = "AWS_ACCESS_KEY_ID";
/// Environment variable holding the secret access key.
pub const SECRET_ACCESS_KEY_VAR: &str = "AWS_SECRET_ACCESS_KEY";
/// Environment variable selecting the shared credentials profile.
pub const PROFILE_VAR: &str = "AWS_PROFILE";
/// Environment variable overriding the shared credentials file location.
pub const CREDENTIALS_FILE_VAR: &str = "AWS_SHARED_CREDENTIALS_FILE";
/// Profile used when none is selected.
pub const DEFAULT_PROFILE: &str = "default";
/// Location reported when no shared credentials file can be located.
const DEFAULT_CREDENTIALS_LOCATION: &str = "~/.aws/credentials";

const REGION_VARS: [&str; 2] = ["AWS_REGION", "AWS_DEFAULT_REGION"];

/// One profile section of a shared credentials file.
#[derive(Clone, PartialEq, Eq)]
pub struct ProfileEntry {
    /// `aws_access_key_id`
    pub access_key_id: String,
    /// `aws_secret_access_key`
    pub secret_access_key: String,
    /// `region`, when the profile sets one.
    pub region: Option<String>,
}

impl std::fmt::Debug for ProfileEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileEntry")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"*****")
            .field("region", &self.region)
            .finish()
    }
}

/// Resolves credentials from the process environment and the shared credentials file.
///
/// `profile` and `region` override `AWS_PROFILE` and the region variables. An
/// explicit `profile` also takes precedence over credential variables.
///
/// # Errors
///
/// Returns [`ConfigError::CredentialsNotFound`] when neither source yields
/// credentials, [`ConfigError::CredentialsFileUnreadable`] when the file exists
/// but cannot be read, or a validation error for malformed values.
pub fn load_credentials(
    profile: Option<&str>,
    region: Option<&str>,
) -> Result<Credentials, ConfigError> {
    let lookup = |name: &str| std::env::var(name).ok();
    let path = default_credentials_path(&lookup);
    load_credentials_with(&lookup, path.as_deref(), profile, region)
}

/// Resolves credentials using `lookup` in place of the process environment.
///
/// `credentials_file` is `None` when no shared credentials file location is
/// known; only the environment is consulted then.
///
/// # Errors
///
/// See [`load_credentials`].
pub fn load_credentials_with<F>(
    lookup: &F,
    credentials_file: Option<&Path>,
    profile: Option<&str>,
    region: Option<&str>,
) -> Result<Credentials, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let env_region = REGION_VARS
        .iter()
        .find_map(|name| lookup(name).filter(|value| !value.trim().is_empty()));
    let explicit_region = region.map(ToString::to_string).or(env_region);

    if profile.is_none() {
        if let Some(credentials) = from_lookup(lookup, explicit_region.as_deref())? {
            tracing::debug!("Using credentials from environment");
            return Ok(credentials);
        }
    }

    let profile = profile
        .map(ToString::to_string)
        .or_else(|| lookup(PROFILE_VAR))
        .unwrap_or_else(|| DEFAULT_PROFILE.to_string());

    let Some(credentials_file) = credentials_file else {
        return Err(ConfigError::CredentialsNotFound {
            profile,
            path: PathBuf::from(DEFAULT_CREDENTIALS_LOCATION),
        });
    };

    let credentials = load_profile(credentials_file, &profile, explicit_region.as_deref())?;
    tracing::debug!(profile = %profile, "Using credentials from shared credentials file");
    Ok(credentials)
}

/// Reads credentials from `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` via `lookup`.
///
/// Returns `Ok(None)` when the access key id variable is unset.
///
/// # Errors
///
/// Returns a validation error if the secret is missing or either value is empty.
pub fn from_lookup<F>(lookup: &F, region: Option<&str>) -> Result<Option<Credentials>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(access_key_id) = lookup(ACCESS_KEY_ID_VAR) else {
        return Ok(None);
    };
    let secret = lookup(SECRET_ACCESS_KEY_VAR).unwrap_or_default();

    Ok(Some(Credentials::from_parts(
        AccessKeyId::new(access_key_id)?,
        SecretAccessKey::new(secret)?,
        resolve_region(region, None)?,
    )))
}

/// Loads `profile` from a shared credentials file.
///
/// # Errors
///
/// Returns [`ConfigError::CredentialsNotFound`] if the file or profile does not
/// exist, [`ConfigError::CredentialsFileUnreadable`] if the file cannot be read,
/// or a validation error for malformed values.
pub fn load_profile(
    path: &Path,
    profile: &str,
    region: Option<&str>,
) -> Result<Credentials, ConfigError> {
    let not_found = || ConfigError::CredentialsNotFound {
        profile: profile.to_string(),
        path: path.to_path_buf(),
    };

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
        Err(e) => {
            return Err(ConfigError::CredentialsFileUnreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        }
    };

    let entry = parse_shared_credentials(&contents, profile).ok_or_else(not_found)?;

    Ok(Credentials::from_parts(
        AccessKeyId::new(entry.access_key_id)?,
        SecretAccessKey::new(entry.secret_access_key)?,
        resolve_region(region, entry.region.as_deref())?,
    ))
}

/// Parses one profile out of an INI-style shared credentials file.
///
/// Section headers may be written `[name]` or `[profile name]`. Lines starting
/// with `#` or `;` are comments. Returns `None` when the profile is absent or
/// lacks an access key id.
#[must_use]
pub fn parse_shared_credentials(contents: &str, profile: &str) -> Option<ProfileEntry> {
    let mut in_profile = false;
    let mut access_key_id = None;
    let mut secret_access_key = None;
    let mut region = None;

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let section = section.trim();
            let name = section.strip_prefix("profile ").unwrap_or(section).trim();
            in_profile = name == profile;
            continue;
        }

        if !in_profile {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim().to_string();
            match key.trim().to_lowercase().as_str() {
                "aws_access_key_id" => access_key_id = Some(value),
                "aws_secret_access_key" => secret_access_key = Some(value),
                "region" => region = Some(value),
                _ => {}
            }
        }
    }

    Some(ProfileEntry {
        access_key_id: access_key_id?,
        secret_access_key: secret_access_key.unwrap_or_default(),
        region,
    })
}

/// Returns the shared credentials file location.
///
/// Uses `AWS_SHARED_CREDENTIALS_FILE` when set, else `~/.aws/credentials`.
/// Returns `None` when the variable is unset and there is no home directory.
pub fn default_credentials_path<F>(lookup: &F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    credentials_path_in(lookup, dirs::home_dir())
}

fn credentials_path_in<F>(lookup: &F, home: Option<PathBuf>) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(CREDENTIALS_FILE_VAR)
        .filter(|path| !path.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| home.map(|home| home.join(".aws").join("credentials")))
}

fn resolve_region(explicit: Option<&str>, profile: Option<&str>) -> Result<Region, ConfigError> {
    explicit
        .or(profile)
        .map_or_else(|| Ok(Region::default()), Region::new)
}
