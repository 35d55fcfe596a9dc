// GNU Affero General Public License v3.0 or later (see LICENSE or https://www.gnu.org/licenses/agpl.txt)
//! Latest release lookup against the GitHub releases API
//!
//! A `ReleaseClient` is constructed once per run and handed to whoever needs
//! a version. The optional access token is sent only to the API host.

use attohttpc::Session;
use attohttpc::header::{ACCEPT, USER_AGENT};
use log::debug;
use semver::Version;
use serde::Deserialize;

use crate::error::ReleaseError;

/// Base URL of the GitHub REST API
pub const GITHUB_API_URL: &str = "https://api.github.com";

#[derive(Deserialize)]
struct LatestRelease {
    tag_name: Option<String>,
}

pub struct ReleaseClient {
    session: Session,
    api_url: String,
    token: Option<String>,
}

impl ReleaseClient {
    /// Client for the public GitHub API; without a token requests are
    /// unauthenticated and subject to stricter rate limits
    #[must_use]
    pub fn new(token: Option<String>) -> ReleaseClient {
        ReleaseClient::with_api_url(GITHUB_API_URL, token)
    }

    #[must_use]
    pub fn with_api_url(api_url: impl Into<String>, token: Option<String>) -> ReleaseClient {
        let mut session = Session::new();
        session.header(USER_AGENT, concat!("fabric8-setup/", env!("CARGO_PKG_VERSION")));
        session.header(ACCEPT, "application/vnd.github+json");

        ReleaseClient {
            session,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Fetch the latest published release of `owner/repo` and parse its tag
    ///
    /// # Errors
    /// Returns an error if the request fails, the repository has no release
    /// with a tag name, or the tag is not a semantic version
    pub fn latest_version(&self, owner: &str, repo: &str) -> Result<Version, ReleaseError> {
        let url = format!("{}/repos/{owner}/{repo}/releases/latest", self.api_url);
        debug!("Fetching release info from: {url}");

        let mut request = self.session.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.as_str());
        }
        let resp = request.send()?;

        if !resp.is_success() {
            return Err(ReleaseError::Status {
                url,
                status: resp.status().as_u16(),
            });
        }

        let release: LatestRelease = serde_json::from_str(&resp.text()?)?;
        let tag = release
            .tag_name
            .ok_or_else(|| ReleaseError::MissingTag {
                owner: owner.to_string(),
                repo: repo.to_string(),
            })?;

        parse_tag_version(&tag)
    }
}

/// Parse a release tag such as "v1.2.3" into a semantic version
///
/// A single leading `v` is stripped; the rest must be a full
/// `major.minor.patch` version.
///
/// # Errors
/// Returns `ReleaseError::InvalidTag` if the remainder is not a semantic version
///
/// # Examples
/// ```
/// use fabric8_setup::release::parse_tag_version;
///
/// assert_eq!(parse_tag_version("v1.2.3").unwrap(), semver::Version::new(1, 2, 3));
/// assert_eq!(parse_tag_version("1.2.3").unwrap(), semver::Version::new(1, 2, 3));
/// assert!(parse_tag_version("v1.2").is_err());
/// ```
pub fn parse_tag_version(tag: &str) -> Result<Version, ReleaseError> {
    let version = tag.strip_prefix('v').unwrap_or(tag);
    Version::parse(version).map_err(|source| ReleaseError::InvalidTag {
        tag: tag.to_string(),
        source,
    })
}
