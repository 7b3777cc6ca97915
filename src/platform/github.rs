//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{
    BranchProtection, CommitStatus, MergeRequest, MergeResult, PrComment, PullRequest,
    PullRequestDetails, RepositoryRef, Repository, Review, ReviewRequest,
};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

/// Public GitHub API origin
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Deserialize)]
struct ProtectionResponse {
    #[serde(default)]
    required_status_checks: Option<RequiredStatusChecks>,
    #[serde(default)]
    required_pull_request_reviews: Option<Value>,
}

#[derive(Deserialize)]
struct RequiredStatusChecks {
    #[serde(default)]
    strict: bool,
    #[serde(default)]
    contexts: Vec<String>,
}

impl From<ProtectionResponse> for BranchProtection {
    fn from(p: ProtectionResponse) -> Self {
        let (contexts, strict) = p
            .required_status_checks
            .map_or((Vec::new(), false), |c| (c.contexts, c.strict));
        // An empty object counts as "no review requirement"
        let requires_reviews = p
            .required_pull_request_reviews
            .is_some_and(|v| !v.as_object().is_some_and(serde_json::Map::is_empty));
        Self {
            required_status_check_contexts: contexts,
            strict_required: strict,
            requires_pull_request_reviews: requires_reviews,
        }
    }
}

#[derive(Deserialize)]
struct ContentResponse {
    download_url: Option<String>,
}

/// GitHub service using reqwest
pub struct GitHubService {
    client: Client,
    token: String,
    api_url: String,
}

impl GitHubService {
    /// Create a new GitHub service against the public API
    pub fn new(token: &str) -> Result<Self> {
        Self::with_api_url(token, DEFAULT_API_URL)
    }

    /// Create a new GitHub service against a custom API origin (GHE, tests)
    pub fn with_api_url(token: &str, api_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("justmerge/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            token: token.to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve a path against the API origin unless it is already absolute
    fn resolve_url(&self, path: &str) -> String {
        if url::Url::parse(path).is_ok() {
            path.to_string()
        } else {
            format!("{}{}", self.api_url, path)
        }
    }

    /// Issue an authenticated API call
    ///
    /// For `GET`, `params` (a JSON object) becomes the query string; for
    /// `POST`/`PUT` it is sent as the JSON body. Any non-2xx response turns
    /// into `Error::Remote`.
    pub async fn request(&self, method: Method, path: &str, params: Option<&Value>) -> Result<Value> {
        let url = self.resolve_url(path);
        debug!(%method, %url, "GitHub request");

        let mut builder = self
            .client
            .request(method.clone(), &url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");

        if method == Method::GET {
            if let Some(Value::Object(map)) = params {
                let query: Vec<(&str, String)> = map
                    .iter()
                    .map(|(k, v)| {
                        let v = v.as_str().map_or_else(|| v.to_string(), ToString::to_string);
                        (k.as_str(), v)
                    })
                    .collect();
                builder = builder.query(&query);
            }
        } else {
            builder = builder.json(params.unwrap_or(&json!({})));
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), %url, "GitHub request failed");
            return Err(Error::Remote {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }

    /// Issue an API call and decode the response into `T`
    async fn request_as<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: Option<&Value>,
    ) -> Result<T> {
        let value = self.request(method, path, params).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Download a URL as text, without credentials
    pub async fn fetch_raw(&self, url: &str) -> Result<String> {
        debug!(%url, "downloading raw content");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Remote {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.text().await?)
    }
}

fn repo_path(repo: &RepositoryRef) -> String {
    format!(
        "/repos/{}/{}",
        urlencoding::encode(&repo.owner),
        urlencoding::encode(&repo.name)
    )
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn get_repository(&self, repo: &RepositoryRef) -> Result<Repository> {
        debug!(%repo, "getting repository");
        match self.request_as(Method::GET, &repo_path(repo), None).await {
            Err(e) if e.is_not_found() => Err(Error::RepositoryNotFound(repo.to_string())),
            other => other,
        }
    }

    async fn get_branch_protection(
        &self,
        repo: &RepositoryRef,
        branch: &str,
    ) -> Result<Option<BranchProtection>> {
        debug!(%repo, branch, "getting branch protection");
        let path = format!(
            "{}/branches/{}/protection",
            repo_path(repo),
            urlencoding::encode(branch)
        );
        match self
            .request_as::<ProtectionResponse>(Method::GET, &path, None)
            .await
        {
            Ok(p) => Ok(Some(p.into())),
            Err(e) if e.is_not_found() => {
                debug!(%repo, branch, "no branch protection configured");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn get_file_content(&self, repo: &RepositoryRef, path: &str) -> Result<Option<String>> {
        debug!(%repo, path, "getting file content");
        let api_path = format!("{}/contents/{}", repo_path(repo), path.trim_start_matches('/'));
        let content = match self
            .request_as::<ContentResponse>(Method::GET, &api_path, None)
            .await
        {
            Ok(c) => c,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };

        // Directories and submodules have no download URL
        let Some(download_url) = content.download_url else {
            return Ok(None);
        };
        self.fetch_raw(&download_url).await.map(Some)
    }

    async fn list_open_pull_requests(&self, repo: &RepositoryRef) -> Result<Vec<PullRequest>> {
        debug!(%repo, "listing open PRs");
        let params = json!({"state": "open", "sort": "updated", "direction": "asc"});
        let prs: Vec<PullRequest> = self
            .request_as(Method::GET, &format!("{}/pulls", repo_path(repo)), Some(&params))
            .await?;
        debug!(%repo, count = prs.len(), "listed open PRs");
        Ok(prs)
    }

    async fn get_pr_details(&self, pr: &PullRequest) -> Result<PullRequestDetails> {
        debug!(pr_number = pr.number, "getting PR details");
        let details: PullRequestDetails = self.request_as(Method::GET, &pr.url, None).await?;
        debug!(
            pr_number = pr.number,
            mergeable = ?details.mergeable,
            mergeable_state = %details.mergeable_state,
            "got PR details"
        );
        Ok(details)
    }

    async fn list_statuses(&self, pr: &PullRequestDetails) -> Result<Vec<CommitStatus>> {
        debug!(pr_number = pr.number, "listing commit statuses");
        self.request_as(Method::GET, &pr.links.statuses.href, None)
            .await
    }

    async fn list_reviews(&self, pr: &PullRequestDetails) -> Result<Vec<Review>> {
        debug!(pr_number = pr.number, "listing reviews");
        self.request_as(Method::GET, &pr.reviews_url(), None).await
    }

    async fn create_review(
        &self,
        pr: &PullRequestDetails,
        review: &ReviewRequest,
    ) -> Result<Review> {
        debug!(pr_number = pr.number, event = %review.event, "creating review");
        let params = serde_json::to_value(review)?;
        self.request_as(Method::POST, &pr.reviews_url(), Some(&params))
            .await
    }

    async fn list_pr_comments(&self, pr: &PullRequestDetails) -> Result<Vec<PrComment>> {
        debug!(pr_number = pr.number, "listing PR comments");
        let comments: Vec<PrComment> = self
            .request_as(Method::GET, &pr.links.comments.href, None)
            .await?;
        debug!(pr_number = pr.number, count = comments.len(), "listed PR comments");
        Ok(comments)
    }

    async fn create_pr_comment(&self, pr: &PullRequestDetails, body: &str) -> Result<PrComment> {
        debug!(pr_number = pr.number, "creating PR comment");
        let params = json!({ "body": body });
        self.request_as(Method::POST, &pr.links.comments.href, Some(&params))
            .await
    }

    async fn merge_pr(
        &self,
        pr: &PullRequestDetails,
        request: &MergeRequest,
    ) -> Result<MergeResult> {
        debug!(pr_number = pr.number, method = %request.merge_method, "merging PR");
        let params = serde_json::to_value(request)?;
        let result: MergeResult = self
            .request_as(Method::PUT, &pr.merge_url(), Some(&params))
            .await?;
        debug!(
            pr_number = pr.number,
            merged = result.merged,
            sha = ?result.sha,
            "merge complete"
        );
        Ok(result)
    }
}
