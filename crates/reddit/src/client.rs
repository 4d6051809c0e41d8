use {
    async_trait::async_trait,
    secrecy::{ExposeSecret, Secret},
    serde::Deserialize,
};

use parley_common::{Error, Result};

/// A new submission as fetched from a subreddit listing.
#[derive(Debug, Clone)]
pub struct Submission {
    pub id: String,
    pub author: String,
    pub title: String,
    pub selftext: String,
    pub created_utc: i64,
    pub score: i64,
    pub permalink: String,
}

/// A new comment as fetched from a subreddit comment listing.
#[derive(Debug, Clone)]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub body: String,
    pub created_utc: i64,
    pub score: i64,
    /// Fullname of the submission the comment belongs to (`t3_...`).
    pub link_id: String,
}

/// Transport boundary for the Reddit API.
#[async_trait]
pub trait RedditClient: Send + Sync {
    async fn new_submissions(&self, subreddit: &str) -> Result<Vec<Submission>>;
    async fn new_comments(&self, subreddit: &str) -> Result<Vec<Comment>>;
    /// Top-level comment on a submission.
    async fn comment_on(&self, submission_id: &str, body: &str) -> Result<()>;
    /// Reply to a comment.
    async fn reply_to(&self, comment_id: &str, body: &str) -> Result<()>;
    /// Private message to a user.
    async fn private_message(&self, username: &str, subject: &str, body: &str) -> Result<()>;
}

// ── HTTP client ─────────────────────────────────────────────────────────────

const READ_BASE: &str = "https://www.reddit.com";
const OAUTH_BASE: &str = "https://oauth.reddit.com";

#[derive(Debug, Deserialize)]
struct Listing<T> {
    data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
struct ListingData<T> {
    #[serde(default = "Vec::new")]
    children: Vec<Thing<T>>,
}

#[derive(Debug, Deserialize)]
struct Thing<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct RawSubmission {
    id: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    created_utc: f64,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    permalink: String,
}

#[derive(Debug, Deserialize)]
struct RawComment {
    id: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    created_utc: f64,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    link_id: String,
}

/// `RedditClient` over the public listing endpoints for reads and the OAuth
/// API for writes. Write calls fail cleanly when no access token is
/// configured.
pub struct HttpRedditClient {
    http: reqwest::Client,
    access_token: Option<Secret<String>>,
    read_base: String,
    oauth_base: String,
}

impl HttpRedditClient {
    pub fn new(user_agent: &str, access_token: Option<Secret<String>>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| Error::external("building http client", e))?;
        Ok(Self {
            http,
            access_token,
            read_base: READ_BASE.into(),
            oauth_base: OAUTH_BASE.into(),
        })
    }

    fn token(&self) -> Result<&Secret<String>> {
        self.access_token.as_ref().ok_or_else(|| {
            Error::adapter_internal("reddit", "write operations require an OAuth access token")
        })
    }

    async fn fetch_listing<T: serde::de::DeserializeOwned>(
        &self,
        subreddit: &str,
        tail: &str,
    ) -> Result<Vec<T>> {
        let url = format!("{}/r/{subreddit}/{tail}?limit=50", self.read_base);
        let listing: Listing<T> = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::external(format!("fetching r/{subreddit} {tail}"), e))?
            .error_for_status()
            .map_err(|e| Error::external(format!("fetching r/{subreddit} {tail}"), e))?
            .json()
            .await
            .map_err(|e| Error::external(format!("decoding r/{subreddit} {tail}"), e))?;
        Ok(listing.data.children.into_iter().map(|t| t.data).collect())
    }

    async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<()> {
        let token = self.token()?;
        let url = format!("{}{path}", self.oauth_base);
        self.http
            .post(&url)
            .bearer_auth(token.expose_secret())
            .form(form)
            .send()
            .await
            .map_err(|e| Error::external(format!("posting to {path}"), e))?
            .error_for_status()
            .map_err(|e| Error::external(format!("posting to {path}"), e))?;
        Ok(())
    }
}

#[async_trait]
impl RedditClient for HttpRedditClient {
    async fn new_submissions(&self, subreddit: &str) -> Result<Vec<Submission>> {
        let raw: Vec<RawSubmission> = self.fetch_listing(subreddit, "new.json").await?;
        Ok(raw
            .into_iter()
            .map(|s| Submission {
                id: s.id,
                author: s.author,
                title: s.title,
                selftext: s.selftext,
                created_utc: s.created_utc as i64,
                score: s.score,
                permalink: s.permalink,
            })
            .collect())
    }

    async fn new_comments(&self, subreddit: &str) -> Result<Vec<Comment>> {
        let raw: Vec<RawComment> = self.fetch_listing(subreddit, "comments.json").await?;
        Ok(raw
            .into_iter()
            .map(|c| Comment {
                id: c.id,
                author: c.author,
                body: c.body,
                created_utc: c.created_utc as i64,
                score: c.score,
                link_id: c.link_id,
            })
            .collect())
    }

    async fn comment_on(&self, submission_id: &str, body: &str) -> Result<()> {
        let thing_id = format!("t3_{submission_id}");
        self.post_form("/api/comment", &[("thing_id", thing_id.as_str()), ("text", body)])
            .await
    }

    async fn reply_to(&self, comment_id: &str, body: &str) -> Result<()> {
        let thing_id = format!("t1_{comment_id}");
        self.post_form("/api/comment", &[("thing_id", thing_id.as_str()), ("text", body)])
            .await
    }

    async fn private_message(&self, username: &str, subject: &str, body: &str) -> Result<()> {
        self.post_form(
            "/api/compose",
            &[("to", username), ("subject", subject), ("text", body)],
        )
        .await
    }
}
