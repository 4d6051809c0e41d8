use {async_trait::async_trait, serde::Deserialize};

use parley_common::{Error, Result};

/// One post as fetched from a board, OP or reply.
#[derive(Debug, Clone)]
pub struct BoardPost {
    /// Post number.
    pub no: u64,
    /// Thread the post belongs to.
    pub thread_no: u64,
    /// 0 for an OP, otherwise the thread number being replied to.
    pub resto: u64,
    /// Poster name (usually "Anonymous").
    pub name: String,
    /// Post body. Left as-is; the board serves HTML-ish text.
    pub comment: String,
    /// Unix timestamp of the post.
    pub time: i64,
}

impl BoardPost {
    pub fn is_op(&self) -> bool {
        self.resto == 0
    }
}

/// Transport boundary for the imageboard API. The adapter never touches the
/// network directly, so tests drive it with a scripted implementation.
#[async_trait]
pub trait BoardClient: Send + Sync {
    /// Recently active posts on a board, in fetch order.
    async fn recent_posts(&self, board: &str) -> Result<Vec<BoardPost>>;

    /// Post `body` into a thread.
    async fn submit_post(&self, board: &str, thread_no: u64, body: &str) -> Result<()>;
}

// ── HTTP client for the public read API ─────────────────────────────────────

const API_BASE: &str = "https://a.4cdn.org";

#[derive(Debug, Deserialize)]
struct CatalogPage {
    #[serde(default)]
    threads: Vec<CatalogThread>,
}

#[derive(Debug, Deserialize)]
struct CatalogThread {
    no: u64,
    #[serde(default)]
    time: i64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    com: String,
    #[serde(default)]
    last_replies: Vec<CatalogReply>,
}

#[derive(Debug, Deserialize)]
struct CatalogReply {
    no: u64,
    #[serde(default)]
    resto: u64,
    #[serde(default)]
    time: i64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    com: String,
}

/// `BoardClient` backed by the public catalog JSON endpoint.
///
/// Reading is unauthenticated. Posting is captcha-gated upstream, so
/// `submit_post` reports failure rather than pretending; supply a
/// captcha-capable [`BoardClient`] to actually post.
pub struct HttpBoardClient {
    http: reqwest::Client,
    base: String,
}

impl HttpBoardClient {
    pub fn new(user_agent: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| Error::external("building http client", e))?;
        Ok(Self {
            http,
            base: API_BASE.into(),
        })
    }

    #[cfg(test)]
    fn with_base(user_agent: &str, base: impl Into<String>) -> Result<Self> {
        let mut client = Self::new(user_agent)?;
        client.base = base.into();
        Ok(client)
    }

    fn flatten(pages: Vec<CatalogPage>) -> Vec<BoardPost> {
        let mut posts = Vec::new();
        for page in pages {
            for thread in page.threads {
                posts.push(BoardPost {
                    no: thread.no,
                    thread_no: thread.no,
                    resto: 0,
                    name: thread.name,
                    comment: thread.com,
                    time: thread.time,
                });
                for reply in thread.last_replies {
                    posts.push(BoardPost {
                        no: reply.no,
                        thread_no: thread.no,
                        resto: reply.resto,
                        name: reply.name,
                        comment: reply.com,
                        time: reply.time,
                    });
                }
            }
        }
        posts
    }
}

#[async_trait]
impl BoardClient for HttpBoardClient {
    async fn recent_posts(&self, board: &str) -> Result<Vec<BoardPost>> {
        let url = format!("{}/{board}/catalog.json", self.base);
        let pages: Vec<CatalogPage> = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::external(format!("fetching /{board}/ catalog"), e))?
            .error_for_status()
            .map_err(|e| Error::external(format!("fetching /{board}/ catalog"), e))?
            .json()
            .await
            .map_err(|e| Error::external(format!("decoding /{board}/ catalog"), e))?;
        Ok(Self::flatten(pages))
    }

    async fn submit_post(&self, board: &str, _thread_no: u64, _body: &str) -> Result<()> {
        Err(Error::adapter_internal(
            format!("/{board}/"),
            "posting requires a captcha-capable BoardClient",
        ))
    }
}
