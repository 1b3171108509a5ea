use std::sync::Arc;

use cookie::Cookie;
use http::header::{COOKIE, SET_COOKIE};
use http::{Request, Response};
use satchel::prelude::*;
use satchel::DEFAULT_COOKIE_NAME;
use satchel_store::MemoryStore;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// `/` counts visits, `/save` queues a flash notice, `/logout` destroys
/// the session. Anything else is declined.
async fn app(req: Request<()>) -> Option<Response<String>> {
    let ctx = req.session_context()?.clone();
    let notice = ctx
        .flash
        .get("notice")
        .and_then(|v| v.as_str())
        .map(|s| format!(" [flash: {s}]"))
        .unwrap_or_default();

    let (body, update) = match req.uri().path() {
        "/" => {
            let visits = ctx.session.get_as::<u64>("visits").unwrap_or(0) + 1;
            (
                format!("visit #{visits}{notice}"),
                session_assoc(&ctx.session, [("visits", visits)]),
            )
        }
        "/save" => (
            format!("saved{notice}"),
            flash_assoc(&ctx.session, [("notice", "your changes were saved")]),
        ),
        "/logout" => (format!("bye{notice}"), destroy_session()),
        _ => return None,
    };

    Some(Response::new(body).with_session_update(update))
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// A one-cookie browser: remembers the session cookie between requests.
#[derive(Default)]
struct Client {
    session_cookie: Option<String>,
}

impl Client {
    fn request(&self, path: &str) -> Result<Request<()>, http::Error> {
        let mut builder = Request::builder().uri(path);
        if let Some(value) = &self.session_cookie {
            builder = builder.header(COOKIE, format!("{DEFAULT_COOKIE_NAME}={value}"));
        }
        builder.body(())
    }

    fn absorb<B>(&mut self, response: &Response<B>) {
        let cookie = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| Cookie::parse(v.to_string()).ok())
            .find(|c| c.name() == DEFAULT_COOKIE_NAME);
        if let Some(cookie) = cookie {
            self.session_cookie = (!cookie.value().is_empty())
                .then(|| cookie.value().to_string());
        }
    }
}

async fn walk<H>(
    label: &str,
    mw: &SessionMiddleware<H>,
) -> Result<Vec<String>, Box<dyn std::error::Error>>
where
    H: Handler<(), ResBody = String>,
{
    let mut client = Client::default();
    let mut transcript = Vec::new();

    for path in ["/", "/", "/save", "/", "/", "/logout", "/", "/nowhere"] {
        let line = match mw.call(client.request(path)?).await? {
            Some(response) => {
                client.absorb(&response);
                response.into_body()
            }
            None => "404".to_string(),
        };
        println!("[{label}] GET {path:<8} → {line}");
        transcript.push(line);
    }

    Ok(transcript)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = SessionConfig {
        secret_key: std::env::var("SATCHEL_SECRET_KEY").ok(),
        ..SessionConfig::default()
    };

    let stateless = SessionMiddleware::builder()
        .config(config.clone())
        .build(handler_fn(app))?;
    walk("cookie", &stateless).await?;

    let store = Arc::new(MemoryStore::new());
    let server_side = SessionMiddleware::builder()
        .config(config)
        .backend(satchel::STORE_BACKEND)
        .store(Arc::clone(&store))
        .build(handler_fn(app))?;
    walk("store", &server_side).await?;

    tracing::info!(stored = store.len().await, "done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPECTED: [&str; 8] = [
        "visit #1",
        "visit #2",
        "saved",
        "visit #3 [flash: your changes were saved]",
        "visit #4",
        "bye",
        "visit #1",
        "404",
    ];

    #[tokio::test]
    async fn test_cookie_backend_transcript() {
        let mw = SessionMiddleware::builder().build(handler_fn(app)).unwrap();

        assert_eq!(walk("cookie", &mw).await.unwrap(), EXPECTED);
    }

    #[tokio::test]
    async fn test_store_backend_transcript() {
        let mw = SessionMiddleware::builder()
            .backend(satchel::STORE_BACKEND)
            .store(MemoryStore::new())
            .build(handler_fn(app))
            .unwrap();

        assert_eq!(walk("store", &mw).await.unwrap(), EXPECTED);
    }

    #[test]
    fn test_client_request_invalid_path_returns_error() {
        let client = Client {
            session_cookie: Some("abc".into()),
        };

        assert!(client.request("not a path").is_err());
        let request = client.request("/").unwrap();
        assert_eq!(
            request.headers()[COOKIE],
            format!("{DEFAULT_COOKIE_NAME}=abc").as_str()
        );
    }

    #[tokio::test]
    async fn test_store_backend_logout_empties_store() {
        let store = Arc::new(MemoryStore::new());
        let mw = SessionMiddleware::builder()
            .backend(satchel::STORE_BACKEND)
            .store(Arc::clone(&store))
            .build(handler_fn(app))
            .unwrap();

        walk("store", &mw).await.unwrap();

        // Only the session started after logout remains.
        assert_eq!(store.len().await, 1);
    }
}
