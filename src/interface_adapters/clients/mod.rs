// The clients defined here are reqwest clients for the backend and the analysis service.

mod analysis;
mod backend;

pub use analysis::AnalysisClient;
pub use backend::BackendClient;

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::domain::ClientError;
use crate::interface_adapters::protocol::ErrorEnvelope;
use crate::use_cases::Session;

fn transport(err: reqwest::Error) -> ClientError {
    ClientError::Transport(err.to_string())
}

fn decode(err: reqwest::Error) -> ClientError {
    ClientError::Decode(err.to_string())
}

// Attach the bearer header when the session holds a token.
fn authorize(request: RequestBuilder, session: &Session) -> RequestBuilder {
    match session.token() {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

// Send and turn non-2xx into `Upstream`, keeping the envelope message when there is one.
async fn send(request: RequestBuilder) -> Result<Response, ClientError> {
    let res = request.send().await.map_err(transport)?;
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let message = res
        .json::<ErrorEnvelope>()
        .await
        .ok()
        .and_then(|payload| payload.message);
    tracing::debug!(%status, ?message, "upstream returned an error.");
    Err(ClientError::Upstream {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T>(res: Response) -> Result<T, ClientError>
where
    T: DeserializeOwned,
{
    res.json::<T>().await.map_err(decode)
}

fn trim_base(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}
