//! HTTP message types for `POST /query`. Client ↔ server JSON.

use serde::{Deserialize, Deserializer, Serialize};

/// Answer shown when a submission fails for any reason.
pub const FALLBACK_ANSWER: &str = "Sorry, an error occurred while processing your request.";

/// Client → server: query body.
#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest<'a> {
    pub question: &'a str,
}

impl<'a> QueryRequest<'a> {
    pub fn new(question: &'a str) -> Self {
        Self { question }
    }
}

/// Server → client: answer with its source citations.
///
/// Fields are not validated: a missing or `null` `answer` becomes empty and a
/// missing or `null` `sources` becomes an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub answer: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sources: Vec<String>,
}

impl QueryResponse {
    pub fn new(answer: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            answer: answer.into(),
            sources,
        }
    }

    /// The canned reply that replaces any failed submission.
    pub fn fallback() -> Self {
        Self::new(FALLBACK_ANSWER, Vec::new())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
