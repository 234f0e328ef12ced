//! Documentation Q&A client library: HTTP query client, session state,
//! markdown answer rendering, and config. Used by the `doc-qa` binary.

pub mod client;
pub mod config;
pub mod messages;
pub mod render;
pub mod session;
pub mod view;

pub use client::{ClientError, QueryClient};
pub use config::{default_config_path, Config, ConfigError, ServerSection, UiSection};
pub use messages::{QueryResponse, FALLBACK_ANSWER};
pub use render::{AnswerRenderer, CodeHighlighter, CodeSpan, RenderOptions};
pub use session::{Session, SessionState};
pub use view::View;
