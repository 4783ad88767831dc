pub mod cache;
pub mod error;
pub mod escape;
pub mod materializer;
pub mod preview;
pub mod resolver;

pub use cache::TtlCache;
pub use error::ResolveError;
pub use escape::escape_js_string;
pub use materializer::ScriptMaterializer;
pub use preview::{render_preview_page, PreviewScript};
pub use resolver::{ConfigResolver, RateLimits, ResolvedEmbed};
