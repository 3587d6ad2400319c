pub mod api;
pub mod error;

pub use api::{HttpTranslationApi, TranslationApi, TranslationReply, TranslationRequest};
pub use error::ClientError;
