use std::sync::Arc;

use crate::languages::LanguageRegistry;
use crate::ocr::TextExtractor;
use crate::providers::Provider;
use crate::settings;
use crate::translator::Translator;

pub(crate) struct ServerState<P: Provider> {
    pub(crate) settings: settings::Settings,
    pub(crate) registry: LanguageRegistry,
    pub(crate) extractor: Arc<dyn TextExtractor>,
    pub(crate) translator: Translator<P>,
    /// Rendered once at startup.
    pub(crate) client_html: String,
}
