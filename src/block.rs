use crate::html::render_html;
use crate::machine::{BlockMachine, BlockState, FetchOutcome};
use crate::view::BlockView;
use crate::{
    Block, BlockConfig, BlockData, FetchFailure, Fetcher, HostApi, MetadataSource, Notification,
    PartialBlockData, PasteConfig, PreviewError,
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, instrument, warn};

/// Everything the host hands a block at construction.
pub struct BlockParams {
    pub data: PartialBlockData,
    pub config: BlockConfig,
    pub api: Arc<dyn HostApi>,
    pub read_only: bool,
}

impl BlockParams {
    pub fn new(config: BlockConfig, api: Arc<dyn HostApi>) -> Self {
        Self {
            data: PartialBlockData::default(),
            config,
            api,
            read_only: false,
        }
    }

    pub fn with_data(mut self, data: PartialBlockData) -> Self {
        self.data = data;
        self
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}

/// A link preview block bound to a host and a metadata source.
///
/// Clones share state, so a clone can drive a fetch while the host keeps
/// rendering through another handle.
#[derive(Clone)]
pub struct LinkPreviewBlock {
    machine: Arc<Mutex<BlockMachine>>,
    config: Arc<BlockConfig>,
    paste: Arc<PasteConfig>,
    api: Arc<dyn HostApi>,
    source: Arc<dyn MetadataSource>,
}

impl LinkPreviewBlock {
    pub fn new(params: BlockParams, source: Arc<dyn MetadataSource>) -> Self {
        let BlockParams {
            data,
            config,
            api,
            read_only,
        } = params;

        if let Err(e) = config.validate() {
            e.log();
        }

        let paste = config.paste_config().unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to default paste patterns");
            PasteConfig::default()
        });

        let machine = BlockMachine::new(data, read_only);
        debug!(state = ?machine.state(), read_only, "Link preview block constructed");

        Self {
            machine: Arc::new(Mutex::new(machine)),
            config: Arc::new(config),
            paste: Arc::new(paste),
            api,
            source,
        }
    }

    /// Builds a block that resolves metadata over HTTP.
    pub fn with_fetcher(params: BlockParams) -> Result<Self, PreviewError> {
        let fetcher = Fetcher::new()?;
        Ok(Self::new(params, Arc::new(fetcher)))
    }

    fn machine(&self) -> MutexGuard<'_, BlockMachine> {
        self.machine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &BlockConfig {
        &self.config
    }

    pub fn state(&self) -> BlockState {
        self.machine().state()
    }

    pub fn read_only(&self) -> bool {
        self.machine().read_only()
    }

    pub fn set_data(&self, update: PartialBlockData) {
        self.machine().set_data(update);
    }

    pub fn render_html(&self) -> String {
        render_html(&self.render(), self.api.block_style())
    }

    /// Requests metadata for `url` from the configured endpoint and applies
    /// the answer, unless a newer fetch was started in the meantime.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_metadata(&self, url: &str) -> FetchOutcome {
        let ticket = self.machine().begin_fetch(url);
        let ticket = match ticket {
            Ok(ticket) => ticket,
            Err(outcome) => return outcome,
        };

        let response = self
            .source
            .fetch_metadata(&self.config.endpoint, ticket.url())
            .await;

        let outcome = self.machine().complete_fetch(&ticket, response);
        if let FetchOutcome::Failed(failure) = &outcome {
            self.report(ticket.url(), failure);
        }
        outcome
    }

    /// Host-side dispatch: only pasted text matching a paste pattern starts
    /// a fetch.
    pub async fn handle_paste(&self, text: &str) -> FetchOutcome {
        match self.paste.matching_key(text) {
            Some(key) => {
                debug!(pattern = %key, "Paste claimed by link preview block");
                self.on_paste_url(text.trim()).await
            }
            None => FetchOutcome::Unclaimed,
        }
    }

    /// User pressed the cancel button on the preview.
    pub fn cancel(&self) -> bool {
        let cancelled = self.machine().cancel();
        if cancelled {
            debug!("Link preview cancelled");
        }
        cancelled
    }

    fn report(&self, url: &str, failure: &FetchFailure) {
        match failure {
            FetchFailure::Transport(e) => e.log(),
            other => warn!(url = %url, error = %other, "Link metadata unavailable"),
        }

        let message = self.api.translate(failure.message_key());
        self.api.notify(Notification::error(message));
    }
}

#[async_trait]
impl Block for LinkPreviewBlock {
    fn render(&self) -> BlockView {
        self.machine().view()
    }

    fn save(&self) -> BlockData {
        self.machine().data().clone()
    }

    fn validate(&self) -> bool {
        self.machine().validate()
    }

    async fn on_paste_url(&self, url: &str) -> FetchOutcome {
        self.fetch_metadata(url).await
    }

    fn paste_config(&self) -> &PasteConfig {
        &self.paste
    }
}
