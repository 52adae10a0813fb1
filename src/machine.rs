//! Block lifecycle state machine.
//!
//! [`BlockMachine`] owns the block's data and decides every transition, but
//! performs no I/O: the orchestrator asks it for a [`FetchTicket`], runs the
//! request, and hands the result back through [`BlockMachine::complete_fetch`].
//! Tickets let late responses for superseded pastes be recognised and
//! dropped.

use crate::utils::link_label;
use crate::view::{Anchor, BlockView, Content, Loader, PreviewCard};
use crate::{BlockData, EndpointResponse, FetchFailure, PartialBlockData, PreviewError};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    Empty,
    BareLink,
    Loading,
    Preview,
}

/// Identifies one issued fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    url: String,
}

impl FetchTicket {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Result of feeding an event through the machine.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Metadata was stored.
    Applied,
    /// The fetch failed; the block fell back to a bare link.
    Failed(FetchFailure),
    /// A newer paste or a link change superseded this fetch; its response
    /// was discarded.
    Stale,
    /// The block is read-only and ignored the request.
    Suppressed,
    /// The pasted text was blank or matched none of the paste patterns.
    Unclaimed,
}

impl FetchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, FetchOutcome::Applied)
    }
}

#[derive(Debug, Clone)]
pub struct BlockMachine {
    data: BlockData,
    read_only: bool,
    pending: Option<FetchTicket>,
    issued: u64,
    errored: bool,
}

impl BlockMachine {
    pub fn new(saved: PartialBlockData, read_only: bool) -> Self {
        Self {
            data: BlockData::from_saved(saved),
            read_only,
            pending: None,
            issued: 0,
            errored: false,
        }
    }

    pub fn data(&self) -> &BlockData {
        &self.data
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }

    pub fn pending(&self) -> Option<&FetchTicket> {
        self.pending.as_ref()
    }

    pub fn errored(&self) -> bool {
        self.errored
    }

    pub fn state(&self) -> BlockState {
        if self.pending.is_some() {
            BlockState::Loading
        } else if !self.data.meta.is_empty() {
            BlockState::Preview
        } else if self.data.link.is_empty() {
            BlockState::Empty
        } else {
            BlockState::BareLink
        }
    }

    pub fn set_data(&mut self, update: PartialBlockData) {
        self.data.merge(update);
    }

    pub fn validate(&self) -> bool {
        self.data.has_link()
    }

    /// Starts a fetch for `url`: clears error styling, stores the link and
    /// marks the block as loading. Read-only blocks and blank URLs get no
    /// ticket.
    pub fn begin_fetch(&mut self, url: &str) -> Result<FetchTicket, FetchOutcome> {
        if self.read_only {
            debug!(url = %url, "Read-only block ignores paste");
            return Err(FetchOutcome::Suppressed);
        }

        let url = url.trim();
        if url.is_empty() {
            debug!("Blank paste ignored");
            return Err(FetchOutcome::Unclaimed);
        }

        self.errored = false;
        self.issued += 1;
        self.data.merge(PartialBlockData::link(url));

        let ticket = FetchTicket {
            seq: self.issued,
            url: self.data.link.clone(),
        };
        if let Some(previous) = self.pending.replace(ticket.clone()) {
            debug!(superseded = %previous.url, url = %url, "Paste superseded an in-flight fetch");
        }
        Ok(ticket)
    }

    /// Applies the response of a fetch started by [`Self::begin_fetch`].
    ///
    /// Only the newest ticket ends the loading state. Its response is still
    /// dropped when the link was changed while it was in flight.
    pub fn complete_fetch(
        &mut self,
        ticket: &FetchTicket,
        response: Result<EndpointResponse, PreviewError>,
    ) -> FetchOutcome {
        if self.pending.as_ref().map(FetchTicket::seq) != Some(ticket.seq) {
            debug!(url = %ticket.url, seq = ticket.seq, "Discarding stale metadata response");
            return FetchOutcome::Stale;
        }
        self.pending = None;

        if self.data.link != ticket.url {
            debug!(
                url = %ticket.url,
                link = %self.data.link,
                "Link changed during fetch, discarding response"
            );
            return FetchOutcome::Stale;
        }

        let response = match response {
            Ok(response) => response,
            Err(e) => return self.fail(FetchFailure::from_request_error(e)),
        };

        if !response.success {
            return self.fail(FetchFailure::Rejected);
        }

        match response.meta {
            Some(meta) => {
                self.data.merge(PartialBlockData::meta(meta));
                debug!(url = %ticket.url, "Link metadata applied");
                FetchOutcome::Applied
            }
            None => self.fail(FetchFailure::MissingMeta),
        }
    }

    fn fail(&mut self, failure: FetchFailure) -> FetchOutcome {
        self.data.meta = Default::default();
        self.errored = true;
        FetchOutcome::Failed(failure)
    }

    /// Drops the preview and keeps the bare link. Returns false when nothing
    /// changed.
    pub fn cancel(&mut self) -> bool {
        if self.read_only || self.data.meta.is_empty() {
            return false;
        }
        self.data.meta = Default::default();
        true
    }

    pub fn view(&self) -> BlockView {
        let data = &self.data;
        let content = if !data.meta.is_empty() {
            Content::Preview(PreviewCard {
                href: data.link.clone(),
                image_url: data.meta.image_url().map(str::to_string),
                title: data.meta.title.clone(),
                description: data.meta.description.clone(),
                label: link_label(&data.link),
                cancellable: !self.read_only,
            })
        } else if data.link.is_empty() {
            Content::Empty
        } else {
            Content::BareLink(Anchor {
                href: data.link.clone(),
                text: data.link.clone(),
            })
        };

        let loader = match &self.pending {
            Some(ticket) => Loader {
                active: true,
                url: ticket.url.clone(),
            },
            None => Loader {
                active: false,
                url: data.link.clone(),
            },
        };

        BlockView {
            content,
            loader,
            errored: self.errored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LinkMeta;

    fn meta(title: &str) -> LinkMeta {
        LinkMeta {
            title: Some(title.to_string()),
            ..LinkMeta::default()
        }
    }

    fn previewing(link: &str) -> BlockMachine {
        BlockMachine::new(
            PartialBlockData {
                link: Some(link.to_string()),
                meta: Some(meta("T")),
            },
            false,
        )
    }

    #[test]
    fn initial_state_follows_saved_data() {
        assert_eq!(
            BlockMachine::new(PartialBlockData::default(), false).state(),
            BlockState::Empty
        );
        assert_eq!(
            BlockMachine::new(PartialBlockData::link("https://a.com"), false).state(),
            BlockState::BareLink
        );
        assert_eq!(previewing("https://a.com").state(), BlockState::Preview);
    }

    #[test]
    fn paste_sets_link_and_loads() {
        let mut machine = BlockMachine::new(PartialBlockData::default(), false);
        let ticket = machine.begin_fetch("https://a.com").unwrap();

        assert_eq!(ticket.url(), "https://a.com");
        assert_eq!(machine.data().link, "https://a.com");
        assert_eq!(machine.state(), BlockState::Loading);
        assert!(machine.view().loader.active);
    }

    #[test]
    fn success_moves_to_preview() {
        let mut machine = BlockMachine::new(PartialBlockData::default(), false);
        let ticket = machine.begin_fetch("https://a.com").unwrap();
        let outcome = machine.complete_fetch(&ticket, Ok(EndpointResponse::success(meta("A"))));

        assert!(outcome.is_applied());
        assert_eq!(machine.state(), BlockState::Preview);
        assert!(!machine.view().loader.active);
    }

    #[test]
    fn rejected_response_falls_back() {
        let mut machine = previewing("https://old.com");
        let ticket = machine.begin_fetch("https://a.com").unwrap();
        let outcome = machine.complete_fetch(&ticket, Ok(EndpointResponse::failure()));

        assert!(matches!(outcome, FetchOutcome::Failed(FetchFailure::Rejected)));
        assert_eq!(machine.state(), BlockState::BareLink);
        assert!(machine.data().meta.is_empty());
        assert!(machine.errored());
    }

    #[test]
    fn success_without_meta_is_malformed() {
        let mut machine = BlockMachine::new(PartialBlockData::default(), false);
        let ticket = machine.begin_fetch("https://a.com").unwrap();
        let response = EndpointResponse {
            success: true,
            meta: None,
        };

        assert!(matches!(
            machine.complete_fetch(&ticket, Ok(response)),
            FetchOutcome::Failed(FetchFailure::MissingMeta)
        ));
        assert_eq!(machine.state(), BlockState::BareLink);
    }

    #[test]
    fn transport_error_falls_back() {
        let mut machine = BlockMachine::new(PartialBlockData::default(), false);
        let ticket = machine.begin_fetch("https://a.com").unwrap();
        let outcome = machine.complete_fetch(
            &ticket,
            Err(PreviewError::FetchError("connection refused".into())),
        );

        assert!(matches!(outcome, FetchOutcome::Failed(FetchFailure::Transport(_))));
        assert_eq!(
            machine.view().bare_link().map(|a| a.href.as_str()),
            Some("https://a.com")
        );
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut machine = BlockMachine::new(PartialBlockData::default(), false);
        let first = machine.begin_fetch("https://a.com").unwrap();
        let second = machine.begin_fetch("https://b.com").unwrap();

        assert_eq!(machine.view().loader.url, "https://b.com");

        let outcome = machine.complete_fetch(&second, Ok(EndpointResponse::success(meta("B"))));
        assert!(outcome.is_applied());

        let outcome = machine.complete_fetch(&first, Ok(EndpointResponse::success(meta("A"))));
        assert!(matches!(outcome, FetchOutcome::Stale));
        assert_eq!(machine.data().link, "https://b.com");
        assert_eq!(machine.data().meta, meta("B"));
    }

    #[test]
    fn repasting_same_url_still_discards_older_response() {
        let mut machine = BlockMachine::new(PartialBlockData::default(), false);
        let first = machine.begin_fetch("https://a.com").unwrap();
        let second = machine.begin_fetch("https://a.com").unwrap();

        assert_ne!(first, second);
        assert!(matches!(
            machine.complete_fetch(&first, Ok(EndpointResponse::failure())),
            FetchOutcome::Stale
        ));
        assert_eq!(machine.state(), BlockState::Loading);
        assert!(machine
            .complete_fetch(&second, Ok(EndpointResponse::success(meta("A"))))
            .is_applied());
    }

    #[test]
    fn paste_clears_error_flag() {
        let mut machine = BlockMachine::new(PartialBlockData::default(), false);
        let ticket = machine.begin_fetch("https://a.com").unwrap();
        machine.complete_fetch(&ticket, Ok(EndpointResponse::failure()));
        assert!(machine.view().errored);

        machine.begin_fetch("https://b.com").unwrap();
        assert!(!machine.view().errored);
    }

    #[test]
    fn cancel_discards_meta() {
        let mut machine = previewing("https://a.com");

        assert!(machine.cancel());
        assert!(machine.data().meta.is_empty());
        assert_eq!(machine.data().link, "https://a.com");
        assert_eq!(machine.state(), BlockState::BareLink);
        assert!(!machine.cancel());
    }

    #[test]
    fn read_only_ignores_paste_and_cancel() {
        let mut machine = BlockMachine::new(
            PartialBlockData {
                link: Some("https://a.com".into()),
                meta: Some(meta("A")),
            },
            true,
        );

        assert!(matches!(
            machine.begin_fetch("https://b.com"),
            Err(FetchOutcome::Suppressed)
        ));
        assert!(!machine.cancel());
        assert_eq!(machine.state(), BlockState::Preview);
        assert_eq!(machine.view().preview().map(|c| c.cancellable), Some(false));
    }

    #[test]
    fn link_changed_during_fetch_ends_loading() {
        let mut machine = BlockMachine::new(PartialBlockData::default(), false);
        let ticket = machine.begin_fetch("https://a.com").unwrap();
        machine.set_data(PartialBlockData::link("https://c.com"));

        let outcome = machine.complete_fetch(&ticket, Ok(EndpointResponse::success(meta("A"))));

        assert!(matches!(outcome, FetchOutcome::Stale));
        assert_eq!(machine.state(), BlockState::BareLink);
        assert!(!machine.view().loader.active);
        assert_eq!(machine.data().link, "https://c.com");
        assert!(machine.data().meta.is_empty());
    }

    #[test]
    fn blank_paste_issues_no_ticket() {
        let mut machine = previewing("https://a.com");

        assert!(matches!(machine.begin_fetch(""), Err(FetchOutcome::Unclaimed)));
        assert!(matches!(machine.begin_fetch("  \n"), Err(FetchOutcome::Unclaimed)));
        assert!(machine.pending().is_none());
        assert_eq!(machine.state(), BlockState::Preview);
        assert_eq!(machine.data().link, "https://a.com");
    }

    #[test]
    fn ticket_carries_stored_link() {
        let mut machine = BlockMachine::new(PartialBlockData::default(), false);
        let ticket = machine.begin_fetch("  https://a.com \n").unwrap();

        assert_eq!(ticket.url(), "https://a.com");
        assert_eq!(machine.data().link, "https://a.com");
    }

    #[test]
    fn validate_reads_own_link() {
        assert!(!BlockMachine::new(PartialBlockData::default(), false).validate());
        assert!(!BlockMachine::new(PartialBlockData::link("   "), false).validate());
        assert!(BlockMachine::new(PartialBlockData::link("https://a.com"), false).validate());
    }

    #[test]
    fn view_is_pure() {
        let machine = previewing("https://example.com/path?x=1");
        let before = machine.data().clone();
        let view = machine.view();

        assert_eq!(machine.data(), &before);
        assert_eq!(view.preview().map(|c| c.label.as_str()), Some("example.com"));
    }
}
