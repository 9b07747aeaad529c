//! Awaitable rate fetching on top of the ticket protocol.
//!
//! # Design
//! [`convert_with`] borrows the controller only to trigger and to complete,
//! never across the fetch itself. On a single-threaded executor the user can
//! keep editing while a conversion is in flight; the controller's generation
//! check then drops the late reply.

use std::cell::RefCell;
use std::future::Future;

use crate::client::RateClient;
use crate::controller::{Completion, ConversionController};
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{ConvertRequest, PairConversion};

/// Something that can convert an amount between two currencies.
pub trait RateFetcher {
    fn fetch(
        &self,
        request: &ConvertRequest,
    ) -> impl Future<Output = Result<PairConversion, ApiError>>;
}

/// Executes plain-data HTTP requests. Transport failures map to
/// `ApiError::Transport`; any HTTP status is a successful round-trip.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse, ApiError>>;
}

/// [`RateFetcher`] that talks to the exchange-rate service through a
/// [`RateClient`] and a host-supplied [`Transport`].
#[derive(Debug, Clone)]
pub struct ClientFetcher<T> {
    client: RateClient,
    transport: T,
}

impl<T: Transport> ClientFetcher<T> {
    pub fn new(client: RateClient, transport: T) -> Self {
        Self { client, transport }
    }
}

impl<T: Transport> RateFetcher for ClientFetcher<T> {
    async fn fetch(&self, request: &ConvertRequest) -> Result<PairConversion, ApiError> {
        let http_request = self.client.build_pair_request(request);
        let response = self.transport.execute(http_request).await?;
        self.client.parse_pair_response(response)
    }
}

/// How a call to [`convert_with`] ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConvertOutcome {
    /// The amount was not convertible; no fetch was made.
    Skipped,
    Converted(f64),
    /// The fetch failed and the failure was recorded on the state.
    Failed,
    /// The input changed while the fetch was running; the reply was dropped.
    Superseded,
}

/// Trigger a conversion on `controller`, run it with `fetcher` and apply the
/// reply if it is still current.
pub async fn convert_with<F: RateFetcher>(
    controller: &RefCell<ConversionController>,
    fetcher: &F,
) -> ConvertOutcome {
    let ticket = controller.borrow_mut().trigger_convert();
    let Some(ticket) = ticket else {
        return ConvertOutcome::Skipped;
    };

    let outcome = fetcher.fetch(&ticket.request).await;
    let converted = outcome.as_ref().ok().map(|c| c.converted_amount);

    let completion = controller.borrow_mut().complete_convert(&ticket, outcome);
    match (completion, converted) {
        (Completion::Applied, Some(value)) => ConvertOutcome::Converted(value),
        (Completion::Applied, None) | (Completion::Failed, _) => ConvertOutcome::Failed,
        (Completion::Stale, _) => ConvertOutcome::Superseded,
    }
}
