//! The Hub: unified request pipeline.
//!
//! The Hub brings together the envelope boundary, interface routing, and
//! the controllers into one entry point: an inbound sealed buffer goes in,
//! an outbound sealed buffer comes out.

use std::sync::Arc;

use tracing::{debug, warn};

use holdfast_hub_core::{
    Did, HubError, Request, Resolver, Response, Result, SignatureVerifier,
};
use holdfast_hub_envelope::{EnvelopeProcessor, HubKeys, Inbound, Rejection, VerifiedRequest};
use holdfast_hub_perms::AuthorizationController;
use holdfast_hub_store::Store;

use crate::controller::{CommitQueryController, ObjectController};
use crate::router::Interface;

/// Configuration for the Hub.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// How long issued bearer tokens stay valid, in milliseconds.
    pub token_lifetime_ms: i64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            token_lifetime_ms: 5 * 60 * 1000,
        }
    }
}

/// The main Hub struct.
///
/// Processes one buffer at a time:
/// - Authenticating the sealed envelope (or issuing a bearer token)
/// - Routing the request to its interface
/// - Gating reads and writes on permission grants
/// - Sealing the response, error or not, back to the sender
pub struct Hub<S, R> {
    /// Envelope boundary: decrypt-verify inbound, sign-seal outbound.
    processor: EnvelopeProcessor<R>,
    /// Writes and object queries, shared by every interface.
    objects: ObjectController<S, SignatureVerifier<R>>,
    /// Commit queries, which are interface-agnostic.
    commits: CommitQueryController<S>,
}

impl<S: Store, R: Resolver> Hub<S, R> {
    /// Create a new hub instance.
    pub fn new(keys: HubKeys, store: Arc<S>, resolver: Arc<R>, config: HubConfig) -> Self {
        let authorization = Arc::new(AuthorizationController::new(store.clone()));
        let verifier = Arc::new(SignatureVerifier::new(resolver.clone()));
        Self {
            processor: EnvelopeProcessor::new(keys, resolver, config.token_lifetime_ms),
            objects: ObjectController::new(store.clone(), authorization.clone(), verifier),
            commits: CommitQueryController::new(store, authorization),
        }
    }

    /// The hub's own identity.
    pub fn did(&self) -> &Did {
        self.processor.did()
    }

    /// Process one inbound buffer into one outbound buffer.
    ///
    /// Every authenticated outcome comes back sealed to the sender, request
    /// errors included. The only unsealed outcome is [`Rejection`], returned
    /// when no requester identity was established or when the reply could
    /// not be sealed.
    pub async fn handle(&self, buffer: &[u8]) -> std::result::Result<Vec<u8>, Rejection> {
        let request = match self.processor.verify(buffer, now_millis()).await? {
            Inbound::TokenIssued(reply) => return Ok(reply),
            Inbound::Request(request) => request,
        };

        let response = match self.dispatch(&request).await {
            Ok(response) => response,
            Err(err) => {
                debug!(%err, requester = %request.requester, "request errored");
                Response::from(&err)
            }
        };

        let body = response.to_bytes().map_err(|err| {
            warn!(%err, "response serialization failed");
            Rejection
        })?;
        self.processor.respond(&request, &body).map_err(|err| {
            warn!(%err, "response sealing failed");
            Rejection
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Routing
    // ─────────────────────────────────────────────────────────────────────────

    async fn dispatch(&self, request: &VerifiedRequest) -> Result<Response> {
        let value: serde_json::Value = serde_json::from_slice(&request.body)
            .map_err(|_| HubError::incorrect_parameter("request"))?;
        let parsed = Request::from_value(&value)?;

        // The envelope authenticated the sender; the body must claim the
        // same identity.
        if parsed.base().iss != request.requester {
            return Err(HubError::bad_request(
                "iss",
                "'iss' must match the authenticated sender",
            ));
        }

        match &parsed {
            Request::Write(write) => {
                let interface = Interface::parse(
                    &write.commit.protected_headers().interface,
                    "commit.protected.interface",
                )?;
                debug!(%interface, iss = %write.base.iss, "routing write");
                self.objects.handle_write(write).await
            }
            Request::ObjectQuery(query) => {
                let interface = Interface::parse(&query.interface, "query.interface")?;
                debug!(%interface, iss = %query.base.iss, "routing object query");
                self.objects.handle_object_query(query).await
            }
            Request::CommitQuery(query) => {
                debug!(iss = %query.base.iss, "routing commit query");
                self.commits.handle(query).await
            }
        }
    }
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}
