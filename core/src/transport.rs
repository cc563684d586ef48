//! The seam between the core and the network.
//!
//! The core never opens a socket. A host supplies a `Transport` that moves an
//! `HttpRequest` over the wire and hands back the `HttpResponse`. Non-2xx
//! statuses are responses, not transport errors; `TransportError` is reserved
//! for round-trips that produced no response at all.

use std::future::Future;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

pub trait Transport {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>>;
}
