//! Subtree walk streams.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;

use crate::error::{Error, ErrorStatus, Result};
use crate::oid::Oid;
use crate::transport::Transport;
use crate::value::Value;
use crate::varbind::VarBind;

use super::Client;

type Pending<T> = Pin<Box<dyn Future<Output = Result<T>> + Send>>;

/// Where a walk stands after looking at one binding.
enum Step {
    Yield(VarBind),
    End,
    Fail(Error),
}

/// Subtree bookkeeping shared by both walk flavours.
struct Cursor {
    base_oid: Oid,
    current_oid: Oid,
    last_returned: Option<Oid>,
}

impl Cursor {
    fn new(oid: Oid) -> Self {
        Self {
            base_oid: oid.clone(),
            current_oid: oid,
            last_returned: None,
        }
    }

    /// Stop at endOfMibView or on leaving the subtree. An OID that does not
    /// increase is an agent bug and fails the walk.
    fn step(&mut self, vb: VarBind) -> Step {
        if matches!(vb.value, Value::EndOfMibView) || !vb.oid.starts_with(&self.base_oid) {
            return Step::End;
        }
        if let Some(last) = self.last_returned.take()
            && vb.oid <= last
        {
            return Step::Fail(Error::NonIncreasingOid {
                previous: last,
                current: vb.oid,
            });
        }
        self.current_oid = vb.oid.clone();
        self.last_returned = Some(vb.oid.clone());
        Step::Yield(vb)
    }
}

/// SNMPv1 agents signal the end of the view with noSuchName.
fn is_end_of_view(err: &Error) -> bool {
    matches!(
        err,
        Error::Snmp {
            status: ErrorStatus::NoSuchName,
            ..
        }
    )
}

/// GETNEXT walk of an OID subtree.
///
/// Created by [`Client::walk()`].
pub struct Walk<T: Transport> {
    client: Client<T>,
    cursor: Cursor,
    done: bool,
    pending: Option<Pending<VarBind>>,
}

impl<T: Transport> Walk<T> {
    pub(crate) fn new(client: Client<T>, oid: Oid) -> Self {
        Self {
            client,
            cursor: Cursor::new(oid),
            done: false,
            pending: None,
        }
    }
}

impl<T: Transport + 'static> Stream for Walk<T> {
    type Item = Result<VarBind>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.done {
            return Poll::Ready(None);
        }

        let this = &mut *self;
        let pending = this.pending.get_or_insert_with(|| {
            let client = this.client.clone();
            let oid = this.cursor.current_oid.clone();
            Box::pin(async move { client.get_next(&oid).await })
        });

        let result = match pending.as_mut().poll(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(result) => result,
        };
        this.pending = None;

        let step = match result {
            Ok(vb) => this.cursor.step(vb),
            Err(e) if is_end_of_view(&e) => Step::End,
            Err(e) => Step::Fail(e),
        };
        match step {
            Step::Yield(vb) => Poll::Ready(Some(Ok(vb))),
            Step::End => {
                this.done = true;
                Poll::Ready(None)
            }
            Step::Fail(e) => {
                this.done = true;
                Poll::Ready(Some(Err(e)))
            }
        }
    }
}

/// GETBULK walk of an OID subtree.
///
/// Created by [`Client::bulk_walk()`].
pub struct BulkWalk<T: Transport> {
    client: Client<T>,
    cursor: Cursor,
    max_repetitions: i32,
    done: bool,
    buffer: std::vec::IntoIter<VarBind>,
    pending: Option<Pending<Vec<VarBind>>>,
}

impl<T: Transport> BulkWalk<T> {
    pub(crate) fn new(client: Client<T>, oid: Oid, max_repetitions: i32) -> Self {
        Self {
            client,
            cursor: Cursor::new(oid),
            max_repetitions,
            done: false,
            buffer: Vec::new().into_iter(),
            pending: None,
        }
    }
}

impl<T: Transport + 'static> Stream for BulkWalk<T> {
    type Item = Result<VarBind>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        loop {
            if this.done {
                return Poll::Ready(None);
            }

            if let Some(vb) = this.buffer.next() {
                return match this.cursor.step(vb) {
                    Step::Yield(vb) => Poll::Ready(Some(Ok(vb))),
                    Step::End => {
                        this.done = true;
                        Poll::Ready(None)
                    }
                    Step::Fail(e) => {
                        this.done = true;
                        Poll::Ready(Some(Err(e)))
                    }
                };
            }

            let pending = this.pending.get_or_insert_with(|| {
                let client = this.client.clone();
                let oid = this.cursor.current_oid.clone();
                let max_repetitions = this.max_repetitions;
                Box::pin(async move { client.get_bulk(&[oid], 0, max_repetitions).await })
            });

            let result = match pending.as_mut().poll(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(result) => result,
            };
            this.pending = None;

            match result {
                Ok(varbinds) if varbinds.is_empty() => this.done = true,
                Ok(varbinds) => this.buffer = varbinds.into_iter(),
                Err(e) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(e)));
                }
            }
        }
    }
}

impl<T: Transport> Client<T> {
    /// Walk the subtree under `oid` with GETBULK, `max_repetitions` per request.
    pub fn bulk_walk(&self, oid: Oid, max_repetitions: i32) -> BulkWalk<T> {
        BulkWalk::new(self.clone(), oid, max_repetitions)
    }
}
