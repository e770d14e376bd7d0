//! Cooperative scheduling helpers.
//!
//! Imports are plain futures with explicit suspension points; there are no OS
//! threads and no preemption. Any number of import futures can be interleaved
//! on the current thread with [`run_all`], which resumes one suspended step at
//! a time. [`yield_now`] is the suspension primitive the pipeline awaits
//! between incremental build steps.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

/// Boxed future with a borrow, the shape collaborator traits return.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Hand control back to the scheduler for one turn.
pub fn yield_now() -> YieldNow {
    YieldNow { yielded: false }
}

pub struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            Poll::Ready(())
        } else {
            self.yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

/// Drive a single future to completion on the current thread.
pub fn block_on<F: Future>(future: F) -> F::Output {
    futures::executor::block_on(future)
}

/// Drive a set of futures to completion on the current thread, interleaving
/// them at their suspension points. Outputs are returned in input order.
pub fn run_all<F: Future>(futures: Vec<F>) -> Vec<F::Output> {
    futures::executor::block_on(futures::future::join_all(futures))
}
