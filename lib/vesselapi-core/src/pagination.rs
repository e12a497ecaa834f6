//! Lazy iteration over cursor-paginated endpoints.
//!
//! A [`Pager`] wraps a page-fetch closure and walks successive pages on demand. The closure
//! receives the cursor reported by the previous page (`None` on the first call) and owns
//! whatever per-call state it needs, typically a private copy of the caller's query.
//!
//! ```
//! # async fn demo() -> vesselapi_core::Result<()> {
//! use vesselapi_core::{Page, Pager};
//!
//! let mut pager = Pager::new(|cursor: Option<String>| async move {
//!     Ok(match cursor.as_deref() {
//!         None => Page::new(vec!["a", "b"], Some("next".to_string())),
//!         Some(_) => Page::new(vec!["c"], None),
//!     })
//! });
//!
//! while pager.advance().await {
//!     println!("{:?}", pager.current());
//! }
//! assert!(pager.error().is_none());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use futures_core::Stream;

use crate::{Error, Result};

/// Boxed future produced by a page fetch.
pub type PageFuture<T> = Pin<Box<dyn Future<Output = Result<Page<T>>> + Send>>;

type FetchFn<T> = Box<dyn FnMut(Option<String>) -> PageFuture<T> + Send>;

/// One page of results and the cursor of the page after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    items: Vec<T>,
    next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// Creates a page. An empty cursor is treated like a missing one.
    #[must_use]
    pub fn new(items: Vec<T>, next_cursor: Option<String>) -> Self {
        Self {
            items,
            next_cursor: next_cursor.filter(|cursor| !cursor.is_empty()),
        }
    }

    /// Items on this page.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Cursor of the next page, if there is one.
    #[must_use]
    pub fn next_cursor(&self) -> Option<&str> {
        self.next_cursor.as_deref()
    }

    /// Consume into (items, next cursor).
    #[must_use]
    pub fn into_parts(self) -> (Vec<T>, Option<String>) {
        (self.items, self.next_cursor)
    }
}

/// Lazy sequence of items spread over server pages.
///
/// Errors are sticky: once a fetch fails, [`Pager::advance`] keeps returning `false`
/// without fetching again and [`Pager::error`] reports the failure.
pub struct Pager<T> {
    fetch: FetchFn<T>,
    items: Vec<T>,
    index: usize,
    started: bool,
    done: bool,
    cursor: Option<String>,
    error: Option<Error>,
}

impl<T> fmt::Debug for Pager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pager")
            .field("buffered", &self.items.len())
            .field("index", &self.index)
            .field("done", &self.done)
            .field("cursor", &self.cursor)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<T> Pager<T> {
    /// Creates a pager from a page-fetch closure.
    pub fn new<F, Fut>(mut fetch: F) -> Self
    where
        F: FnMut(Option<String>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<Page<T>>> + Send + 'static,
    {
        Self {
            fetch: Box::new(move |cursor| Box::pin(fetch(cursor))),
            items: Vec::new(),
            index: 0,
            started: false,
            done: false,
            cursor: None,
            error: None,
        }
    }

    /// Moves to the next item, fetching the next page when the buffered one is used up.
    ///
    /// Returns `false` once the sequence is exhausted or a fetch failed.
    pub async fn advance(&mut self) -> bool {
        if self.error.is_some() {
            return false;
        }

        if self.started {
            self.index = self.index.saturating_add(1);
        }
        self.started = true;

        if self.index < self.items.len() {
            return true;
        }

        if self.done {
            return false;
        }

        match (self.fetch)(self.cursor.take()).await {
            Err(err) => {
                self.error = Some(err);
                false
            }
            Ok(page) => {
                let (items, next_cursor) = page.into_parts();
                self.items = items;
                self.index = 0;

                if self.items.is_empty() {
                    self.done = true;
                    return false;
                }

                match next_cursor {
                    Some(cursor) => self.cursor = Some(cursor),
                    None => self.done = true,
                }
                true
            }
        }
    }

    /// The item the pager is positioned on.
    ///
    /// `None` before the first successful [`Pager::advance`] and after exhaustion.
    #[must_use]
    pub fn current(&self) -> Option<&T> {
        if self.started {
            self.items.get(self.index)
        } else {
            None
        }
    }

    /// The first error encountered, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Consumes the pager and returns every remaining item.
    ///
    /// On failure the error is returned and items gathered so far are discarded.
    pub async fn collect_all(mut self) -> Result<Vec<T>> {
        let mut all = Vec::new();
        while self.advance().await {
            // Take the rest of the page at once; the next advance finds it empty and fetches.
            all.extend(self.items.drain(self.index..));
            self.index = 0;
        }

        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(all),
        }
    }
}

impl<T: Clone + Send + 'static> Pager<T> {
    /// Turns the pager into a [`Stream`] of items.
    ///
    /// The stream yields the fetch error as its last element when a page fails.
    pub fn into_stream(self) -> impl Stream<Item = Result<T>> + Send {
        futures_util::stream::unfold(Some(self), |state| async move {
            let mut pager = state?;
            if pager.advance().await {
                let item = pager.current().cloned()?;
                Some((Ok(item), Some(pager)))
            } else {
                pager.error.take().map(|err| (Err(err), None))
            }
        })
    }
}
