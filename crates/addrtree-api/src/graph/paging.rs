use std::marker::PhantomData;

use futures_util::{Stream, TryStreamExt, pin_mut};
use serde::de::DeserializeOwned;
use tracing::trace;
use url::Url;

use super::client::GraphClient;
use crate::auth::AccessToken;
use crate::error::Error;

/// A lazily fetched OData collection.
///
/// Nothing is requested until [`pages`](Self::pages) is polled. Each call to
/// `pages` starts over from the first page, so a `Paged` can be replayed.
pub struct Paged<T> {
    client: GraphClient,
    first: Url,
    token: AccessToken,
    _item: PhantomData<fn() -> T>,
}

impl<T> Paged<T>
where
    T: DeserializeOwned + Send + 'static,
{
    pub(crate) fn new(client: GraphClient, first: Url, token: AccessToken) -> Self {
        Self {
            client,
            first,
            token,
            _item: PhantomData,
        }
    }

    /// Stream of pages, following `@odata.nextLink` until it is absent.
    /// The first error ends the stream.
    pub fn pages(&self) -> impl Stream<Item = Result<Vec<T>, Error>> + Send + 'static {
        let client = self.client.clone();
        let token = self.token.clone();
        let first = self.first.clone();

        async_stream::try_stream! {
            let mut next = Some(first);
            let mut index = 0usize;
            while let Some(url) = next.take() {
                let page = client.get_page::<T>(url, &token).await?;
                trace!(page = index, items = page.value.len(), "received page");
                next = page.next_link.as_deref().map(Url::parse).transpose()?;
                index += 1;
                yield page.value;
            }
        }
    }

    /// Drain every page into a single `Vec`, preserving server order.
    pub async fn collect_all(&self) -> Result<Vec<T>, Error> {
        let pages = self.pages();
        pin_mut!(pages);

        let mut all = Vec::new();
        while let Some(items) = pages.try_next().await? {
            all.extend(items);
        }
        Ok(all)
    }
}
