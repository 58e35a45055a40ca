//! Record Fetcher.
//!
//! One index request yields the entries to load. Every entry's record is then
//! requested at once, and the responses arrive as separate events in any
//! order. [`CollectionAssembly`] joins them: the collection only exists once
//! every record has arrived, and the first failure abandons the whole load.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::capabilities::{
    json_body, response_body, Endpoints, Http, HttpError, IndexPage, RecordPayload,
};
use crate::event::{Event, MountToken};
use crate::model::{Collection, CollectionError, Record, RecordId};
use crate::{CatalogError, CatalogResult, FetchStage};

/// One index-page entry. Only lives long enough to drive its record request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSummary {
    pub name: String,
    /// 1-based rank in the index page, which is also the upstream record id.
    pub index_position: u32,
}

impl ItemSummary {
    #[must_use]
    pub const fn record_id(&self) -> RecordId {
        RecordId(self.index_position)
    }
}

/// Numbers the index entries from 1 and drops anything past `limit`.
#[must_use]
pub fn summarize(page: IndexPage, limit: usize) -> Vec<ItemSummary> {
    page.results
        .into_iter()
        .take(limit)
        .zip(1u32..)
        .map(|(entry, index_position)| ItemSummary {
            name: entry.name,
            index_position,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblyProgress {
    Pending { received: usize, expected: usize },
    Complete(Collection),
    Failed(CatalogError),
}

/// All-or-nothing join over the per-record responses of one load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionAssembly {
    slots: Vec<Option<Arc<Record>>>,
    received: usize,
}

impl CollectionAssembly {
    #[must_use]
    pub fn new(summaries: &[ItemSummary]) -> Self {
        Self {
            slots: vec![None; summaries.len()],
            received: 0,
        }
    }

    #[must_use]
    pub fn expected(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub const fn received(&self) -> usize {
        self.received
    }

    /// Current state without accepting anything. An empty index completes
    /// immediately with an empty collection.
    #[must_use]
    pub fn progress(&self) -> AssemblyProgress {
        if self.received < self.slots.len() {
            return AssemblyProgress::Pending {
                received: self.received,
                expected: self.slots.len(),
            };
        }
        self.complete()
    }

    /// Records one response. Once this returns `Complete` or `Failed` the
    /// assembly is spent and should be dropped.
    pub fn accept(&mut self, position: u32, result: CatalogResult<Record>) -> AssemblyProgress {
        let record = match result {
            Ok(record) => record,
            Err(error) => {
                warn!(position, error = %error, "record fetch failed, abandoning collection");
                return AssemblyProgress::Failed(error);
            }
        };

        let Some(slot) = position
            .checked_sub(1)
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| self.slots.get_mut(i))
        else {
            warn!(position, "response for a position that was never requested");
            return self.progress();
        };

        if slot.is_some() {
            warn!(position, "duplicate response ignored");
            return self.progress();
        }

        *slot = Some(Arc::new(record));
        self.received += 1;
        debug!(
            position,
            received = self.received,
            expected = self.slots.len(),
            "record received"
        );
        self.progress()
    }

    fn complete(&self) -> AssemblyProgress {
        let records: Vec<Arc<Record>> = self.slots.iter().flatten().cloned().collect();
        match Collection::from_shared(records) {
            Ok(collection) => AssemblyProgress::Complete(collection),
            Err(e @ CollectionError::DuplicateId(id)) => {
                let position = self.colliding_position(id);
                AssemblyProgress::Failed(CatalogError::fetch(
                    FetchStage::Record { position },
                    e.to_string(),
                ))
            }
        }
    }

    /// Position of the second slot holding `id`.
    fn colliding_position(&self, id: RecordId) -> u32 {
        (1u32..)
            .zip(&self.slots)
            .filter(|(_, slot)| slot.as_ref().is_some_and(|r| r.id == id))
            .map(|(position, _)| position)
            .nth(1)
            .unwrap_or_default()
    }
}

fn fetch_error(stage: FetchStage, error: &HttpError) -> CatalogError {
    CatalogError::fetch(stage, error.to_string())
}

/// Decodes an index-page response.
pub fn index_result(
    result: crux_http::Result<crux_http::Response<IndexPage>>,
    stage: FetchStage,
) -> CatalogResult<IndexPage> {
    response_body(result).map_err(|e| fetch_error(stage, &e))
}

/// Decodes a record fetched as part of a collection load. The record at a
/// position must carry that position as its id.
pub fn record_result(
    position: u32,
    result: crux_http::Result<crux_http::Response<Vec<u8>>>,
) -> CatalogResult<Record> {
    let stage = FetchStage::Record { position };
    let payload: RecordPayload = json_body(result).map_err(|e| fetch_error(stage, &e))?;
    let record = Record::try_from(payload).map_err(|e| CatalogError::fetch(stage, e.to_string()))?;
    if record.id != RecordId(position) {
        return Err(CatalogError::fetch(
            stage,
            format!("upstream returned record {} instead", record.id),
        ));
    }
    Ok(record)
}

/// Decodes a record fetched for the detail view. A 404 means the id does not
/// exist rather than a failed request.
pub fn detail_result(
    id: RecordId,
    result: crux_http::Result<crux_http::Response<Vec<u8>>>,
) -> CatalogResult<Record> {
    let stage = FetchStage::Detail { id };
    let payload: RecordPayload = json_body(result).map_err(|e| {
        if e.is_not_found() {
            CatalogError::NotFound { id }
        } else {
            fetch_error(stage, &e)
        }
    })?;
    let record = Record::try_from(payload).map_err(|e| CatalogError::fetch(stage, e.to_string()))?;
    if record.id != id {
        return Err(CatalogError::fetch(
            stage,
            format!("upstream returned record {} instead", record.id),
        ));
    }
    Ok(record)
}

/// Issues the upstream requests. Every response event carries the token of
/// the screen that asked for it.
pub struct RecordFetcher<'a> {
    http: &'a Http<Event>,
    endpoints: &'a Endpoints,
    token: MountToken,
}

impl<'a> RecordFetcher<'a> {
    #[must_use]
    pub const fn new(http: &'a Http<Event>, endpoints: &'a Endpoints, token: MountToken) -> Self {
        Self {
            http,
            endpoints,
            token,
        }
    }

    pub fn fetch_index(&self, limit: usize) {
        let token = self.token;
        debug!(limit, "requesting index page");
        self.http
            .get(self.endpoints.index(limit))
            .expect_json::<IndexPage>()
            .send(move |result| Event::IndexFetched { token, result });
    }

    /// Fans out one request per summary; responses are joined by
    /// [`CollectionAssembly`].
    pub fn fetch_records(&self, summaries: &[ItemSummary]) {
        debug!(count = summaries.len(), "requesting records");
        for summary in summaries {
            let token = self.token;
            let position = summary.index_position;
            self.http
                .get(self.endpoints.record(summary.record_id()))
                .send(move |result| Event::RecordFetched {
                    token,
                    position,
                    result,
                });
        }
    }

    /// The body stays raw so a 404 can be told apart before any decoding.
    pub fn fetch_record(&self, id: RecordId) {
        let token = self.token;
        debug!(%id, "requesting record");
        self.http
            .get(self.endpoints.record(id))
            .send(move |result| Event::DetailFetched { token, id, result });
    }

    pub fn fetch_category_kinds(&self) {
        let token = self.token;
        self.http
            .get(self.endpoints.category_kinds())
            .expect_json::<IndexPage>()
            .send(move |result| Event::CategoryKindsFetched { token, result });
    }
}
