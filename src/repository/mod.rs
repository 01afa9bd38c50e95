//! Generic record repository over one kind and one backing year document.
//!
//! The document is the durable source of truth. Every mutation re-derives
//! the document text by splicing blocks, writes it back, then reloads the
//! whole year from the store; the cache is never patched in place. The
//! reload compensates for the repository not being the only writer of the
//! document (the vault owner can edit it by hand).

pub mod kinds;

pub use kinds::{
    BudgetKind, BudgetRepository, RecurringKind, RecurringTransactionRepository, TransactionKind,
    TransactionRepository,
};

use std::marker::PhantomData;

use chrono::Datelike;
use tracing::{debug, info};
use uuid::Uuid;

use crate::codec::{self, Block, Document};
use crate::config::VaultConfig;
use crate::errors::{MalformedBlock, Result, VaultError};
use crate::events::{EventBus, Topic};
use crate::query::{self, Queryable, RecordFilter};
use crate::store::{resolve_folder, resolve_path, DocumentStore};

/// Binds a record type to its wire constants and codec.
pub trait RecordKind {
    type Record: Clone + Queryable;
    type Draft;

    /// Header token, e.g. `Transaction` in `## Transaction <id>`.
    const KIND: &'static str;
    /// Lowercase name used in error messages.
    const KIND_LABEL: &'static str;
    /// Plural title of the year document.
    const DOC_TITLE: &'static str;
    /// Path segment of the year document.
    const FILE_STEM: &'static str;
    const TOPIC: Topic;
    /// Whether records of this kind carry a date that picks their year
    /// document. Kinds without one always live in the active year.
    const DATE_BUCKETED: bool;

    fn materialize(draft: Self::Draft, id: String) -> Self::Record;
    fn validate(record: &Self::Record) -> Result<()>;
    fn storage_year(record: &Self::Record, active_year: i32) -> i32;
    fn encode(record: &Self::Record) -> Block;
    fn decode(block: &Block) -> std::result::Result<Self::Record, MalformedBlock>;
}

pub struct Repository<K: RecordKind, S: DocumentStore> {
    store: S,
    config: VaultConfig,
    active_year: i32,
    bus: EventBus,
    cache: Vec<K::Record>,
    skipped: usize,
    initialized: bool,
    _kind: PhantomData<K>,
}

impl<K: RecordKind, S: DocumentStore> Repository<K, S> {
    pub fn new(store: S, config: VaultConfig, active_year: i32, bus: EventBus) -> Self {
        Self {
            store,
            config,
            active_year,
            bus,
            cache: Vec::new(),
            skipped: 0,
            initialized: false,
            _kind: PhantomData,
        }
    }

    pub fn active_year(&self) -> i32 {
        self.active_year
    }

    /// Malformed blocks encountered on the last load of the active year.
    pub fn skipped_blocks(&self) -> usize {
        self.skipped
    }

    /// Ensures the active year document exists and loads it into the cache.
    /// Idempotent; later calls are no-ops. On storage failure the cache
    /// falls back to empty and the error propagates, leaving a retry open.
    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        match self.load_year(self.active_year) {
            Ok(outcome) => {
                self.cache = outcome.records;
                self.skipped = outcome.skipped;
                self.initialized = true;
                debug!(
                    kind = K::KIND,
                    year = self.active_year,
                    records = self.cache.len(),
                    "repository initialized"
                );
                Ok(())
            }
            Err(err) => {
                self.cache.clear();
                self.skipped = 0;
                Err(err)
            }
        }
    }

    /// Assigns a fresh id, appends the encoded block to the record's year
    /// document, and resynchronizes the cache from the store.
    pub fn add(&mut self, draft: K::Draft) -> Result<K::Record> {
        self.ensure_initialized()?;
        let record = K::materialize(draft, Uuid::new_v4().to_string());
        K::validate(&record)?;

        let year = K::storage_year(&record, self.active_year);
        let mut document = self.read_year_document(year)?;
        document.append(K::encode(&record));
        self.write_year_document(year, &document)?;

        self.reload()?;
        self.bus.publish(K::TOPIC);
        debug!(kind = K::KIND, year, "record added");
        Ok(record)
    }

    /// Replaces the record's block in place. A record whose date moved to a
    /// different calendar year migrates to that year's document.
    pub fn update(&mut self, record: K::Record) -> Result<()> {
        self.ensure_initialized()?;
        K::validate(&record)?;

        let id = record.record_id().to_string();
        let stored = self
            .cached(&id)
            .ok_or_else(|| VaultError::not_found(K::KIND_LABEL, id.clone()))?;
        let old_year = K::storage_year(&stored, self.active_year);
        let new_year = K::storage_year(&record, self.active_year);

        if old_year == new_year {
            let mut document = self.read_year_document(old_year)?;
            if !document.replace(K::encode(&record)) {
                return Err(VaultError::not_found(K::KIND_LABEL, id.clone()));
            }
            self.write_year_document(old_year, &document)?;
        } else {
            // Write the destination year first; an interrupted migration
            // must duplicate the record, never lose it.
            let mut old_document = self.read_year_document(old_year)?;
            if !old_document.remove(&id) {
                return Err(VaultError::not_found(K::KIND_LABEL, id.clone()));
            }
            let mut new_document = self.read_year_document(new_year)?;
            new_document.append(K::encode(&record));
            self.write_year_document(new_year, &new_document)?;
            self.write_year_document(old_year, &old_document)?;
            info!(kind = K::KIND, old_year, new_year, "record migrated across years");
        }

        self.reload()?;
        self.bus.publish(K::TOPIC);
        Ok(())
    }

    /// Removes the record's block, through the next header or end of
    /// document.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        self.ensure_initialized()?;
        let stored = self
            .cached(id)
            .ok_or_else(|| VaultError::not_found(K::KIND_LABEL, id))?;
        let year = K::storage_year(&stored, self.active_year);

        let mut document = self.read_year_document(year)?;
        if !document.remove(id) {
            return Err(VaultError::not_found(K::KIND_LABEL, id));
        }
        self.write_year_document(year, &document)?;

        self.reload()?;
        self.bus.publish(K::TOPIC);
        debug!(kind = K::KIND, id, "record deleted");
        Ok(())
    }

    /// A snapshot of the active year's records.
    pub fn records(&mut self) -> Result<Vec<K::Record>> {
        self.ensure_initialized()?;
        Ok(self.cache.clone())
    }

    /// Filtered, sorted, paginated records. Years outside the active one are
    /// read from the store on demand without touching the cache.
    pub fn query(&mut self, filter: &RecordFilter) -> Result<Vec<K::Record>> {
        self.ensure_initialized()?;
        let mut records = Vec::new();
        for year in self.candidate_years(filter) {
            if year == self.active_year {
                records.extend(self.cache.iter().cloned());
            } else {
                records.extend(self.peek_year(year)?);
            }
        }
        Ok(query::apply(records, filter))
    }

    pub(crate) fn ensure_initialized(&mut self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            self.initialize()
        }
    }

    pub(crate) fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub(crate) fn cache(&self) -> &[K::Record] {
        &self.cache
    }

    fn cached(&self, id: &str) -> Option<K::Record> {
        self.cache
            .iter()
            .find(|record| record.record_id() == id)
            .cloned()
    }

    fn candidate_years(&self, filter: &RecordFilter) -> Vec<i32> {
        if !K::DATE_BUCKETED {
            return vec![self.active_year];
        }
        match (filter.start_date, filter.end_date) {
            (Some(start), Some(end)) if start <= end => (start.year()..=end.year()).collect(),
            _ => vec![self.active_year],
        }
    }

    fn document_path(&self, year: i32) -> String {
        resolve_path(&self.config.root, K::FILE_STEM, year)
    }

    fn ensure_document(&self, year: i32) -> Result<()> {
        self.store
            .ensure_folder(&resolve_folder(&self.config.root, year))?;
        let path = self.document_path(year);
        if !self.store.document_exists(&path) {
            let document = Document::with_title(year, K::DOC_TITLE);
            self.store.create_document(&path, &document.render())?;
            info!(%path, "created year document");
        }
        Ok(())
    }

    fn load_year(&self, year: i32) -> Result<codec::DecodeOutcome<K::Record>> {
        self.ensure_document(year)?;
        let text = self.store.read_document(&self.document_path(year))?;
        let document = Document::parse(&text);
        Ok(codec::decode_blocks(&document, K::KIND, K::decode))
    }

    /// Read-only view of another year; absent documents read as empty.
    fn peek_year(&self, year: i32) -> Result<Vec<K::Record>> {
        let path = self.document_path(year);
        if !self.store.document_exists(&path) {
            return Ok(Vec::new());
        }
        let document = Document::parse(&self.store.read_document(&path)?);
        Ok(codec::decode_blocks(&document, K::KIND, K::decode).records)
    }

    fn read_year_document(&self, year: i32) -> Result<Document> {
        self.ensure_document(year)?;
        Ok(Document::parse(
            &self.store.read_document(&self.document_path(year))?,
        ))
    }

    fn write_year_document(&self, year: i32, document: &Document) -> Result<()> {
        self.store
            .write_document(&self.document_path(year), &document.render())
    }

    fn reload(&mut self) -> Result<()> {
        let outcome = self.load_year(self.active_year)?;
        self.cache = outcome.records;
        self.skipped = outcome.skipped;
        Ok(())
    }
}
