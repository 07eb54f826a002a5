//! Projected reads of stored content and raw record ingest.
//!
//! # Responsibility
//! - Load documents, resolve the references their selectors cross and
//!   project them for responses.
//! - Store crawler output under its source collection.
//!
//! # Invariants
//! - Sensitive fields are dropped before projection, whatever the selectors,
//!   in the loaded document and in every target loaded through a link.
//! - Resolution follows each effective selector path, one hop per segment;
//!   links no selector crosses stay links.

use crate::model::document::Document;
use crate::model::object_id::ObjectId;
use crate::model::raw::RawRecord;
use crate::projection::{project, FieldSpec};
use crate::repo::{DocumentListQuery, DocumentRepository, RepoError, RepoResult};
use log::debug;
use serde_json::{Map, Value};

/// Fields never exposed through projected reads, per collection.
const HIDDEN_FIELDS: &[(&str, &str)] = &[("user", "password")];

/// Use-case service for reading and ingesting content documents.
pub struct ContentService<R: DocumentRepository> {
    repo: R,
}

impl<R: DocumentRepository> ContentService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Loads one document and projects it with `spec`.
    ///
    /// # Errors
    /// - `RepoError::NotFound` when `collection` holds no document `id`.
    pub fn fetch_projected(
        &self,
        collection: &str,
        id: ObjectId,
        spec: &FieldSpec,
    ) -> RepoResult<Map<String, Value>> {
        let mut document = self
            .repo
            .get(collection, id)?
            .ok_or_else(|| RepoError::NotFound {
                collection: collection.to_string(),
                id,
            })?;
        self.prepare_and_project(collection, &mut document, spec)
    }

    /// Lists one collection page and projects every document with `spec`.
    pub fn list_projected(
        &self,
        collection: &str,
        query: &DocumentListQuery,
        spec: &FieldSpec,
    ) -> RepoResult<Vec<Map<String, Value>>> {
        let documents = self.repo.list(collection, query)?;
        let mut projected = Vec::with_capacity(documents.len());
        for mut document in documents {
            projected.push(self.prepare_and_project(collection, &mut document, spec)?);
        }
        Ok(projected)
    }

    /// Validates and stores a crawled record in its source collection.
    ///
    /// # Errors
    /// - `RepoError::Model` when a declared field is out of shape.
    pub fn ingest_raw(&self, record: &RawRecord) -> RepoResult<ObjectId> {
        record.validate()?;
        let id = self
            .repo
            .insert(record.source.collection(), &record.to_document(), &[])?;
        debug!(
            "event=raw_ingest module=service status=ok collection={} field_count={}",
            record.source.collection(),
            record.fields.len()
        );
        Ok(id)
    }

    fn prepare_and_project(
        &self,
        collection: &str,
        document: &mut Document,
        spec: &FieldSpec,
    ) -> RepoResult<Map<String, Value>> {
        strip_hidden(collection, document);
        let mut resolved = 0;
        for selector in spec.effective_selectors(&*document) {
            if selector.is_reserved() {
                continue;
            }
            resolved += self.repo.resolve_path(document, selector.path(), &strip_hidden)?;
        }
        if resolved > 0 {
            debug!(
                "event=resolve_references module=service status=ok collection={} resolved={}",
                collection, resolved
            );
        }
        Ok(project(&*document, spec))
    }
}

fn strip_hidden(collection: &str, document: &mut Document) {
    for (hidden_collection, field) in HIDDEN_FIELDS {
        if *hidden_collection == collection {
            document.remove(field);
        }
    }
}
