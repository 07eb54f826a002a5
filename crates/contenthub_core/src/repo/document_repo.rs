//! Document repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Store documents as JSON bodies keyed by `(collection, id)`.
//! - Enforce per-collection unique field values.
//! - Resolve reference links to their target documents on demand, one hop
//!   per path segment.
//!
//! # Invariants
//! - Typed write paths call `validate()` before any SQL mutation.
//! - Unique-field claims and the document row change in one transaction.
//! - Read paths reject undecodable bodies instead of masking them.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::document::Document;
use crate::model::object_id::ObjectId;
use crate::model::record::{FieldValue, Reference};
use crate::model::schema::{ModelError, Schema, UniqueKey};
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

const LIST_LIMIT_MAX: u32 = 200;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for document persistence and lookup.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Model(ModelError),
    NotFound {
        collection: String,
        id: ObjectId,
    },
    /// A unique field value (or the document ID) is already taken.
    Duplicate {
        collection: String,
        field: &'static str,
        value: String,
    },
    InvalidData(String),
    /// Connection was not opened through `open_db*`.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Model(err) => write!(f, "{err}"),
            Self::NotFound { collection, id } => {
                write!(f, "document not found: {collection}/{id}")
            }
            Self::Duplicate {
                collection,
                field,
                value,
            } => write!(f, "duplicate {collection}.{field} value `{value}`"),
            Self::InvalidData(message) => write!(f, "invalid stored document: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Model(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ModelError> for RepoError {
    fn from(value: ModelError) -> Self {
        Self::Model(value)
    }
}

/// Paging options for listing one collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentListQuery {
    /// Maximum rows to return; clamped to 200.
    pub limit: Option<u32>,
    pub offset: u32,
    /// Order by insertion time descending instead of ascending.
    pub newest_first: bool,
}

/// Repository interface for document CRUD operations.
pub trait DocumentRepository {
    /// Inserts a new document; the document must carry an `id`.
    fn insert(
        &self,
        collection: &str,
        document: &Document,
        unique: &[UniqueKey],
    ) -> RepoResult<ObjectId>;
    /// Replaces an existing document body and its unique claims.
    fn replace(&self, collection: &str, document: &Document, unique: &[UniqueKey])
        -> RepoResult<()>;
    fn get(&self, collection: &str, id: ObjectId) -> RepoResult<Option<Document>>;
    /// First document (by insertion order) whose top-level text `field`
    /// equals `value`.
    fn find_one_by(&self, collection: &str, field: &str, value: &str)
        -> RepoResult<Option<Document>>;
    /// Document owning a unique claim.
    fn find_by_unique(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> RepoResult<Option<Document>>;
    fn list(&self, collection: &str, query: &DocumentListQuery) -> RepoResult<Vec<Document>>;
    fn count(&self, collection: &str) -> RepoResult<u64>;
    fn delete(&self, collection: &str, id: ObjectId) -> RepoResult<()>;

    /// Replaces top-level reference links (also inside lists) with their
    /// loaded targets. Dangling links stay links.
    ///
    /// Returns the number of links resolved.
    fn resolve_references(&self, document: &mut Document) -> RepoResult<usize> {
        let names: Vec<String> = document.iter().map(|(name, _)| name.to_string()).collect();
        let mut resolved = 0;
        for name in names {
            resolved += self.resolve_path(document, std::slice::from_ref(&name), &|_, _| {})?;
        }
        Ok(resolved)
    }

    /// Loads every link crossed by the dotted `path`, hop by hop.
    ///
    /// Intermediate links are replaced by their targets and the walk goes on
    /// inside them; embedded documents are entered without a load. When the
    /// path ends on a link, or on a list holding links, those are loaded too.
    /// `on_load` sees each freshly loaded target with its collection before
    /// the walk continues into it.
    ///
    /// Returns the number of links resolved.
    fn resolve_path(
        &self,
        document: &mut Document,
        path: &[String],
        on_load: &dyn Fn(&str, &mut Document),
    ) -> RepoResult<usize> {
        let Some((first, rest)) = path.split_first() else {
            return Ok(0);
        };
        let Some(value) = document.get_mut(first) else {
            return Ok(0);
        };

        match value {
            FieldValue::Reference(reference) => {
                let mut resolved = usize::from(self.resolve_link(reference, on_load)?);
                if let Reference::Resolved(target) = reference {
                    resolved += self.resolve_path(target, rest, on_load)?;
                }
                Ok(resolved)
            }
            FieldValue::Embedded(inner) => self.resolve_path(inner, rest, on_load),
            FieldValue::List(items) if rest.is_empty() => {
                let mut resolved = 0;
                for item in items.iter_mut() {
                    if let FieldValue::Reference(reference) = item {
                        resolved += usize::from(self.resolve_link(reference, on_load)?);
                    }
                }
                Ok(resolved)
            }
            _ => Ok(0),
        }
    }

    /// Loads the target of one link in place; returns whether it resolved.
    fn resolve_link(
        &self,
        reference: &mut Reference,
        on_load: &dyn Fn(&str, &mut Document),
    ) -> RepoResult<bool> {
        let Reference::Link { collection, id } = reference else {
            return Ok(false);
        };
        match self.get(collection, *id)? {
            Some(mut target) => {
                on_load(collection, &mut target);
                *reference = Reference::Resolved(Box::new(target));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Validates and inserts a typed document.
    fn insert_schema<T: Schema>(&self, item: &T) -> RepoResult<ObjectId>
    where
        Self: Sized,
    {
        item.validate()?;
        self.insert(T::COLLECTION, &item.to_document(), &item.unique_keys())
    }

    /// Validates and replaces a typed document.
    fn replace_schema<T: Schema>(&self, item: &T) -> RepoResult<()>
    where
        Self: Sized,
    {
        item.validate()?;
        self.replace(T::COLLECTION, &item.to_document(), &item.unique_keys())
    }

    /// Loads and decodes a typed document.
    fn load<T: Schema>(&self, id: ObjectId) -> RepoResult<Option<T>>
    where
        Self: Sized,
    {
        match self.get(T::COLLECTION, id)? {
            Some(document) => Ok(Some(T::from_document(&document)?)),
            None => Ok(None),
        }
    }
}

/// SQLite-backed document repository.
pub struct SqliteDocumentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version: u32 =
            conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl DocumentRepository for SqliteDocumentRepository<'_> {
    fn insert(
        &self,
        collection: &str,
        document: &Document,
        unique: &[UniqueKey],
    ) -> RepoResult<ObjectId> {
        let id = require_id(document)?;
        let body = encode_body(document)?;

        let tx = self.conn.unchecked_transaction()?;
        if document_exists(&tx, collection, id)? {
            return Err(RepoError::Duplicate {
                collection: collection.to_string(),
                field: "id",
                value: id.to_hex(),
            });
        }
        tx.execute(
            "INSERT INTO documents (collection, id, body) VALUES (?1, ?2, ?3);",
            params![collection, id.to_hex(), body],
        )?;
        claim_unique_keys(&tx, collection, id, unique)?;
        tx.commit()?;

        Ok(id)
    }

    fn replace(
        &self,
        collection: &str,
        document: &Document,
        unique: &[UniqueKey],
    ) -> RepoResult<()> {
        let id = require_id(document)?;
        let body = encode_body(document)?;

        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE documents
             SET
                body = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE collection = ?1 AND id = ?2;",
            params![collection, id.to_hex(), body],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                collection: collection.to_string(),
                id,
            });
        }
        tx.execute(
            "DELETE FROM unique_fields WHERE collection = ?1 AND document_id = ?2;",
            params![collection, id.to_hex()],
        )?;
        claim_unique_keys(&tx, collection, id, unique)?;
        tx.commit()?;

        Ok(())
    }

    fn get(&self, collection: &str, id: ObjectId) -> RepoResult<Option<Document>> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND id = ?2;",
                params![collection, id.to_hex()],
                |row| row.get(0),
            )
            .optional()?;
        body.map(|text| decode_body(collection, &text)).transpose()
    }

    fn find_one_by(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> RepoResult<Option<Document>> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT d.body
                 FROM documents AS d, json_each(d.body) AS f
                 WHERE d.collection = ?1
                   AND json_extract(f.value, '$[0]') = ?2
                   AND json_extract(f.value, '$[1].text') = ?3
                 ORDER BY d.created_at ASC, d.rowid ASC
                 LIMIT 1;",
                params![collection, field, value],
                |row| row.get(0),
            )
            .optional()?;
        body.map(|text| decode_body(collection, &text)).transpose()
    }

    fn find_by_unique(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> RepoResult<Option<Document>> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT d.body
                 FROM unique_fields AS u
                 JOIN documents AS d
                   ON d.collection = u.collection AND d.id = u.document_id
                 WHERE u.collection = ?1 AND u.field = ?2 AND u.value = ?3;",
                params![collection, field, value],
                |row| row.get(0),
            )
            .optional()?;
        body.map(|text| decode_body(collection, &text)).transpose()
    }

    fn list(&self, collection: &str, query: &DocumentListQuery) -> RepoResult<Vec<Document>> {
        let order = if query.newest_first { "DESC" } else { "ASC" };
        let limit = query
            .limit
            .map_or(-1, |limit| i64::from(limit.min(LIST_LIMIT_MAX)));
        let mut stmt = self.conn.prepare(&format!(
            "SELECT body
             FROM documents
             WHERE collection = ?1
             ORDER BY created_at {order}, rowid {order}
             LIMIT ?2 OFFSET ?3;"
        ))?;

        let mut rows = stmt.query(params![collection, limit, i64::from(query.offset)])?;
        let mut documents = Vec::new();
        while let Some(row) = rows.next()? {
            let body: String = row.get(0)?;
            documents.push(decode_body(collection, &body)?);
        }
        Ok(documents)
    }

    fn count(&self, collection: &str) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1;",
            [collection],
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count {count}")))
    }

    fn delete(&self, collection: &str, id: ObjectId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2;",
            params![collection, id.to_hex()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                collection: collection.to_string(),
                id,
            });
        }
        Ok(())
    }
}

fn require_id(document: &Document) -> RepoResult<ObjectId> {
    document
        .id()
        .ok_or_else(|| RepoError::InvalidData("document has no `id` field".to_string()))
}

fn encode_body(document: &Document) -> RepoResult<String> {
    serde_json::to_string(document)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode document: {err}")))
}

fn decode_body(collection: &str, body: &str) -> RepoResult<Document> {
    serde_json::from_str(body).map_err(|err| {
        RepoError::InvalidData(format!("cannot decode `{collection}` document: {err}"))
    })
}

fn document_exists(conn: &Connection, collection: &str, id: ObjectId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM documents WHERE collection = ?1 AND id = ?2);",
        params![collection, id.to_hex()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn claim_unique_keys(
    conn: &Connection,
    collection: &str,
    id: ObjectId,
    unique: &[UniqueKey],
) -> RepoResult<()> {
    for key in unique {
        let owner: Option<String> = conn
            .query_row(
                "SELECT document_id FROM unique_fields
                 WHERE collection = ?1 AND field = ?2 AND value = ?3;",
                params![collection, key.field, key.value],
                |row| row.get(0),
            )
            .optional()?;
        if owner.is_some_and(|owner| owner != id.to_hex()) {
            return Err(RepoError::Duplicate {
                collection: collection.to_string(),
                field: key.field,
                value: key.value.clone(),
            });
        }
        conn.execute(
            "INSERT OR REPLACE INTO unique_fields (collection, field, value, document_id)
             VALUES (?1, ?2, ?3, ?4);",
            params![collection, key.field, key.value, id.to_hex()],
        )?;
    }
    Ok(())
}
