use crate::error::{BlobError, Result};
use async_stream::stream;
use bytes::{Bytes, BytesMut};
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use futures::TryStreamExt;
use serde::Serialize;
use sha2::{Digest, Sha256};
use sqlx::{Row, SqliteConnection, SqlitePool};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info, warn};

/// Payload bytes per chunk row.
pub const DEFAULT_CHUNK_SIZE: usize = 255 * 1024;

/// Content type reported for objects stored without one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Stream of payload chunks in sequence order.
pub type ChunkStream = BoxStream<'static, Result<Bytes>>;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub id: String,
    pub filename: String,
    pub content_type: Option<String>,
    /// Total payload size in bytes.
    pub length: u64,
    pub chunk_size: u64,
    /// SHA-256 of the payload, hex encoded.
    pub sha256: String,
    pub uploaded_at: DateTime<Utc>,
}

impl ObjectMeta {
    /// Number of chunk rows the payload occupies.
    pub fn chunk_count(&self) -> u64 {
        if self.chunk_size == 0 {
            return 0;
        }
        self.length.div_ceil(self.chunk_size)
    }

    pub fn content_type_or_default(&self) -> &str {
        self.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE)
    }
}

#[derive(sqlx::FromRow)]
struct ObjectRow {
    id: String,
    filename: String,
    content_type: Option<String>,
    length: i64,
    chunk_size: i64,
    sha256: String,
    uploaded_at: DateTime<Utc>,
}

impl From<ObjectRow> for ObjectMeta {
    fn from(row: ObjectRow) -> Self {
        Self {
            id: row.id,
            filename: row.filename,
            content_type: row.content_type,
            length: row.length.max(0) as u64,
            chunk_size: row.chunk_size.max(0) as u64,
            sha256: row.sha256,
            uploaded_at: row.uploaded_at,
        }
    }
}

/// A fully materialized object.
#[derive(Clone, Debug)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: String,
    pub filename: String,
}

/// Chunked object store sharing the application's SQLite pool.
///
/// Objects are written as a metadata row plus a sequence of fixed-size chunk
/// rows. At most one object exists per filename: publishing a new object
/// removes every older object with the same name in the same transaction.
#[derive(Clone, Debug)]
pub struct ObjectStore {
    pool: SqlitePool,
    chunk_size: usize,
    max_size: Option<u64>,
}

impl ObjectStore {
    /// Create the store, creating its tables if needed.
    pub async fn new(pool: SqlitePool) -> Result<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS object_files (
                id TEXT PRIMARY KEY,
                filename TEXT NOT NULL,
                content_type TEXT,
                length INTEGER NOT NULL,
                chunk_size INTEGER NOT NULL,
                sha256 TEXT NOT NULL,
                uploaded_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_object_files_filename ON object_files (filename)",
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS object_chunks (
                object_id TEXT NOT NULL,
                n INTEGER NOT NULL,
                data BLOB NOT NULL,
                PRIMARY KEY (object_id, n)
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self {
            pool,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_size: None,
        })
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Reject objects larger than `limit` bytes.
    pub fn with_max_size(mut self, limit: u64) -> Self {
        self.max_size = Some(limit);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Store everything `reader` yields under a new identifier.
    ///
    /// Chunks are written one at a time as the input arrives, without holding
    /// a write transaction open across reads. The object only becomes visible
    /// when its metadata row is inserted, in one short transaction that also
    /// removes older objects named `filename`. A failed upload discards its own
    /// chunks and leaves those older objects in place.
    pub async fn put<R>(
        &self,
        mut reader: R,
        filename: &str,
        content_type: Option<&str>,
    ) -> Result<String>
    where
        R: AsyncRead + Unpin + Send,
    {
        let id = uuid::Uuid::new_v4().simple().to_string();

        let written = match self.write_chunks(&mut reader, &id).await {
            Ok(written) => written,
            Err(e) => {
                self.discard_chunks(&id).await;
                return Err(e);
            }
        };

        if let Err(e) = self.publish(&id, filename, content_type, &written).await {
            self.discard_chunks(&id).await;
            return Err(e);
        }

        info!(
            "Stored object {} ({:?}, {} bytes in {} chunks)",
            id, filename, written.length, written.chunks
        );
        Ok(id)
    }

    pub async fn put_bytes(
        &self,
        data: impl AsRef<[u8]>,
        filename: &str,
        content_type: Option<&str>,
    ) -> Result<String> {
        self.put(data.as_ref(), filename, content_type).await
    }

    /// Read a whole object into one contiguous buffer.
    pub async fn get(&self, id: &str) -> Result<StoredObject> {
        let meta = self.metadata(id).await?;

        let mut data = BytesMut::with_capacity(usize::try_from(meta.length).unwrap_or(0));
        let mut rows =
            sqlx::query("SELECT n, data FROM object_chunks WHERE object_id = ? ORDER BY n")
                .bind(id)
                .fetch(&self.pool);

        let mut expected: i64 = 0;
        while let Some(row) = rows.try_next().await? {
            let n: i64 = row.try_get("n")?;
            if n != expected {
                return Err(BlobError::corrupt(
                    id,
                    format!("expected chunk {}, found {}", expected, n),
                ));
            }
            let chunk: Vec<u8> = row.try_get("data")?;
            data.extend_from_slice(&chunk);
            expected += 1;
        }

        if expected as u64 != meta.chunk_count() {
            return Err(BlobError::corrupt(
                id,
                format!("expected {} chunks, found {}", meta.chunk_count(), expected),
            ));
        }
        if data.len() as u64 != meta.length {
            return Err(BlobError::corrupt(
                id,
                format!("expected {} bytes, found {}", meta.length, data.len()),
            ));
        }

        let actual_hash = format!("{:x}", Sha256::digest(&data));
        if actual_hash != meta.sha256 {
            return Err(BlobError::corrupt(
                id,
                format!("checksum mismatch: expected {}, got {}", meta.sha256, actual_hash),
            ));
        }

        Ok(StoredObject {
            data: data.freeze(),
            content_type: meta.content_type_or_default().to_string(),
            filename: meta.filename,
        })
    }

    /// Look up an object and stream its payload one chunk at a time.
    ///
    /// Fails with [`BlobError::NotFound`] before any payload is read, so
    /// callers can pick a response status up front.
    pub async fn open_download_stream(&self, id: &str) -> Result<(ObjectMeta, ChunkStream)> {
        let meta = self.metadata(id).await?;

        let pool = self.pool.clone();
        let object_id = meta.id.clone();
        let total = meta.chunk_count();

        let chunks: ChunkStream = Box::pin(stream! {
            for n in 0..total {
                match read_chunk(&pool, &object_id, n as i64).await {
                    Ok(chunk) => yield Ok(chunk),
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                }
            }
        });

        Ok((meta, chunks))
    }

    pub async fn metadata(&self, id: &str) -> Result<ObjectMeta> {
        let row: Option<ObjectRow> = sqlx::query_as(
            "SELECT id, filename, content_type, length, chunk_size, sha256, uploaded_at FROM object_files WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ObjectMeta::from)
            .ok_or_else(|| BlobError::NotFound(id.to_string()))
    }

    pub async fn find_by_filename(&self, filename: &str) -> Result<Vec<ObjectMeta>> {
        let rows: Vec<ObjectRow> = sqlx::query_as(
            "SELECT id, filename, content_type, length, chunk_size, sha256, uploaded_at FROM object_files WHERE filename = ? ORDER BY uploaded_at",
        )
        .bind(filename)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ObjectMeta::from).collect())
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let removed = delete_object(&mut tx, id).await?;
        tx.commit().await?;

        if removed {
            info!("Deleted object {}", id);
            Ok(())
        } else {
            Err(BlobError::NotFound(id.to_string()))
        }
    }

    /// Write the payload as chunk rows tagged with `id`. Each insert commits
    /// on its own.
    async fn write_chunks<R>(&self, reader: &mut R, id: &str) -> Result<WrittenChunks>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; self.chunk_size];
        let mut length: u64 = 0;
        let mut n: i64 = 0;

        loop {
            let filled = fill_chunk(reader, &mut buf).await?;
            if filled == 0 {
                break;
            }

            length += filled as u64;
            if let Some(limit) = self.max_size {
                if length > limit {
                    return Err(BlobError::TooLarge { limit });
                }
            }

            hasher.update(&buf[..filled]);
            sqlx::query("INSERT INTO object_chunks (object_id, n, data) VALUES (?, ?, ?)")
                .bind(id)
                .bind(n)
                .bind(&buf[..filled])
                .execute(&self.pool)
                .await?;
            n += 1;

            if filled < buf.len() {
                break;
            }
        }

        Ok(WrittenChunks {
            length,
            chunks: n,
            sha256: format!("{:x}", hasher.finalize()),
        })
    }

    /// Replace same-named objects with `id` in one transaction.
    async fn publish(
        &self,
        id: &str,
        filename: &str,
        content_type: Option<&str>,
        written: &WrittenChunks,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let replaced = delete_named(&mut tx, filename).await?;
        for old in &replaced {
            debug!("Replacing object {} named {:?}", old, filename);
        }

        sqlx::query(
            "INSERT INTO object_files (id, filename, content_type, length, chunk_size, sha256, uploaded_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(filename)
        .bind(content_type)
        .bind(written.length as i64)
        .bind(self.chunk_size as i64)
        .bind(&written.sha256)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn discard_chunks(&self, id: &str) {
        let result = sqlx::query("DELETE FROM object_chunks WHERE object_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await;
        if let Err(e) = result {
            warn!("Failed to discard chunks of unfinished object {}: {}", id, e);
        }
    }
}

/// Totals for a payload whose chunks are written but not yet published.
struct WrittenChunks {
    length: u64,
    chunks: i64,
    sha256: String,
}

/// Read until `buf` is full or the input ends.
async fn fill_chunk<R>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        let read = reader.read(&mut buf[filled..]).await?;
        if read == 0 {
            break;
        }
        filled += read;
    }
    Ok(filled)
}

async fn read_chunk(pool: &SqlitePool, id: &str, n: i64) -> Result<Bytes> {
    let chunk: Option<Vec<u8>> =
        sqlx::query_scalar("SELECT data FROM object_chunks WHERE object_id = ? AND n = ?")
            .bind(id)
            .bind(n)
            .fetch_optional(pool)
            .await?;

    chunk
        .map(Bytes::from)
        .ok_or_else(|| BlobError::corrupt(id, format!("missing chunk {}", n)))
}

async fn delete_named(conn: &mut SqliteConnection, filename: &str) -> Result<Vec<String>> {
    let ids: Vec<String> = sqlx::query_scalar("SELECT id FROM object_files WHERE filename = ?")
        .bind(filename)
        .fetch_all(&mut *conn)
        .await?;

    for id in &ids {
        delete_object(conn, id).await?;
    }
    Ok(ids)
}

async fn delete_object(conn: &mut SqliteConnection, id: &str) -> Result<bool> {
    sqlx::query("DELETE FROM object_chunks WHERE object_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    let result = sqlx::query("DELETE FROM object_files WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}
