//! Export boundary: a consistent snapshot of the drawing plus the collaborators
//! that archive it, store it by content hash and record that hash on a ledger.

mod archive;
mod ipfs;
mod ledger;
mod publish;

use std::io;

use thiserror::Error;

use crate::geometry::Dimensions;
use crate::log::{ActionLog, LogError};
use crate::projector::project;
use crate::surface::SurfaceError;

pub use archive::{ZipArchiver, ARCHIVE_FILE_NAME, IMAGE_ENTRY, LOG_ENTRY};
pub use ipfs::IpfsClient;
pub use ledger::{
    decode_string_return, encode_store_call, EthLedger, GET_HASH_SELECTOR, STORE_HASH_SELECTOR,
};
pub use publish::{spawn_publish, PendingPublish, PublishPipeline, PublishReport, PublishStage};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Log(#[from] LogError),
    #[error(transparent)]
    Image(#[from] SurfaceError),
    #[error("failed to build archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type ExportResult<T> = std::result::Result<T, ExportError>;

/// Failures talking to a remote content store or ledger node.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("json-rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
    #[error("transaction {transaction} reverted")]
    Reverted { transaction: String },
    #[error("timed out waiting for receipt of transaction {transaction}")]
    Timeout { transaction: String },
}

pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// The log document and its rendered image, taken together so they always agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub log_json: String,
    pub png: Vec<u8>,
    pub dimensions: Dimensions,
}

impl Snapshot {
    /// Serializes `log` and encodes its projection at `dims`.
    ///
    /// The image is always projected from the log, never read back from a
    /// live surface.
    pub fn capture(log: &ActionLog, dims: Dimensions) -> ExportResult<Self> {
        let log_json = log.to_json()?;
        let png = project(log.actions(), dims).encode_png()?;
        tracing::debug!(
            actions = log.len(),
            png_bytes = png.len(),
            width = dims.width(),
            height = dims.height(),
            "captured export snapshot"
        );
        Ok(Self {
            log_json,
            png,
            dimensions: dims,
        })
    }
}

pub trait Archiver {
    fn archive(&self, snapshot: &Snapshot) -> ExportResult<Vec<u8>>;
}

/// Content-addressable store. `put` returns the content identifier.
pub trait ContentStore {
    fn put(&self, file_name: &str, bytes: &[u8]) -> TransportResult<String>;
}

/// Append-only record of the most recent published hash.
pub trait Ledger {
    /// Records `hash`, returning the transaction id once it is confirmed.
    fn store_hash(&self, hash: &str) -> TransportResult<String>;
    /// The last recorded hash, `None` when nothing has been stored.
    fn last_hash(&self) -> TransportResult<Option<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Color, Point};
    use crate::log::{Action, Tool};

    fn sample_log() -> ActionLog {
        ActionLog::from_actions(vec![
            Action::StartStroke {
                point: Point::new(2, 2),
                color: Color::new(200, 0, 0),
                width: 3,
                tool: Tool::Pen,
            },
            Action::DrawSegment {
                point: Point::new(12, 9),
            },
        ])
        .unwrap()
    }

    #[test]
    fn snapshot_image_matches_projection_of_log() {
        let log = sample_log();
        let dims = Dimensions::new(20, 16);
        let snapshot = Snapshot::capture(&log, dims).unwrap();

        let decoded = image::load_from_memory(&snapshot.png).unwrap().to_rgb8();
        assert_eq!(decoded.as_raw(), project(log.actions(), dims).as_raw());
        assert_eq!(ActionLog::from_json(&snapshot.log_json).unwrap(), log);
    }

    #[test]
    fn empty_log_snapshot_is_blank_image() {
        let snapshot = Snapshot::capture(&ActionLog::new(), Dimensions::new(4, 4)).unwrap();
        let decoded = image::load_from_memory(&snapshot.png).unwrap().to_rgb8();
        assert!(decoded.pixels().all(|pixel| pixel.0 == [255, 255, 255]));
        assert!(snapshot.log_json.contains("\"actions\""));
    }
}
