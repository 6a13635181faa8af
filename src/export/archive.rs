use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{Archiver, ExportResult, Snapshot};

pub const LOG_ENTRY: &str = "drawing_data.json";
pub const IMAGE_ENTRY: &str = "drawing_image.png";
pub const ARCHIVE_FILE_NAME: &str = "drawing.zip";

/// Packs a snapshot into an in-memory zip with the log and image entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiver;

impl Archiver for ZipArchiver {
    fn archive(&self, snapshot: &Snapshot) -> ExportResult<Vec<u8>> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        writer.start_file(LOG_ENTRY, options)?;
        writer.write_all(snapshot.log_json.as_bytes())?;
        writer.start_file(IMAGE_ENTRY, options)?;
        writer.write_all(&snapshot.png)?;

        let bytes = writer.finish()?.into_inner();
        tracing::debug!(bytes = bytes.len(), "built drawing archive");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;
    use crate::geometry::{Dimensions, Point};
    use crate::log::{Action, ActionLog};
    use crate::session::ToolSettings;

    fn read_entry(archive: &mut zip::ZipArchive<Cursor<Vec<u8>>>, name: &str) -> Vec<u8> {
        let mut file = archive.by_name(name).unwrap();
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn archive_holds_log_and_image_entries() {
        let mut log = ActionLog::new();
        log.append(ToolSettings::default().stroke_start(Point::new(1, 1)))
            .unwrap();
        log.append(Action::DrawSegment {
            point: Point::new(6, 3),
        })
        .unwrap();
        let snapshot = Snapshot::capture(&log, Dimensions::new(8, 8)).unwrap();

        let bytes = ZipArchiver.archive(&snapshot).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();

        assert_eq!(archive.len(), 2);
        assert_eq!(read_entry(&mut archive, LOG_ENTRY), snapshot.log_json.as_bytes());
        assert_eq!(read_entry(&mut archive, IMAGE_ENTRY), snapshot.png);
    }
}
