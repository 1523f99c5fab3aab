use crate::error::DownloaderError;
use crate::types::IntegrityStatus;
use log::debug;
use std::fs::File;
use std::path::Path;

/// Checks that an existing `.zip` has a readable central directory.
///
/// Files that are not zips, do not exist, or are checked with verification
/// off are `NotApplicable`. Errors opening an existing file propagate.
pub fn verify(path: &Path, enabled: bool) -> Result<IntegrityStatus, DownloaderError> {
    let is_zip = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".zip"));
    if !enabled || !is_zip || !path.exists() {
        return Ok(IntegrityStatus::NotApplicable);
    }

    let file = File::open(path)?;
    match zip::ZipArchive::new(file) {
        Ok(archive) => {
            debug!("{} is a valid zip with {} entries", path.display(), archive.len());
            Ok(IntegrityStatus::Valid)
        }
        Err(e) => {
            debug!("{} failed zip validation: {}", path.display(), e);
            Ok(IntegrityStatus::Corrupt)
        }
    }
}

#[cfg(test)]
pub(crate) fn write_valid_zip(path: &Path) {
    use std::io::Write;
    let file = File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    writer
        .start_file("rom.bin", zip::write::SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"\x4e\x45\x53\x1a rom contents").unwrap();
    writer.finish().unwrap();
}
