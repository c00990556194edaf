//! Archive extraction, dispatched by filename suffix. Not part of the
//! concurrency core: it never holds a per-hash lock, and is only ever
//! invoked on staging or legacy directories (both always mutable),
//! never on the promoted store.

use std::fs::File;
use std::path::Path;

use flate2::read::GzDecoder;

use crate::error::{ArtifactError, Result};
use crate::fsutil;

/// Extracts `<dir>/<name>` into `dir`, dispatching on suffix. Rejects any
/// suffix other than `.tar.gz` and `.zip`.
pub fn extract_artifact(dir: &Path, name: &str) -> Result<()> {
    let archive_path = dir.join(name);

    if name.ends_with(".tar.gz") {
        extract_tar_gz(&archive_path, dir)
    } else if name.ends_with(".zip") {
        extract_zip(&archive_path, dir)
    } else {
        Err(ArtifactError::BadRequest(format!(
            "unsupported extension: {name:?}"
        )))
    }
}

fn extract_tar_gz(archive_path: &Path, dst: &Path) -> Result<()> {
    let file = File::open(archive_path)?;
    let decoder = GzDecoder::new(file);
    let mut archive = tar::Archive::new(decoder);
    archive
        .unpack(dst)
        .map_err(|err| ArtifactError::Io(anyhow::anyhow!("failed extracting tar.gz: {err}")))?;
    Ok(())
}

fn extract_zip(archive_path: &Path, dst: &Path) -> Result<()> {
    let file = File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|err| ArtifactError::Io(anyhow::anyhow!("failed opening zip: {err}")))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|err| ArtifactError::Io(anyhow::anyhow!("failed reading zip entry: {err}")))?;

        // The consumer's zip artifacts are flat by convention; skip
        // nested directories rather than recreating a hierarchy.
        if entry.is_dir() {
            continue;
        }

        let Some(entry_name) = entry.enclosed_name().map(|p| p.to_path_buf()) else {
            continue;
        };
        let dst_path = dst.join(&entry_name);

        if let Some(parent) = dst_path.parent() {
            fsutil::ensure_dir(parent)?;
        }

        let mut out_file = File::create(&dst_path)?;
        std::io::copy(&mut entry, &mut out_file)?;
        fsutil::set_mode(&dst_path)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn rejects_unsupported_extension() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("file.rar"), b"").unwrap();
        let result = extract_artifact(tmp.path(), "file.rar");
        assert!(matches!(result, Err(ArtifactError::BadRequest(_))));
    }

    #[test]
    fn extracts_tar_gz() {
        let tmp = tempfile::tempdir().unwrap();
        let archive_path = tmp.path().join("bundle.tar.gz");

        {
            let file = File::create(&archive_path).unwrap();
            let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
            let mut builder = tar::Builder::new(encoder);
            let mut header = tar::Header::new_gnu();
            header.set_size(5);
            header.set_cksum();
            builder
                .append_data(&mut header, "hello.txt", &b"world"[..])
                .unwrap();
            builder.into_inner().unwrap().finish().unwrap();
        }

        extract_artifact(tmp.path(), "bundle.tar.gz").unwrap();
        assert_eq!(
            std::fs::read(tmp.path().join("hello.txt")).unwrap(),
            b"world"
        );
    }

    #[test]
    fn extracts_zip_and_skips_nested_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let archive_path = tmp.path().join("bundle.zip");

        {
            let file = File::create(&archive_path).unwrap();
            let mut writer = zip::ZipWriter::new(file);
            let options =
                zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Stored);
            writer.add_directory("nested/", options).unwrap();
            writer.start_file("top.img", options).unwrap();
            writer.write_all(b"image-bytes").unwrap();
            writer.finish().unwrap();
        }

        extract_artifact(tmp.path(), "bundle.zip").unwrap();
        assert_eq!(
            std::fs::read(tmp.path().join("top.img")).unwrap(),
            b"image-bytes"
        );
        assert!(!tmp.path().join("nested").exists());
    }
}
