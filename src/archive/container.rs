use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::{Result, ViewerError};

/// Tar-family layouts an archive may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    TarGz,
    Tar,
}

impl ContainerFormat {
    /// Determine the layout of an archive, trying gzip-compressed tar first
    /// and falling back to plain tar.
    pub fn detect(path: &Path) -> Result<Self> {
        let open_err = |reason: String| ViewerError::ArchiveOpen {
            path: path.to_path_buf(),
            reason,
        };

        let gz_err = match ContainerFormat::TarGz.probe(path) {
            Ok(()) => return Ok(ContainerFormat::TarGz),
            Err(e) => e,
        };
        tracing::debug!("{} is not a gzip tar ({}), trying plain tar", path.display(), gz_err);

        match ContainerFormat::Tar.probe(path) {
            Ok(()) => Ok(ContainerFormat::Tar),
            Err(tar_err) => Err(open_err(format!(
                "not a tar.gz ({}) and not a tar ({})",
                gz_err, tar_err
            ))),
        }
    }

    /// Read the first entry header; an error means this layout does not fit.
    fn probe(self, path: &Path) -> io::Result<()> {
        let mut archive = self.open(path)?;
        let mut entries = archive.entries()?;
        match entries.next() {
            Some(Err(e)) => Err(e),
            _ => Ok(()),
        }
    }

    /// Open a fresh reader over the whole archive.
    pub fn open(self, path: &Path) -> io::Result<tar::Archive<Box<dyn Read>>> {
        let file = BufReader::new(File::open(path)?);
        let reader: Box<dyn Read> = match self {
            ContainerFormat::TarGz => Box::new(MultiGzDecoder::new(file)),
            ContainerFormat::Tar => Box::new(file),
        };
        Ok(tar::Archive::new(reader))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn tar_bytes() -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        let data = b"{}";
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, "scandata.json", &data[..])
            .unwrap();
        builder.into_inner().unwrap()
    }

    #[test]
    fn detects_gzip_then_plain() {
        let dir = tempfile::tempdir().unwrap();

        let plain = dir.path().join("plain.tar");
        std::fs::write(&plain, tar_bytes()).unwrap();
        assert_eq!(ContainerFormat::detect(&plain).unwrap(), ContainerFormat::Tar);

        let gz = dir.path().join("scan.tar.gz");
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&tar_bytes()).unwrap();
        std::fs::write(&gz, encoder.finish().unwrap()).unwrap();
        assert_eq!(ContainerFormat::detect(&gz).unwrap(), ContainerFormat::TarGz);
    }

    #[test]
    fn garbage_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let junk = dir.path().join("junk.bin");
        std::fs::write(&junk, vec![0x5a; 2048]).unwrap();
        let err = ContainerFormat::detect(&junk).unwrap_err();
        assert!(matches!(err, ViewerError::ArchiveOpen { .. }));
    }

    #[test]
    fn missing_file_is_rejected() {
        let err = ContainerFormat::detect(Path::new("/nonexistent/scan.tar.gz")).unwrap_err();
        assert!(matches!(err, ViewerError::ArchiveOpen { .. }));
    }
}
