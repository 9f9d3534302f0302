//! JSON and JSON Lines chunk files

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::OutputFormat;
use crate::error::{Error, Result};
use crate::types::{Chunk, ChunkCollection};

/// Write chunks to `path`.
///
/// The records are written to a temporary file next to `path` and renamed
/// into place, so an existing file is only replaced by a complete one. A
/// symlinked `path` is written through to its target, and the target keeps
/// its permissions. New files are created readable by group and others.
pub fn save_chunks(path: &Path, chunks: &[Chunk], format: OutputFormat) -> Result<()> {
    let target = resolve_target(path);
    let parent = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let tmp = NamedTempFile::new_in(parent)
        .map_err(|e| Error::write(path, format!("cannot create file in {}: {}", parent.display(), e)))?;
    apply_permissions(tmp.as_file(), &target).map_err(|e| Error::write(path, e.to_string()))?;

    let mut writer = BufWriter::new(tmp);
    write_records(&mut writer, chunks, format).map_err(|e| Error::write(path, e.to_string()))?;

    let tmp = writer
        .into_inner()
        .map_err(|e| Error::write(path, e.error().to_string()))?;
    tmp.persist(&target)
        .map_err(|e| Error::write(path, e.error.to_string()))?;

    tracing::info!("Saved {} chunks to {}", chunks.len(), path.display());
    Ok(())
}

/// Follow a symlinked output path to the file it points at
fn resolve_target(path: &Path) -> PathBuf {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
        }
        _ => path.to_path_buf(),
    }
}

/// Give the temporary file the mode of the file it replaces, or 0644 for a new file
fn apply_permissions(file: &File, target: &Path) -> std::io::Result<()> {
    match fs::metadata(target) {
        Ok(meta) => file.set_permissions(meta.permissions()),
        #[cfg(unix)]
        Err(_) => {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(NEW_FILE_MODE))
        }
        #[cfg(not(unix))]
        Err(_) => Ok(()),
    }
}

#[cfg(unix)]
const NEW_FILE_MODE: u32 = 0o644;

fn write_records<W: Write>(writer: &mut W, chunks: &[Chunk], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, chunks)?;
            writer.write_all(b"\n")?;
        }
        OutputFormat::JsonLines => {
            for chunk in chunks {
                serde_json::to_writer(&mut *writer, chunk)?;
                writer.write_all(b"\n")?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

/// Read a chunk file written by [`save_chunks`]
pub fn load_chunks(path: &Path, format: OutputFormat) -> Result<ChunkCollection> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    match format {
        OutputFormat::Json => {
            let chunks: Vec<Chunk> = serde_json::from_reader(reader)?;
            Ok(chunks.into())
        }
        OutputFormat::JsonLines => {
            let mut chunks = Vec::new();
            for line in reader.lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                chunks.push(serde_json::from_str::<Chunk>(&line)?);
            }
            Ok(chunks.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ChunkCollection {
        vec![
            Chunk::new("a.pdf", 0, "Première phrase, «citée».".to_string(), 0, 500),
            Chunk::new("a.pdf", 1, "line one\nline \"two\"".to_string(), 450, 950),
            Chunk::new("b.pdf", 0, "short".to_string(), 0, 1),
        ]
        .into()
    }

    #[test]
    fn test_json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chunks.json");
        let chunks = sample();

        save_chunks(&path, &chunks, OutputFormat::Json).unwrap();
        let loaded = load_chunks(&path, OutputFormat::Json).unwrap();
        assert_eq!(loaded, chunks);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("Première"), "non-ASCII text is written unescaped");
        assert!(raw.contains("\"source_document\": \"a.pdf\""));
    }

    #[test]
    fn test_jsonl_one_record_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chunks.jsonl");
        let chunks = sample();

        save_chunks(&path, &chunks, OutputFormat::JsonLines).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw.lines().count(), 3);
        assert_eq!(load_chunks(&path, OutputFormat::JsonLines).unwrap(), chunks);
    }

    #[test]
    fn test_empty_collection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        save_chunks(&path, &[], OutputFormat::Json).unwrap();
        assert!(load_chunks(&path, OutputFormat::Json).unwrap().is_empty());
    }

    #[test]
    fn test_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chunks.json");
        std::fs::write(&path, "old contents").unwrap();

        save_chunks(&path, &sample(), OutputFormat::Json).unwrap();
        assert_eq!(load_chunks(&path, OutputFormat::Json).unwrap().len(), 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_new_file_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        save_chunks(&path, &sample(), OutputFormat::Json).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn test_existing_mode_preserved() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        std::fs::write(&path, "[]").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();

        save_chunks(&path, &sample(), OutputFormat::Json).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[cfg(unix)]
    #[test]
    fn test_writes_through_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real.json");
        let link = dir.path().join("link.json");
        std::fs::write(&real, "[]").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        save_chunks(&link, &sample(), OutputFormat::Json).unwrap();

        assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(load_chunks(&real, OutputFormat::Json).unwrap(), sample());
    }

    #[test]
    fn test_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("chunks.json");
        let err = save_chunks(&path, &sample(), OutputFormat::Json).unwrap_err();
        assert!(matches!(err, Error::Write { .. }));
    }

    #[test]
    fn test_path_is_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_chunks(dir.path(), &sample(), OutputFormat::Json).unwrap_err();
        assert!(matches!(err, Error::Write { .. }));
    }
}
