//! Plain-text PGM (`P2`) map files for ffmpeg's `remap` filter.
//!
//! Each file starts with `P2 <W> <H> 65535` followed by `H` lines of `W`
//! space-separated decimal integers. One file carries the horizontal map, the
//! other the vertical map.
//!
//! Both files are written to temporary names in the destination directory and
//! only renamed into place once both are complete, so a failed write never
//! leaves a half-written map behind for the encoder to pick up.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{CoreError, CoreResult};
use crate::remap::grid::RemapGrid;

/// Maximum sample value declared in the header.
pub const PGM_MAXVAL: u32 = 65535;

/// Paths of a written pair of map files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapPaths {
    pub x_path: PathBuf,
    pub y_path: PathBuf,
}

/// A map matrix read back from a `P2` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgmMap {
    pub width: u32,
    pub height: u32,
    pub values: Vec<i32>,
}

/// Writes the horizontal map to `x_path` and the vertical map to `y_path`.
pub fn write(grid: &RemapGrid, x_path: &Path, y_path: &Path) -> CoreResult<MapPaths> {
    let x_tmp = write_temp(grid, grid.x_rows(), x_path)?;
    let y_tmp = write_temp(grid, grid.y_rows(), y_path)?;

    persist(x_tmp, x_path)?;
    if let Err(e) = persist(y_tmp, y_path) {
        let _ = fs::remove_file(x_path);
        return Err(e);
    }

    log::debug!(
        "Wrote {}x{} map files: {}, {}",
        grid.width(),
        grid.height(),
        x_path.display(),
        y_path.display()
    );

    Ok(MapPaths {
        x_path: x_path.to_path_buf(),
        y_path: y_path.to_path_buf(),
    })
}

fn write_temp<'a>(
    grid: &RemapGrid,
    rows: impl Iterator<Item = &'a [i32]>,
    dest: &Path,
) -> CoreResult<NamedTempFile> {
    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let io_err = |source| CoreError::FileIoFailed {
        path: dest.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    {
        let mut out = BufWriter::new(tmp.as_file_mut());
        write_matrix(&mut out, grid.width(), grid.height(), rows).map_err(io_err)?;
        out.flush().map_err(io_err)?;
    }
    Ok(tmp)
}

fn persist(tmp: NamedTempFile, dest: &Path) -> CoreResult<()> {
    tmp.persist(dest).map_err(|e| CoreError::FileIoFailed {
        path: dest.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

/// Writes one `P2` matrix to `out`.
pub fn write_matrix<'a, W: Write>(
    out: &mut W,
    width: u32,
    height: u32,
    rows: impl Iterator<Item = &'a [i32]>,
) -> std::io::Result<()> {
    writeln!(out, "P2 {width} {height} {PGM_MAXVAL}")?;
    for row in rows {
        let mut first = true;
        for value in row {
            if !first {
                out.write_all(b" ")?;
            }
            write!(out, "{value}")?;
            first = false;
        }
        out.write_all(b"\n")?;
    }
    Ok(())
}

/// Reads a `P2` map file back into memory.
pub fn read(path: &Path) -> CoreResult<PgmMap> {
    let text = fs::read_to_string(path).map_err(|source| CoreError::FileIoFailed {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text).map_err(|msg| CoreError::FileIoFailed {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, msg),
    })
}

/// Parses the text of a `P2` map.
pub fn parse(text: &str) -> Result<PgmMap, String> {
    let mut tokens = text.split_ascii_whitespace();

    match tokens.next() {
        Some("P2") => {}
        other => return Err(format!("expected P2 magic, found {other:?}")),
    }
    let mut header = |name: &str| -> Result<u32, String> {
        tokens
            .next()
            .ok_or_else(|| format!("missing {name}"))?
            .parse::<u32>()
            .map_err(|e| format!("invalid {name}: {e}"))
    };
    let width = header("width")?;
    let height = header("height")?;
    let _maxval = header("maxval")?;

    let values = tokens
        .map(|t| t.parse::<i32>().map_err(|e| format!("invalid sample '{t}': {e}")))
        .collect::<Result<Vec<_>, _>>()?;

    let expected = width as usize * height as usize;
    if values.len() != expected {
        return Err(format!(
            "expected {expected} samples for {width}x{height}, found {}",
            values.len()
        ));
    }

    Ok(PgmMap {
        width,
        height,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remap::grid::generate;

    #[test]
    fn header_and_rows_are_plain_text() {
        let rows: Vec<&[i32]> = vec![&[0, -1, 2], &[3, 4, 65535]];
        let mut out = Vec::new();
        write_matrix(&mut out, 3, 2, rows.into_iter()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "P2 3 2 65535\n0 -1 2\n3 4 65535\n"
        );
    }

    #[test]
    fn written_files_read_back_to_the_grid() {
        let dir = tempfile::tempdir().unwrap();
        let grid = generate(48, 27, false);
        let files = write(&grid, &dir.path().join("x.pgm"), &dir.path().join("y.pgm")).unwrap();

        let x = read(&files.x_path).unwrap();
        let y = read(&files.y_path).unwrap();
        assert_eq!((x.width, x.height), (grid.width(), grid.height()));
        assert_eq!(x.values, grid.x_map());
        assert_eq!(y.values, grid.y_map());

        let y_text = fs::read_to_string(&files.y_path).unwrap();
        let second_row = y_text.lines().nth(2).unwrap();
        assert!(second_row.split(' ').all(|v| v == "1"));
    }

    #[test]
    fn no_temporary_files_are_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let grid = generate(16, 9, true);
        write(&grid, &dir.path().join("x.pgm"), &dir.path().join("y.pgm")).unwrap();
        let mut names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, ["x.pgm", "y.pgm"]);
    }

    #[test]
    fn unwritable_destination_fails_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let grid = generate(16, 9, false);
        let err = write(&grid, &missing.join("x.pgm"), &missing.join("y.pgm")).unwrap_err();
        assert!(matches!(err, CoreError::FileIoFailed { .. }));
        assert!(!missing.join("x.pgm").exists());
    }

    #[test]
    fn missing_y_directory_leaves_no_x_map() {
        let dir = tempfile::tempdir().unwrap();
        let x_path = dir.path().join("x.pgm");
        let y_path = dir.path().join("missing").join("y.pgm");
        let grid = generate(16, 9, false);

        let err = write(&grid, &x_path, &y_path).unwrap_err();
        assert!(matches!(err, CoreError::FileIoFailed { ref path, .. } if *path == y_path));
        assert!(!x_path.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn failed_y_persist_removes_the_x_map() {
        let dir = tempfile::tempdir().unwrap();
        let x_path = dir.path().join("x.pgm");
        // a non-empty directory cannot be replaced by a file
        let y_path = dir.path().join("y.pgm");
        fs::create_dir(&y_path).unwrap();
        fs::write(y_path.join("keep"), b"").unwrap();
        let grid = generate(16, 9, true);

        let err = write(&grid, &x_path, &y_path).unwrap_err();
        assert!(matches!(err, CoreError::FileIoFailed { ref path, .. } if *path == y_path));
        assert!(!x_path.exists());
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(parse("P5 1 1 255\n0\n").is_err());
        assert!(parse("P2 2 1 65535\n0\n").is_err());
        assert!(parse("P2 1 1 65535\nabc\n").is_err());
        assert_eq!(
            parse("P2 2 1 65535\n-3 7\n").unwrap().values,
            vec![-3, 7]
        );
    }
}
