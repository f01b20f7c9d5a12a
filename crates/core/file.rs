use std::{
    fs::{File, OpenOptions},
    io::{Read, Seek, Write},
    path::{Path, PathBuf},
};

use bookseek::shelf::Shelf;

use eyre::{eyre, Context};
use glob::glob;
use log::{info, trace};

/// Extension of shelf files, the content is JSON.
const SHELF_EXT: &str = "shelf";
/// Name of the shelf file created when none is given or found.
const DEFAULT_SHELF_NAME: &str = "bookshelf";

pub struct ShelfFile {
    file: File,
}

impl ShelfFile {
    const fn new(file: File) -> Self {
        Self { file }
    }

    pub fn read_shelf(&mut self) -> eyre::Result<Shelf> {
        let content = read_file_to_string(&mut self.file)?;

        // a newly created file has no content yet
        if content.trim().is_empty() {
            trace!("Shelf file is empty - starting with an empty shelf");
            return Ok(Shelf::new());
        }

        serde_json::from_str(&content).wrap_err("Shelf file does not contain a valid shelf")
    }

    pub fn write_shelf(&mut self, shelf: &Shelf) -> eyre::Result<()> {
        fn overwrite_file_from_start(file: &mut File, bytes: &[u8]) -> std::io::Result<()> {
            // Rewind the cursor back to the start of the file to write over the contents and set
            // the length of the file to be equal to bytes so that existing data is removed
            file.rewind()?;
            file.set_len(bytes.len() as u64)?;
            file.write_all(bytes)
        }

        let bytes = serde_json::to_vec_pretty(shelf).wrap_err("Cannot serialize the shelf")?;
        overwrite_file_from_start(&mut self.file, &bytes).wrap_err("Cannot write the shelf file")
    }
}

pub fn open_or_create_shelf_file(file_name: Option<PathBuf>) -> eyre::Result<ShelfFile> {
    if let Some(path) = file_name {
        let path = shelf_file_path(path);
        if path.exists() {
            trace!("opening {} as a shelf file", path.display());
            open_file_for_read_and_write(&path)
        } else {
            info!("Creating the new shelf file `{}`", path.display());
            create_file_for_read_and_write(&path)
        }
    } else {
        trace!("Searching current directory for any .{SHELF_EXT} files");
        if let Some(file) = find_shelf_file_in_directory(".")? {
            Ok(file)
        } else {
            let path = PathBuf::from(DEFAULT_SHELF_NAME).with_extension(SHELF_EXT);
            info!(
                "No .{SHELF_EXT} file found in current directory - creating the new file `{}`",
                path.display()
            );
            create_file_for_read_and_write(&path)
        }
    }
}

/// Uses the path as given, only a path without an extension gets the shelf extension.
fn shelf_file_path(path: PathBuf) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        path.with_extension(SHELF_EXT)
    }
}

#[inline]
fn open_file_for_read_and_write(path: &Path) -> eyre::Result<ShelfFile> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map(ShelfFile::new)
        .wrap_err_with(|| {
            format!(
                "Failed to open the '{}' file for reading and writing.",
                path.display()
            )
        })
}

#[inline]
fn create_file_for_read_and_write(path: &Path) -> eyre::Result<ShelfFile> {
    OpenOptions::new()
        .create_new(true)
        .read(true)
        .write(true)
        .open(path)
        .map(ShelfFile::new)
        .wrap_err_with(|| format!("Failed to create the '{}' file.", path.display()))
}

/// Looks for exactly one shelf file in `dir`, returning [`None`] when there is none.
fn find_shelf_file_in_directory<P: AsRef<Path>>(dir: P) -> eyre::Result<Option<ShelfFile>> {
    let path = dir.as_ref();
    if !path.is_dir() {
        return Err(eyre!("Path entered is not a directory"));
    }

    let pattern = format!("{}/*.{SHELF_EXT}", path.to_string_lossy());

    let mut iter = glob(&pattern).wrap_err("Cannot build a search pattern for the directory")?;

    let path_buf = match iter.next() {
        Some(path_buf) => path_buf
            .wrap_err("Cannot determine a file path - Do you have the correct permissions?")?,
        None => return Ok(None),
    };

    if iter.next().is_some() {
        return Err(eyre!(
            "More than one .{SHELF_EXT} file found - use the --file option to select one"
        ));
    }

    open_file_for_read_and_write(path_buf.as_path()).map(Some)
}

fn read_file_to_string(file: &mut File) -> eyre::Result<String> {
    let mut content = String::new();
    file.read_to_string(&mut content)
        .wrap_err("Cannot read contents of file")
        .map(move |_| content)
}
