//! Public image directory backing product uploads.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use uuid::Uuid;

use crate::PRODUCT_IMAGES_DIR;
use crate::domain::types::{ImageKind, ImagePath, TypeConstraintError};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid image path: {0}")]
    InvalidPath(#[from] TypeConstraintError),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// An uploaded image that passed media type validation and awaits storage.
#[derive(Debug)]
pub struct ImageUpload {
    pub kind: ImageKind,
    pub file: NamedTempFile,
}

impl ImageUpload {
    pub fn new(kind: ImageKind, file: NamedTempFile) -> Self {
        Self { kind, file }
    }
}

/// Storage of image files addressed by paths relative to a public root.
pub trait ImageStorage {
    /// Store the upload under a freshly generated name and return its path.
    ///
    /// Never overwrites an existing file.
    fn store(&self, upload: ImageUpload) -> StorageResult<ImagePath>;
    /// Remove a stored file. Returns `false` when the file was already gone.
    fn remove(&self, path: &ImagePath) -> StorageResult<bool>;
}

/// [`ImageStorage`] writing into a directory on the local filesystem.
#[derive(Clone, Debug)]
pub struct LocalImageStorage {
    public_root: PathBuf,
}

impl LocalImageStorage {
    pub fn new(public_root: impl Into<PathBuf>) -> Self {
        Self {
            public_root: public_root.into(),
        }
    }

    /// Create the image directory if it does not exist yet.
    pub fn ensure_dirs(&self) -> StorageResult<()> {
        fs::create_dir_all(self.public_root.join(PRODUCT_IMAGES_DIR))?;
        Ok(())
    }

    pub fn public_root(&self) -> &Path {
        &self.public_root
    }

    /// Absolute location of a stored image.
    pub fn resolve(&self, path: &ImagePath) -> PathBuf {
        self.public_root.join(path.as_str())
    }
}

/// Generate a new relative path for an image of the given kind.
fn generate_image_path(kind: ImageKind) -> StorageResult<ImagePath> {
    let name = format!("{}.{}", Uuid::now_v7().simple(), kind.extension());
    Ok(ImagePath::new(format!("{PRODUCT_IMAGES_DIR}/{name}"))?)
}

impl ImageStorage for LocalImageStorage {
    fn store(&self, upload: ImageUpload) -> StorageResult<ImagePath> {
        self.ensure_dirs()?;

        let path = generate_image_path(upload.kind)?;
        let destination = self.resolve(&path);

        match upload.file.persist_noclobber(&destination) {
            Ok(_) => {}
            Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                return Err(StorageError::Io(err.error));
            }
            Err(err) => {
                // Rename fails across filesystems; fall back to copying.
                log::debug!(
                    "Moving upload to {} failed ({}), copying instead",
                    destination.display(),
                    err.error
                );
                let mut source = File::open(err.file.path())?;
                let mut target = OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .open(&destination)?;
                if let Err(copy_err) = io::copy(&mut source, &mut target) {
                    drop(target);
                    let _ = fs::remove_file(&destination);
                    return Err(copy_err.into());
                }
            }
        }

        Ok(path)
    }

    fn remove(&self, path: &ImagePath) -> StorageResult<bool> {
        match fs::remove_file(self.resolve(path)) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}
