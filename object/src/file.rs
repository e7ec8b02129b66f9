use dcm_core::dictionary::DataDictionary;
use dcm_dictionary_std::StandardDataDictionary;
use snafu::ResultExt;

use crate::mem::DicomObject;
use crate::read::DataSetReader;
use crate::{DefaultDicomObject, OpenFileSnafu, ReadError, ReadFileSnafu, ReadSourceSnafu};
use std::io::Read;
use std::path::Path;

/// Create a DICOM object by reading from a byte source.
///
/// The preamble is detected automatically.
pub fn from_reader<F>(file: F) -> Result<DefaultDicomObject, ReadError>
where
    F: Read,
{
    OpenFileOptions::new().from_reader(file)
}

/// Create a DICOM object by reading from a file.
///
/// Malformed content does not fail this function:
/// check [`read_success`](DicomObject::read_success)
/// and [`messages`](DicomObject::messages) of the returned object.
pub fn open_file<P>(path: P) -> Result<DefaultDicomObject, ReadError>
where
    P: AsRef<Path>,
{
    OpenFileOptions::new().open_file(path)
}

/// The policy for a tag seen twice at the same level of a data set.
#[derive(Debug, Default, Copy, Clone, Eq, Hash, PartialEq)]
pub enum DuplicatePolicy {
    /// Keep the first occurrence and skip over the following ones
    #[default]
    KeepFirst,
    /// Replace the earlier occurrence with the latest one
    Overwrite,
}

/// An enumerate of supported options for
/// whether to read the 128-byte DICOM file preamble.
#[derive(Debug, Default, Copy, Clone, Eq, Hash, PartialEq)]
pub enum ReadPreamble {
    /// Look for the `DICM` magic code after a 128-byte preamble,
    /// then at the very start,
    /// and otherwise read the source as a raw data set.
    #[default]
    Auto,
    /// Never read the preamble nor the magic code,
    /// thus assuming that the source is a raw data set.
    Never,
    /// Always read the preamble and the magic code,
    /// failing the read if they are missing.
    Always,
}

/// A builder type for opening a DICOM file with additional options.
///
/// # Example
///
/// Create a `OpenFileOptions`,
/// call adaptor methods in a chain,
/// and finish the operation with [`.open_file()`](OpenFileOptions::open_file).
///
/// ```no_run
/// # use dcm_object::{DuplicatePolicy, OpenFileOptions};
/// let obj = OpenFileOptions::new()
///     .duplicates(DuplicatePolicy::Overwrite)
///     .open_file("path/to/file.dcm")?;
/// # Result::<(), Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct OpenFileOptions<D = StandardDataDictionary> {
    pub(crate) dict: D,
    pub(crate) duplicates: DuplicatePolicy,
    pub(crate) transfer_syntax: Option<String>,
    pub(crate) read_preamble: ReadPreamble,
    pub(crate) heuristic_threshold: f32,
    pub(crate) heuristic_sample: usize,
}

impl Default for OpenFileOptions {
    fn default() -> Self {
        OpenFileOptions::new()
    }
}

impl OpenFileOptions {
    pub fn new() -> Self {
        OpenFileOptions {
            dict: StandardDataDictionary,
            duplicates: DuplicatePolicy::default(),
            transfer_syntax: None,
            read_preamble: ReadPreamble::default(),
            heuristic_threshold: 0.5,
            heuristic_sample: 16,
        }
    }
}

impl<D> OpenFileOptions<D> {
    /// Set the policy for duplicate tags.
    pub fn duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    /// Read the data set with this transfer syntax,
    /// regardless of what the file meta group declares.
    pub fn transfer_syntax(mut self, uid: impl Into<String>) -> Self {
        self.transfer_syntax = Some(uid.into());
        self
    }

    /// Set whether to read the 128-byte DICOM file preamble.
    pub fn read_preamble(mut self, option: ReadPreamble) -> Self {
        self.read_preamble = option;
        self
    }

    /// Set the minimum ratio of recognized VR codes
    /// for a data set without meta group to be read as explicit VR.
    pub fn heuristic_threshold(mut self, threshold: f32) -> Self {
        self.heuristic_threshold = threshold;
        self
    }

    /// Set how many elements are sampled
    /// to guess the encoding of a data set without meta group.
    pub fn heuristic_sample(mut self, n: usize) -> Self {
        self.heuristic_sample = n.max(1);
        self
    }

    /// Set the data element dictionary to use when reading the file.
    pub fn dictionary<Di>(self, dict: Di) -> OpenFileOptions<Di>
    where
        Di: DataDictionary,
        Di: Clone,
    {
        OpenFileOptions {
            dict,
            duplicates: self.duplicates,
            transfer_syntax: self.transfer_syntax,
            read_preamble: self.read_preamble,
            heuristic_threshold: self.heuristic_threshold,
            heuristic_sample: self.heuristic_sample,
        }
    }

    /// Open the file at the given path.
    ///
    /// Fails only if the file cannot be opened or read.
    pub fn open_file<P>(self, path: P) -> Result<DicomObject<D>, ReadError>
    where
        P: AsRef<Path>,
        D: DataDictionary,
        D: Clone,
    {
        let path = path.as_ref();
        let mut file = std::fs::File::open(path).context(OpenFileSnafu { filename: path })?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .context(ReadFileSnafu { filename: path })?;
        let mut obj = self.from_bytes(&bytes);
        obj.set_source(Some(path.to_path_buf()));
        Ok(obj)
    }

    /// Obtain a DICOM object by reading from a byte source to its end.
    pub fn from_reader<R>(self, mut from: R) -> Result<DicomObject<D>, ReadError>
    where
        R: Read,
        D: DataDictionary,
        D: Clone,
    {
        let mut bytes = Vec::new();
        from.read_to_end(&mut bytes).context(ReadSourceSnafu)?;
        Ok(self.from_bytes(&bytes))
    }

    /// Obtain a DICOM object by decoding a byte buffer.
    ///
    /// Reading never fails as a whole:
    /// the object holds everything decoded before the first error.
    pub fn from_bytes(self, bytes: &[u8]) -> DicomObject<D>
    where
        D: DataDictionary,
        D: Clone,
    {
        let mut obj = DicomObject::new_with_dict(self.dict.clone());
        DataSetReader::new(&self).read(bytes, &mut obj);
        obj
    }
}
