use std::fs::{File, OpenOptions};
use std::io::Write;
use std::io;
use std::marker::PhantomData;
use std::path::Path;

use data_model::CsvRecord;

/// An append-only csv log of samples of one kind. Each task owns its log
/// exclusively, so no locking is needed around appends.
pub(crate) struct SampleLog<T: CsvRecord> {
    file: File,
    _kind: PhantomData<T>,
}

impl<T: CsvRecord> SampleLog<T> {
    /// Open the log for appending, writing the header row only if the file is
    /// empty. Reopening an existing log across restarts never repeats the
    /// header.
    pub fn open(path: &Path) -> Result<Self, io::Error> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;

        if file.metadata()?.len() == 0 {
            file.write_all(format!("{}\n", T::header()).as_bytes())?;
            file.flush()?;
        }

        Ok(SampleLog {
            file,
            _kind: PhantomData,
        })
    }

    /// Append one sample as a whole row and flush before returning, so a
    /// reader (or a post-crash inspection) sees complete rows only
    pub fn append(&mut self, sample: &T) -> Result<(), io::Error> {
        self.file.write_all(format!("{}\n", sample.row()).as_bytes())?;
        self.file.flush()
    }
}
