use ndarray::Array2;
use npyz::WriterBuilder;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::errors::{OutbreakError, Result};

/// Trait extension to store count matrices in the numpy format
pub trait MatrixIO {
    fn write_npy(&self, writer: &mut impl Write) -> Result<()>;

    fn write_npy_to_file(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(fs::File::create(path)?);
        self.write_npy(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

impl MatrixIO for Array2<u64> {
    fn write_npy(&self, writer: &mut impl Write) -> Result<()> {
        let shape = &[self.nrows() as u64, self.ncols() as u64];
        let mut npy_writer = npyz::WriteOptions::new()
            .default_dtype()
            .shape(shape)
            .writer(writer)
            .begin_nd()
            .map_err(|e| OutbreakError::Write(format!("{}", e)))?;
        npy_writer
            .extend(self.iter().copied())
            .map_err(|e| OutbreakError::Write(format!("{}", e)))?;
        npy_writer
            .finish()
            .map_err(|e| OutbreakError::Write(format!("{}", e)))?;
        Ok(())
    }
}
