//! Machine construction and teardown.

use std::fs;
use std::io;
use std::path::Path;

use crate::api::{LoadError, MachineConfig};
use crate::memory::{allocate_copy, allocate_zeroed, MemoryRegion};
use crate::Machine;

/// Reads a program image in its entirety.
pub trait ByteSource {
    /// Returns every byte stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the source cannot be read.
    fn read_all(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// [`ByteSource`] backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSource;

impl ByteSource for FileSource {
    fn read_all(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }
}

impl Machine {
    /// Creates a machine with zeroed instruction and data memory.
    ///
    /// Registers, the instruction pointer, the cycle count, and the status
    /// all start at zero, with continuous mode off.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::AllocationFailed`] when either region cannot be
    /// reserved. A region allocated before the failure is released.
    pub fn initialize(instruction_size: usize, data_size: usize) -> Result<Self, LoadError> {
        let instruction_memory = allocate_zeroed(instruction_size, MemoryRegion::Instruction)?;
        let data_memory = allocate_zeroed(data_size, MemoryRegion::Data)?;
        Ok(Self::from_parts(instruction_memory, data_memory))
    }

    /// Creates a machine whose instruction memory is a copy of `program`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::AllocationFailed`] when either region cannot be
    /// reserved.
    pub fn load(program: &[u8], data_size: usize) -> Result<Self, LoadError> {
        let instruction_memory = allocate_copy(program, MemoryRegion::Instruction)?;
        let data_memory = allocate_zeroed(data_size, MemoryRegion::Data)?;
        Ok(Self::from_parts(instruction_memory, data_memory))
    }

    /// [`Machine::load`] with data size and continuous mode from `config`.
    ///
    /// # Errors
    ///
    /// Same as [`Machine::load`].
    pub fn load_with_config(program: &[u8], config: &MachineConfig) -> Result<Self, LoadError> {
        let mut machine = Self::load(program, config.data_size)?;
        machine.set_continuous_mode(config.continuous_mode);
        Ok(machine)
    }

    /// Reads the program at `path` from the filesystem and loads it.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::SourceUnavailable`] when the file cannot be read,
    /// [`LoadError::EmptySource`] when it holds no bytes, and otherwise the
    /// errors of [`Machine::load`].
    pub fn load_from_source(path: impl AsRef<Path>, data_size: usize) -> Result<Self, LoadError> {
        Self::load_from(&FileSource, path, data_size)
    }

    /// [`Machine::load_from_source`] with data size and continuous mode from
    /// `config`.
    ///
    /// # Errors
    ///
    /// Same as [`Machine::load_from_source`].
    pub fn load_from_source_with_config(
        path: impl AsRef<Path>,
        config: &MachineConfig,
    ) -> Result<Self, LoadError> {
        let mut machine = Self::load_from_source(path, config.data_size)?;
        machine.set_continuous_mode(config.continuous_mode);
        Ok(machine)
    }

    /// Reads the program at `path` through `source` and loads it.
    ///
    /// # Errors
    ///
    /// Same as [`Machine::load_from_source`].
    pub fn load_from<S>(
        source: &S,
        path: impl AsRef<Path>,
        data_size: usize,
    ) -> Result<Self, LoadError>
    where
        S: ByteSource + ?Sized,
    {
        let path = path.as_ref();
        let program = source
            .read_all(path)
            .map_err(|source| LoadError::SourceUnavailable {
                path: path.to_path_buf(),
                source,
            })?;

        if program.is_empty() {
            return Err(LoadError::EmptySource {
                path: path.to_path_buf(),
            });
        }

        Self::load(&program, data_size)
    }

    /// Releases both memory regions.
    ///
    /// Consumes the machine, so it cannot be stepped afterwards.
    pub fn destroy(self) {
        drop(self);
    }
}
