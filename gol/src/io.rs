//! Image collaborators that load the initial generation and store snapshots.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{ExtendedColorType, ImageEncoder};

use crate::error::IoError;
use crate::grid::{Grid, GridView};
use crate::params::Params;

/// Source of the initial grid and sink for output snapshots.
pub trait GridIo {
    /// Load the initial grid with the dimensions in `params`.
    fn read_input(&mut self, params: &Params) -> Result<Grid, IoError>;

    /// Hand a generation over for output under `name`. Implementations may
    /// finish the write in the background.
    fn write_output(&mut self, view: &GridView, name: &str);

    /// Block until every output handed over so far has been written.
    fn check_idle(&mut self);
}

enum Job {
    Write { view: GridView, path: PathBuf },
    Idle(Sender<()>),
}

/// Reads `<input_dir>/<height>x<width>.pgm` and writes `<output_dir>/<name>.pgm` from a
/// background writer thread.
pub struct PgmIo {
    input_dir: PathBuf,
    output_dir: PathBuf,
    jobs: Option<Sender<Job>>,
    writer: Option<JoinHandle<()>>,
}

impl PgmIo {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Result<Self, IoError> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;

        let (jobs, queue) = crossbeam_channel::unbounded::<Job>();
        let writer = thread::Builder::new().name("pgm-writer".into()).spawn(move || {
            for job in queue {
                match job {
                    Job::Write { view, path } => match write_pgm(&path, view.grid()) {
                        Ok(()) => log::debug!("wrote {}", path.display()),
                        Err(err) => log::error!("{err}"),
                    },
                    Job::Idle(ack) => {
                        let _ = ack.send(());
                    }
                }
            }
        })?;

        Ok(PgmIo {
            input_dir: input_dir.into(),
            output_dir,
            jobs: Some(jobs),
            writer: Some(writer),
        })
    }

    pub fn output_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{name}.pgm"))
    }

    fn submit(&self, job: Job) -> bool {
        self.jobs.as_ref().is_some_and(|jobs| jobs.send(job).is_ok())
    }
}

impl GridIo for PgmIo {
    fn read_input(&mut self, params: &Params) -> Result<Grid, IoError> {
        let path = self.input_dir.join(format!("{}.pgm", params.image_name()));
        read_pgm(&path, params.image_width, params.image_height)
    }

    fn write_output(&mut self, view: &GridView, name: &str) {
        let path = self.output_path(name);
        if !self.submit(Job::Write { view: view.clone(), path }) {
            log::error!("pgm writer has stopped, dropping output {name}");
        }
    }

    fn check_idle(&mut self) {
        let (ack_tx, ack_rx) = crossbeam_channel::bounded(1);
        if self.submit(Job::Idle(ack_tx)) {
            let _ = ack_rx.recv();
        }
    }
}

impl Drop for PgmIo {
    fn drop(&mut self) {
        self.jobs.take();
        if let Some(writer) = self.writer.take() {
            if writer.join().is_err() {
                log::error!("pgm writer panicked");
            }
        }
    }
}

/// Decode a PGM file into a grid, checking it has the expected dimensions.
pub fn read_pgm(path: &Path, width: usize, height: usize) -> Result<Grid, IoError> {
    let image = image::open(path)
        .map_err(|source| IoError::Decode { path: path.to_path_buf(), source })?
        .into_luma8();
    let (actual_width, actual_height) = (image.width() as usize, image.height() as usize);
    let mismatch = || IoError::Dimensions {
        name: path.display().to_string(),
        width,
        height,
        actual_width,
        actual_height,
    };

    if (actual_width, actual_height) != (width, height) {
        return Err(mismatch());
    }
    Grid::from_bytes(width, height, image.as_raw()).ok_or_else(mismatch)
}

/// Encode a grid as a binary (P5) PGM file.
pub fn write_pgm(path: &Path, grid: &Grid) -> Result<(), IoError> {
    let file = BufWriter::new(File::create(path)?);
    PnmEncoder::new(file)
        .with_subtype(PnmSubtype::Graymap(SampleEncoding::Binary))
        .write_image(&grid.to_bytes(), grid.width() as u32, grid.height() as u32, ExtendedColorType::L8)
        .map_err(|source| IoError::Encode { path: path.to_path_buf(), source })
}

/// Starts from a random grid and forwards every output to `output`.
#[derive(Debug, Clone, Default)]
pub struct RandomIo<O> {
    output: O,
}

impl<O: GridIo> RandomIo<O> {
    pub fn new(output: O) -> Self {
        RandomIo { output }
    }

    pub fn into_inner(self) -> O {
        self.output
    }
}

impl<O: GridIo> GridIo for RandomIo<O> {
    fn read_input(&mut self, params: &Params) -> Result<Grid, IoError> {
        Ok(Grid::random(params.image_width, params.image_height))
    }

    fn write_output(&mut self, view: &GridView, name: &str) {
        self.output.write_output(view, name);
    }

    fn check_idle(&mut self) {
        self.output.check_idle();
    }
}

/// In-memory collaborator. Clones share the recorded outputs.
#[derive(Debug, Clone, Default)]
pub struct MemoryIo {
    input: Grid,
    outputs: Arc<Mutex<Vec<(String, Grid)>>>,
}

impl MemoryIo {
    pub fn new(input: Grid) -> Self {
        MemoryIo { input, outputs: Arc::default() }
    }

    /// Every output written so far, oldest first.
    pub fn outputs(&self) -> Vec<(String, Grid)> {
        self.outputs.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl GridIo for MemoryIo {
    fn read_input(&mut self, params: &Params) -> Result<Grid, IoError> {
        if (self.input.width(), self.input.height()) != (params.image_width, params.image_height) {
            return Err(IoError::Dimensions {
                name: params.image_name(),
                width: params.image_width,
                height: params.image_height,
                actual_width: self.input.width(),
                actual_height: self.input.height(),
            });
        }
        Ok(self.input.clone())
    }

    fn write_output(&mut self, view: &GridView, name: &str) {
        self.outputs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((name.to_string(), view.grid().clone()));
    }

    fn check_idle(&mut self) {}
}
