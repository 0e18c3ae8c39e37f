//! Concurrent chunked stream processing with in-order output.
//!
//! Three stages cooperate over bounded channels: a reader that slices the
//! source into indexed tasks, a worker pool running the chunk pipeline, and
//! a writer that reorders results and emits them strictly by index. Any
//! stage error cancels the run; the first error wins.

use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam::channel::{bounded, Receiver, Sender};

use crate::pipeline::ChunkPipeline;
use crate::reorder::ReorderBuffer;
use crate::types::{
    Direction, HexWardenError, Task, TaskResult, DEFAULT_CHUNK_SIZE, DEFAULT_QUEUE_SIZE, KEY_SIZE,
};

/// Largest accepted on-wire chunk length (2 GiB).
pub const MAX_FRAME_LEN: u32 = i32::MAX as u32;

/// Stream engine configuration. Zero values fall back to defaults when the
/// processor is built.
#[derive(Debug, Clone, Copy)]
pub struct StreamConfig {
    pub direction: Direction,
    pub concurrency: usize,
    pub queue_size: usize,
    pub chunk_size: usize,
}

impl StreamConfig {
    /// Defaults: CPU-count workers, queue of 100, 1 MiB chunks.
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            concurrency: 0,
            queue_size: 0,
            chunk_size: 0,
        }
    }

    fn normalized(mut self) -> Self {
        if self.concurrency == 0 {
            self.concurrency = num_cpus::get();
        }
        if self.queue_size == 0 {
            self.queue_size = DEFAULT_QUEUE_SIZE;
        }
        if self.chunk_size == 0 {
            self.chunk_size = DEFAULT_CHUNK_SIZE;
        }
        self
    }
}

/// Clonable handle that cancels the owning processor from another thread.
#[derive(Clone)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Drives one encryption or decryption stream.
///
/// All state is immutable after construction apart from the cancellation
/// flag, so the processor can be shared across threads (e.g. to call
/// [`StreamProcessor::cancel`] while [`StreamProcessor::process`] runs).
pub struct StreamProcessor {
    pipeline: ChunkPipeline,
    config: StreamConfig,
    cancel: Arc<AtomicBool>,
}

impl StreamProcessor {
    /// Requires a 32-byte key.
    pub fn new(key: &[u8], config: StreamConfig) -> Result<Self, HexWardenError> {
        if key.len() != KEY_SIZE {
            return Err(HexWardenError::InvalidKeySize);
        }
        Ok(Self {
            pipeline: ChunkPipeline::new(key)?,
            config: config.normalized(),
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Request cancellation. Every stage observes the flag at its next
    /// suspension point and unwinds without writing further output.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Handle for canceling this run from another thread (e.g. a deadline
    /// timer or a signal handler).
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(self.cancel.clone())
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Run the full pipeline from `input` to `output`. `progress` is called
    /// once per committed chunk with the plaintext byte count.
    pub fn process<R, W, F>(
        &self,
        mut input: R,
        mut output: W,
        progress: F,
    ) -> Result<(), HexWardenError>
    where
        R: Read + Send,
        W: Write,
        F: FnMut(u64),
    {
        let (task_tx, task_rx) = bounded::<Task>(self.config.queue_size);
        let (result_tx, result_rx) =
            bounded::<Result<TaskResult, HexWardenError>>(self.config.queue_size);
        // One slot per stage; only the first error is consumed.
        let (err_tx, err_rx) = bounded::<HexWardenError>(self.config.concurrency + 2);

        thread::scope(|scope| {
            let reader_err = err_tx.clone();
            scope.spawn(move || {
                let res = match self.config.direction {
                    Direction::Encrypt => self.read_plain(&mut input, &task_tx),
                    Direction::Decrypt => self.read_framed(&mut input, &task_tx),
                };
                if let Err(e) = res {
                    self.cancel.store(true, Ordering::SeqCst);
                    let _ = reader_err.try_send(e);
                }
            });

            for _ in 0..self.config.concurrency {
                let rx = task_rx.clone();
                let tx = result_tx.clone();
                scope.spawn(move || {
                    for task in rx.iter() {
                        if self.is_cancelled() {
                            break;
                        }
                        if tx.send(self.process_task(task)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(task_rx);
            drop(result_tx);

            if let Err(e) = self.write_results(&mut output, &result_rx, progress) {
                self.cancel.store(true, Ordering::SeqCst);
                let _ = err_tx.try_send(e);
            }
            // Disconnect the result channel so workers blocked on a full
            // queue unwind before the scope joins them.
            drop(result_rx);
        });

        if let Ok(err) = err_rx.try_recv() {
            return Err(err);
        }
        if self.is_cancelled() {
            return Err(HexWardenError::Canceled);
        }
        Ok(())
    }

    fn process_task(&self, task: Task) -> Result<TaskResult, HexWardenError> {
        let output = match self.config.direction {
            Direction::Encrypt => self.pipeline.encrypt_chunk(&task.data),
            Direction::Decrypt => self.pipeline.decrypt_chunk(&task.data),
        }?;

        let size = match self.config.direction {
            Direction::Encrypt => task.data.len(),
            Direction::Decrypt => output.len(),
        };

        Ok(TaskResult {
            index: task.index,
            data: output,
            size,
        })
    }

    /// Encryption-side reader: fixed-size raw chunks with monotonic indices.
    fn read_plain<R: Read>(
        &self,
        reader: &mut R,
        tasks: &Sender<Task>,
    ) -> Result<(), HexWardenError> {
        let mut index = 0u64;
        loop {
            if self.is_cancelled() {
                return Ok(());
            }

            let mut buf = vec![0u8; self.config.chunk_size];
            let n = read_until_full(reader, &mut buf)?;
            if n == 0 {
                return Ok(());
            }
            buf.truncate(n);

            if tasks.send(Task { data: buf, index }).is_err() {
                // Receivers are gone; the supervisor handles shutdown.
                return Ok(());
            }
            index += 1;
        }
    }

    /// Decryption-side reader: length-prefixed chunk records. EOF at a
    /// record boundary ends the stream cleanly.
    fn read_framed<R: Read>(
        &self,
        reader: &mut R,
        tasks: &Sender<Task>,
    ) -> Result<(), HexWardenError> {
        let mut index = 0u64;
        loop {
            if self.is_cancelled() {
                return Ok(());
            }

            let len = match read_frame_len(reader)? {
                Some(len) => len,
                None => return Ok(()),
            };
            if len == 0 {
                continue;
            }
            if len > MAX_FRAME_LEN {
                return Err(HexWardenError::ChunkTooLarge);
            }

            let mut data = vec![0u8; len as usize];
            reader.read_exact(&mut data).map_err(|e| match e.kind() {
                io::ErrorKind::UnexpectedEof => HexWardenError::IncompleteRead,
                _ => HexWardenError::Io(e),
            })?;

            if tasks.send(Task { data, index }).is_err() {
                return Ok(());
            }
            index += 1;
        }
    }

    fn write_results<W: Write, F: FnMut(u64)>(
        &self,
        writer: &mut W,
        results: &Receiver<Result<TaskResult, HexWardenError>>,
        mut progress: F,
    ) -> Result<(), HexWardenError> {
        let mut buffer = ReorderBuffer::new();

        loop {
            if self.is_cancelled() {
                return Ok(());
            }

            let message = match results.recv() {
                Ok(message) => message,
                Err(_) => break,
            };
            let result = message?;

            for ready in buffer.push(result) {
                self.write_one(writer, ready, &mut progress)?;
            }
        }

        for remaining in buffer.flush() {
            self.write_one(writer, remaining, &mut progress)?;
        }
        Ok(())
    }

    fn write_one<W: Write, F: FnMut(u64)>(
        &self,
        writer: &mut W,
        result: TaskResult,
        progress: &mut F,
    ) -> Result<(), HexWardenError> {
        if self.config.direction == Direction::Encrypt {
            let len =
                u32::try_from(result.data.len()).map_err(|_| HexWardenError::ChunkTooLarge)?;
            writer.write_all(&len.to_be_bytes())?;
        }
        writer.write_all(&result.data)?;
        progress(result.size as u64);
        Ok(())
    }
}

/// Fill `buf` from `reader`, stopping early only at EOF. Returns the number
/// of bytes read so chunk boundaries stay deterministic for a given input.
fn read_until_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, HexWardenError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

/// Read a 4-byte big-endian length prefix. `None` means clean EOF before
/// the first prefix byte; EOF inside the prefix is an incomplete read.
fn read_frame_len<R: Read>(reader: &mut R) -> Result<Option<u32>, HexWardenError> {
    let mut buf = [0u8; 4];
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                if filled == 0 {
                    return Ok(None);
                }
                return Err(HexWardenError::IncompleteRead);
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(Some(u32::from_be_bytes(buf)))
}
