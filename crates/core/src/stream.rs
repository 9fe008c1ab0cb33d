//! Single-writer, multi-reader incremental value cells.
//!
//! A [`StreamableValue`] is written zero or more times with partial values and
//! then finalized exactly once with [`StreamableValue::done`]. Any number of
//! [`StreamReader`]s observe it concurrently. Built on `tokio::sync::watch`, so
//! a slow reader may skip intermediate partials but always sees the terminal
//! value, after which the cell is frozen and readable synchronously.

use tokio::sync::watch;

use crate::error::StreamError;

/// The observable state of a cell at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    /// Latest partial or final value
    pub value: Option<T>,
    /// Whether the terminal write has happened
    pub done: bool,
}

/// The writing half. Not `Clone`: there is exactly one producer.
#[derive(Debug)]
pub struct StreamableValue<T> {
    tx: watch::Sender<Snapshot<T>>,
}

impl<T: Clone> StreamableValue<T> {
    /// A pending cell with no value yet.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Snapshot {
            value: None,
            done: false,
        });
        Self { tx }
    }

    /// A pending cell that starts out holding `initial`.
    pub fn with_initial(initial: T) -> Self {
        let (tx, _) = watch::channel(Snapshot {
            value: Some(initial),
            done: false,
        });
        Self { tx }
    }

    /// A reader over an already-finalized value, used to replay history.
    pub fn resolved(value: T) -> StreamReader<T> {
        let (_tx, rx) = watch::channel(Snapshot {
            value: Some(value),
            done: true,
        });
        StreamReader {
            rx,
            finished: false,
        }
    }

    /// Publish a partial value.
    pub fn write(&self, partial: T) -> Result<(), StreamError> {
        self.modify(|value| *value = Some(partial), false)
    }

    /// Publish a partial value derived from the current one.
    pub fn update_with(&self, f: impl FnOnce(&mut Option<T>)) -> Result<(), StreamError> {
        self.modify(f, false)
    }

    /// Publish the terminal value and freeze the cell.
    pub fn done(&self, value: T) -> Result<(), StreamError> {
        self.modify(|current| *current = Some(value), true)
    }

    /// Freeze the cell keeping whatever value it currently holds.
    pub fn close(&self) -> Result<(), StreamError> {
        self.modify(|_| {}, true)
    }

    pub fn is_done(&self) -> bool {
        self.tx.borrow().done
    }

    pub fn current(&self) -> Option<T> {
        self.tx.borrow().value.clone()
    }

    /// A new reader starting at the current state.
    pub fn reader(&self) -> StreamReader<T> {
        StreamReader {
            rx: self.tx.subscribe(),
            finished: false,
        }
    }

    fn modify(&self, f: impl FnOnce(&mut Option<T>), finish: bool) -> Result<(), StreamError> {
        let mut rejected = false;
        self.tx.send_if_modified(|snapshot| {
            if snapshot.done {
                rejected = true;
                return false;
            }
            f(&mut snapshot.value);
            snapshot.done = finish;
            true
        });
        if rejected {
            Err(StreamError::AlreadyDone)
        } else {
            Ok(())
        }
    }
}

impl<T: Clone> Default for StreamableValue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The reading half. Cheap to clone; each clone tracks its own progress.
#[derive(Debug, Clone)]
pub struct StreamReader<T> {
    rx: watch::Receiver<Snapshot<T>>,
    finished: bool,
}

impl<T: Clone> StreamReader<T> {
    /// The current value, partial or final.
    pub fn current(&self) -> Option<T> {
        self.rx.borrow().value.clone()
    }

    pub fn is_done(&self) -> bool {
        self.rx.borrow().done
    }

    pub fn snapshot(&self) -> Snapshot<T> {
        self.rx.borrow().clone()
    }

    /// Wait for the next notification.
    ///
    /// Yields partial snapshots, then exactly one with `done == true`, then
    /// `None`, whether the reader was opened before or after the terminal
    /// write. Also returns `None` if the writer goes away without finalizing.
    pub async fn next(&mut self) -> Option<Snapshot<T>> {
        if self.finished {
            return None;
        }
        // A reader opened on a frozen cell still gets the terminal snapshot once.
        if self.rx.borrow().done {
            let snapshot = self.rx.borrow_and_update().clone();
            self.finished = true;
            return Some(snapshot);
        }
        if self.rx.changed().await.is_err() {
            self.finished = true;
            return None;
        }
        let snapshot = self.rx.borrow_and_update().clone();
        self.finished = snapshot.done;
        Some(snapshot)
    }

    /// Wait for the terminal value.
    ///
    /// Returns immediately for resolved cells. `None` if the writer was
    /// dropped before finalizing, or finalized without a value.
    pub async fn settled(&mut self) -> Option<T> {
        match self.rx.wait_for(|snapshot| snapshot.done).await {
            Ok(snapshot) => snapshot.value.clone(),
            Err(_) => None,
        }
    }
}

impl<T: PartialEq> PartialEq for StreamReader<T> {
    fn eq(&self, other: &Self) -> bool {
        *self.rx.borrow() == *other.rx.borrow()
    }
}
