//! Purpose: Resolve publication output logical ids into repository folder paths.
//! Exports: `FolderLocationResolver`, `BatchPolicy`.
//! Role: The only decision logic; lookup transport and labels come from the `Session`.
//! Invariants: Exactly one lookup per valid logical id; none for an invalid one.
//! Invariants: Batch input is validated up front; an empty id issues zero lookups.
//! Invariants: Output order equals input order, with or without worker threads.
//! Invariants: `Stop` returns no paths once any item fails (fail-fast).
//! Invariants: A panicking lookup becomes that item's `Internal` error on every path.
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;

use tracing::debug;

use super::error::{Error, ErrorKind};
use super::handle::ObjectHandle;
use super::location::{LogicalId, assemble_path};
use super::lookup::FolderLookup;
use super::session::Session;

/// What a batch does when one of its items fails.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum BatchPolicy {
    /// Abort the batch on the first failure and return only that error.
    #[default]
    Stop,
    /// Resolve every item and report one result per input.
    Continue,
}

type Slot = Option<Result<String, Error>>;

/// One validated batch entry, keyed by its position in the caller's input.
struct Item {
    position: usize,
    logical_id: LogicalId,
    detail: Option<String>,
}

pub struct FolderLocationResolver<'a, L> {
    session: &'a Session<L>,
    parallelism: usize,
}

impl<'a, L: FolderLookup> FolderLocationResolver<'a, L> {
    pub fn new(session: &'a Session<L>) -> Self {
        Self {
            session,
            parallelism: 1,
        }
    }

    /// Number of lookups allowed in flight at once; values below 1 mean 1.
    pub fn with_parallelism(mut self, workers: usize) -> Self {
        self.parallelism = workers.max(1);
        self
    }

    pub fn resolve_one(&self, logical_id: &str) -> Result<String, Error> {
        let logical_id = LogicalId::new(logical_id)?;
        debug!(logical_id = %logical_id, "retrieving publication output folder location");
        let path = self.locate_guarded(&logical_id)?;
        debug!("returned folder location count[1]");
        Ok(path)
    }

    pub fn resolve_many<I, S>(&self, logical_ids: I) -> Result<Vec<String>, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stop_on_failure(parse_items(
            logical_ids.into_iter().map(|raw| (raw, None)),
        ))
    }

    /// Collect-all variant of `resolve_many`: one result per input, in input order.
    pub fn resolve_each<I, S>(&self, logical_ids: I) -> Vec<Result<String, Error>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.collect_all(parse_items(
            logical_ids.into_iter().map(|raw| (raw, None)),
        ))
    }

    pub fn resolve_batch<I, S>(
        &self,
        logical_ids: I,
        policy: BatchPolicy,
    ) -> Result<Vec<Result<String, Error>>, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match policy {
            BatchPolicy::Stop => Ok(self
                .resolve_many(logical_ids)?
                .into_iter()
                .map(Ok)
                .collect()),
            BatchPolicy::Continue => Ok(self.resolve_each(logical_ids)),
        }
    }

    /// Fail-fast resolution of handles; each lookup is logged with the handle's description.
    pub fn resolve_objects<H: ObjectHandle>(&self, handles: &[H]) -> Result<Vec<String>, Error> {
        self.stop_on_failure(parse_items(
            handles
                .iter()
                .map(|handle| (handle.logical_id(), Some(handle.describe()))),
        ))
    }

    /// Collect-all variant of `resolve_objects`.
    pub fn resolve_objects_each<H: ObjectHandle>(
        &self,
        handles: &[H],
    ) -> Vec<Result<String, Error>> {
        self.collect_all(parse_items(
            handles
                .iter()
                .map(|handle| (handle.logical_id(), Some(handle.describe()))),
        ))
    }

    fn stop_on_failure(&self, parsed: Vec<Result<Item, Error>>) -> Result<Vec<String>, Error> {
        let total = parsed.len();
        let items = parsed.into_iter().collect::<Result<Vec<_>, _>>()?;

        let mut paths = Vec::with_capacity(total);
        for slot in self.run(&items, total, true) {
            match slot {
                Some(Ok(path)) => paths.push(path),
                Some(Err(err)) => return Err(err),
                None => break,
            }
        }
        debug_assert_eq!(paths.len(), total);
        Ok(paths)
    }

    fn collect_all(&self, parsed: Vec<Result<Item, Error>>) -> Vec<Result<String, Error>> {
        let total = parsed.len();
        let mut results: Vec<Slot> = Vec::with_capacity(total);
        let mut items = Vec::with_capacity(total);
        for parsed in parsed {
            match parsed {
                Ok(item) => {
                    items.push(item);
                    results.push(None);
                }
                Err(err) => results.push(Some(Err(err))),
            }
        }
        if items.len() != total {
            debug!(
                skipped = total - items.len(),
                "skipping lookups for invalid logical ids"
            );
        }

        let slots = self.run(&items, total, false);
        for (item, slot) in items.iter().zip(slots) {
            results[item.position] = slot;
        }
        results
            .into_iter()
            .enumerate()
            .map(|(position, slot)| {
                slot.unwrap_or_else(|| {
                    Err(Error::new(ErrorKind::Internal)
                        .with_message("lookup result missing")
                        .with_index(position))
                })
            })
            .collect()
    }

    fn run(&self, items: &[Item], total: usize, fail_fast: bool) -> Vec<Slot> {
        let workers = self.parallelism.min(items.len()).max(1);

        if workers == 1 {
            let mut slots: Vec<Slot> = Vec::with_capacity(items.len());
            for item in items {
                let result = self.resolve_item(item, total);
                let failed = result.is_err();
                slots.push(Some(result));
                if failed && fail_fast {
                    break;
                }
            }
            slots.resize_with(items.len(), || None);
            return slots;
        }

        let next = AtomicUsize::new(0);
        let stop = AtomicBool::new(false);
        let slots = (0..items.len())
            .map(|_| Mutex::new(None))
            .collect::<Vec<Mutex<Slot>>>();

        thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| {
                    loop {
                        if fail_fast && stop.load(Ordering::Acquire) {
                            break;
                        }
                        let index = next.fetch_add(1, Ordering::AcqRel);
                        if index >= items.len() {
                            break;
                        }
                        let result = self.resolve_item(&items[index], total);
                        if fail_fast && result.is_err() {
                            stop.store(true, Ordering::Release);
                        }
                        *slots[index].lock().unwrap_or_else(PoisonError::into_inner) = Some(result);
                    }
                });
            }
        });

        slots
            .into_iter()
            .map(|slot| slot.into_inner().unwrap_or_else(PoisonError::into_inner))
            .collect()
    }

    fn resolve_item(&self, item: &Item, total: usize) -> Result<String, Error> {
        match &item.detail {
            Some(detail) => debug!("{} {}/{}", detail, item.position + 1, total),
            None => debug!(
                logical_id = %item.logical_id,
                "retrieving publication output folder location {}/{}",
                item.position + 1,
                total
            ),
        }
        self.locate_guarded(&item.logical_id)
            .map_err(|err| err.with_index(item.position))
    }

    fn locate_guarded(&self, logical_id: &LogicalId) -> Result<String, Error> {
        panic::catch_unwind(AssertUnwindSafe(|| self.locate(logical_id))).unwrap_or_else(
            |payload| {
                Err(Error::new(ErrorKind::Internal)
                    .with_message(format!("lookup panicked: {}", panic_message(&*payload)))
                    .with_logical_id(logical_id.as_str()))
            },
        )
    }

    fn locate(&self, logical_id: &LogicalId) -> Result<String, Error> {
        let location = self
            .session
            .lookup()
            .folder_location(logical_id)
            .map_err(|err| err.with_logical_id(logical_id.as_str()))?;
        let label = self
            .session
            .label_for(&location.base_folder)
            .map_err(|err| err.with_logical_id(logical_id.as_str()))?;
        Ok(assemble_path(
            self.session.separator(),
            label,
            &location.folder_path,
        ))
    }
}

fn parse_items<I, S>(entries: I) -> Vec<Result<Item, Error>>
where
    I: IntoIterator<Item = (S, Option<String>)>,
    S: AsRef<str>,
{
    entries
        .into_iter()
        .enumerate()
        .map(|(position, (raw, detail))| {
            LogicalId::new(raw.as_ref())
                .map(|logical_id| Item {
                    position,
                    logical_id,
                    detail,
                })
                .map_err(|err| err.with_index(position))
        })
        .collect()
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
