// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A small mutex-guarded LIFO work queue, shared by the image/exposure/
//! event drivers: each worker pops the next unit of work, accumulates into
//! a thread-local result, and folds that into the shared total once the
//! queue runs dry. Any worker panic flips a fail-fast flag so the other
//! threads stop picking up new work instead of grinding on uselessly.

use std::sync::Mutex;

use crossbeam_utils::atomic::AtomicCell;
use indicatif::{ProgressBar, ProgressStyle};
use scopeguard::defer_on_unwind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("a worker thread panicked")]
    Panicked,
    #[error("{0}")]
    Failed(String),
}

/// Run `items` to completion across `num_threads` workers. `new_acc`
/// creates one accumulator per worker; `process` folds one item into a
/// worker's accumulator; `merge` folds a finished worker's accumulator
/// into the shared total. Items are handed out LIFO, matching the
/// reference drivers' `pop_back` queue.
pub fn run_pipeline<Item, Acc, NewAcc, Process, Merge>(
    mut items: Vec<Item>,
    num_threads: usize,
    new_acc: NewAcc,
    process: Process,
    merge: Merge,
) -> Result<Acc, WorkerError>
where
    Item: Send,
    Acc: Send,
    NewAcc: Fn() -> Acc + Sync,
    Process: Fn(Item, &mut Acc) -> Result<(), String> + Sync,
    Merge: Fn(&mut Acc, Acc) + Sync,
{
    let progress = ProgressBar::new(items.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    items.reverse(); // so pop() below consumes them front-to-back
    let queue = Mutex::new(items);
    let failed = AtomicCell::new(false);
    let first_error: Mutex<Option<String>> = Mutex::new(None);
    let total = Mutex::new(new_acc());

    let num_threads = num_threads.max(1);

    std::thread::scope(|scope| {
        let mut handles = Vec::with_capacity(num_threads);
        for _ in 0..num_threads {
            let queue = &queue;
            let failed = &failed;
            let first_error = &first_error;
            let total = &total;
            let new_acc = &new_acc;
            let process = &process;
            let merge = &merge;
            let progress = &progress;

            handles.push(scope.spawn(move || {
                defer_on_unwind! { failed.store(true); }

                let mut local = new_acc();
                loop {
                    if failed.load() {
                        return;
                    }
                    let item = {
                        let mut q = queue.lock().unwrap();
                        q.pop()
                    };
                    let Some(item) = item else { break };
                    progress.inc(1);

                    if let Err(e) = process(item, &mut local) {
                        failed.store(true);
                        let mut fe = first_error.lock().unwrap();
                        if fe.is_none() {
                            *fe = Some(e);
                        }
                        return;
                    }
                }
                let mut t = total.lock().unwrap();
                merge(&mut t, local);
            }));
        }

        for h in handles {
            if h.join().is_err() {
                failed.store(true);
            }
        }
    });

    if failed.load() {
        progress.abandon();
    } else {
        progress.finish_and_clear();
    }

    if failed.load() {
        let msg = first_error.lock().unwrap().take();
        return Err(match msg {
            Some(m) => WorkerError::Failed(m),
            None => WorkerError::Panicked,
        });
    }

    Ok(total.into_inner().unwrap())
}
