//! Background processing of heavy document operations.
//!
//! A [`Worker`] owns one long-lived thread that formats, searches, and
//! counts documents off the caller's thread. Requests carry raw JSON text
//! and are parsed inside the worker, so nothing shared crosses the channel;
//! results come back as plain data. The thread gets a 16MB stack so the
//! recursive parts of parsing have headroom before on-demand stack growth
//! has to kick in.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::search::{find_matches, SearchMatch, SearchOptions};
use crate::serialize::{safe_serialize, Indent};
use crate::stats::count_nodes;
use crate::value::parse_text;

const WORKER_STACK_SIZE: usize = 16 * 1024 * 1024;

/// A unit of work for the worker thread.
#[derive(Debug)]
pub enum Request {
    /// Parse `text` and serialize it with the given indentation.
    Format {
        text: String,
        indent: Option<Indent>,
    },
    /// Parse `text` and find every occurrence of `term`.
    Search {
        text: String,
        term: String,
        options: SearchOptions,
    },
    /// Parse `text` and count its nodes.
    CountNodes { text: String },
}

/// The outcome of one [`Request`], in submission order.
#[derive(Debug)]
pub enum Response {
    Formatted { text: String },
    Matches { matches: Vec<SearchMatch>, count: usize },
    NodeCount { count: u64 },
    /// Parsing or serialization failed; `message` is the error text.
    Error { message: String },
}

/// Handle to the worker thread. Dropping it shuts the thread down and
/// joins it.
pub struct Worker {
    requests: Option<Sender<Request>>,
    responses: Receiver<Response>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawn the worker thread.
    pub fn spawn() -> std::io::Result<Worker> {
        let (request_tx, request_rx) = mpsc::channel::<Request>();
        let (response_tx, response_rx) = mpsc::channel::<Response>();
        let handle = thread::Builder::new()
            .name("deepjson-worker".to_string())
            .stack_size(WORKER_STACK_SIZE)
            .spawn(move || run(request_rx, response_tx))?;
        Ok(Worker {
            requests: Some(request_tx),
            responses: response_rx,
            handle: Some(handle),
        })
    }

    /// Queue a request. Returns `false` if the worker thread is gone.
    pub fn submit(&self, request: Request) -> bool {
        match &self.requests {
            Some(tx) => tx.send(request).is_ok(),
            None => false,
        }
    }

    /// Block for the next response, `None` once the worker has stopped.
    pub fn recv(&self) -> Option<Response> {
        self.responses.recv().ok()
    }

    /// Submit one request and wait for its response.
    pub fn process(&self, request: Request) -> Option<Response> {
        if !self.submit(request) {
            return None;
        }
        self.recv()
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop.
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run(requests: Receiver<Request>, responses: Sender<Response>) {
    for request in requests {
        if responses.send(handle_request(request)).is_err() {
            break;
        }
    }
}

fn handle_request(request: Request) -> Response {
    match request {
        Request::Format { text, indent } => {
            // Native-first with the iterative engine as fallback, so deep
            // documents come back newline-formatted rather than failing or
            // degrading to compact.
            match parse_text(&text).and_then(|value| safe_serialize(&value, indent)) {
                Ok(text) => Response::Formatted { text },
                Err(error) => Response::Error {
                    message: error.to_string(),
                },
            }
        }
        Request::Search {
            text,
            term,
            options,
        } => match parse_text(&text) {
            Ok(value) => {
                let matches = find_matches(&value, &term, &options);
                Response::Matches {
                    count: matches.len(),
                    matches,
                }
            }
            Err(error) => Response::Error {
                message: error.to_string(),
            },
        },
        Request::CountNodes { text } => match parse_text(&text) {
            Ok(value) => Response::NodeCount {
                count: count_nodes(&value),
            },
            Err(error) => Response::Error {
                message: error.to_string(),
            },
        },
    }
}
