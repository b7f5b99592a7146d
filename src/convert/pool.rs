//! Bounded worker pool for conversions.

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::{Error, Result};
use crate::model::{DocumentMetadata, SignatureEntry};

use super::{convert_with_cancel, Artifact, CancellationToken, ConvertOptions};

/// One document to convert.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// Rich-text markup
    pub markup: String,

    /// Document metadata
    pub metadata: DocumentMetadata,

    /// Signature entries, in render order
    pub signatures: Vec<SignatureEntry>,
}

impl ConversionRequest {
    /// Create a request without signatures.
    pub fn new(markup: impl Into<String>, metadata: DocumentMetadata) -> Self {
        Self {
            markup: markup.into(),
            metadata,
            signatures: Vec::new(),
        }
    }

    /// Set signature entries.
    pub fn with_signatures(mut self, signatures: Vec<SignatureEntry>) -> Self {
        self.signatures = signatures;
        self
    }

    fn run(self, options: &ConvertOptions, cancel: &CancellationToken) -> Result<Artifact> {
        convert_with_cancel(&self.markup, self.metadata, self.signatures, options, cancel)
    }
}

/// Fixed-size pool that runs conversions off the caller's thread.
///
/// Each conversion is bounded by `options.timeout`. A conversion that runs
/// past it is cancelled at its next stage or block boundary and reported as
/// [`Error::Timeout`].
pub struct ConversionPool {
    pool: ThreadPool,
    options: ConvertOptions,
}

impl ConversionPool {
    /// Create a pool with `threads` workers (0 = one per CPU).
    pub fn new(threads: usize, options: ConvertOptions) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("lexdoc-worker-{}", i))
            .build()
            .map_err(|e| Error::Other(format!("Failed to start worker pool: {}", e)))?;
        Ok(Self { pool, options })
    }

    /// Get the conversion options.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Number of worker threads.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Convert one request on the pool and wait for it.
    pub fn convert(&self, request: ConversionRequest) -> Result<Artifact> {
        let cancel = CancellationToken::new();
        let worker_cancel = cancel.clone();
        let options = self.options.clone();
        let (tx, rx) = bounded(1);

        self.pool.spawn(move || {
            // The receiver is gone if the caller already timed out.
            let _ = tx.send(request.run(&options, &worker_cancel));
        });

        self.wait(rx, &cancel)
    }

    fn wait(&self, rx: Receiver<Result<Artifact>>, cancel: &CancellationToken) -> Result<Artifact> {
        let Some(limit) = self.options.timeout else {
            return rx.recv().map_err(|_| worker_lost())?;
        };

        match rx.recv_timeout(limit) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                cancel.cancel();
                log::warn!("Conversion exceeded {:?}, cancelled", limit);
                Err(Error::Timeout(limit.as_millis()))
            }
            Err(RecvTimeoutError::Disconnected) => Err(worker_lost()),
        }
    }

    /// Convert many requests in parallel. Results keep input order.
    ///
    /// The timeout applies to each request separately, measured from the
    /// moment a worker picks it up.
    pub fn convert_batch(&self, requests: Vec<ConversionRequest>) -> Vec<Result<Artifact>> {
        let options = &self.options;
        log::debug!(
            "Converting batch of {} on {} workers",
            requests.len(),
            self.threads()
        );

        self.pool.install(|| {
            requests
                .into_par_iter()
                .map(|request| {
                    let cancel = match options.timeout {
                        Some(limit) => CancellationToken::with_deadline(limit),
                        None => CancellationToken::new(),
                    };
                    request.run(options, &cancel)
                })
                .collect()
        })
    }
}

fn worker_lost() -> Error {
    Error::Other("Conversion worker exited without a result".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::ArtifactKind;
    use std::time::Duration;

    fn request(title: &str) -> ConversionRequest {
        ConversionRequest::new(
            format!("<h1>{}</h1><p>Body of {}.</p>", title, title),
            DocumentMetadata::new(title),
        )
    }

    #[test]
    fn test_pool_convert() {
        let pool = ConversionPool::new(2, ConvertOptions::default()).unwrap();
        assert_eq!(pool.threads(), 2);

        let artifact = pool.convert(request("Lease")).unwrap();
        assert_eq!(artifact.kind, ArtifactKind::Docx);
        assert_eq!(artifact.stats.heading_count, 1);
    }

    #[test]
    fn test_pool_with_generous_timeout() {
        let options = ConvertOptions::new().with_timeout(Duration::from_secs(30));
        let pool = ConversionPool::new(1, options).unwrap();
        assert!(pool.convert(request("Deed")).is_ok());
    }

    #[test]
    fn test_batch_keeps_order() {
        let pool = ConversionPool::new(4, ConvertOptions::default()).unwrap();
        let titles = ["One", "Two", "Three", "Four", "Five", "Six"];
        let requests = titles.iter().map(|t| request(t)).collect();

        let results = pool.convert_batch(requests);
        assert_eq!(results.len(), titles.len());
        for (result, title) in results.iter().zip(titles) {
            let artifact = result.as_ref().unwrap();
            // "Body of X." contributes 3 words, the heading 1
            assert_eq!(artifact.stats.word_count, 4, "{}", title);
        }
    }

    #[test]
    fn test_batch_expired_deadline() {
        let options = ConvertOptions::new().with_timeout(Duration::ZERO);
        let pool = ConversionPool::new(2, options).unwrap();
        let results = pool.convert_batch(vec![request("A"), request("B")]);
        assert!(results
            .iter()
            .all(|r| matches!(r, Err(Error::Timeout(0)))));
    }

    #[test]
    fn test_batch_reports_failures_per_request() {
        let options = ConvertOptions::new()
            .with_parse_options(crate::parser::ParseOptions::new().with_max_input_bytes(64));
        let pool = ConversionPool::new(2, options).unwrap();
        let big = ConversionRequest::new("<p>x</p>".repeat(20), DocumentMetadata::new("Big"));

        let results = pool.convert_batch(vec![request("Ok"), big]);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(Error::InputTooLarge { .. })));
    }
}
