//! Backend over caller-supplied stat/open functions

use super::{AssetInfo, AssetReader, Backend};
use async_trait::async_trait;
use std::fmt;
use std::io;

/// Backend built from two plain functions
///
/// Suited to assets compiled into the binary or any other lookup table.
/// The functions run on the request task, so they should not block.
pub struct RawBackend<S, O> {
    stat: S,
    open: O,
}

impl<S, O> RawBackend<S, O>
where
    S: Fn(&str) -> io::Result<AssetInfo> + Send + Sync,
    O: Fn(&str) -> io::Result<AssetReader> + Send + Sync,
{
    pub const fn new(stat: S, open: O) -> Self {
        Self { stat, open }
    }
}

impl<S, O> fmt::Debug for RawBackend<S, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawBackend").finish_non_exhaustive()
    }
}

#[async_trait]
impl<S, O> Backend for RawBackend<S, O>
where
    S: Fn(&str) -> io::Result<AssetInfo> + Send + Sync,
    O: Fn(&str) -> io::Result<AssetReader> + Send + Sync,
{
    async fn stat(&self, path: &str) -> io::Result<AssetInfo> {
        (self.stat)(path)
    }

    async fn open(&self, path: &str) -> io::Result<AssetReader> {
        (self.open)(path)
    }
}
