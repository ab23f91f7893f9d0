//! In-memory fakes for the fetch seam (testing only)
//!
//! `ScriptedPageFetcher` satisfies the `PageFetcher` contract from a
//! per-page script, with no network dependency. Pages not scripted resolve
//! to an empty listing, and the script can be changed between sweeps to
//! model an upstream that degrades or recovers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::{RegistryError, Result};
use crate::fetch::{PageFetcher, PageMeta, Pagination, RawPage};

enum ScriptedResponse {
    Page(RawPage),
    Fail(String),
}

/// `PageFetcher` replaying a scripted set of page responses.
#[derive(Default)]
pub struct ScriptedPageFetcher {
    pages: Mutex<HashMap<u32, ScriptedResponse>>,
    calls: AtomicUsize,
}

impl ScriptedPageFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a successful page carrying `records` and pagination metadata.
    pub fn script_page(&self, page: u32, records: Vec<Value>, total: u64, page_count: u32) {
        self.pages.lock().unwrap().insert(
            page,
            ScriptedResponse::Page(listing_page(records, total, page_count)),
        );
    }

    /// Script a failing page.
    pub fn script_failure(&self, page: u32, message: &str) {
        self.pages
            .lock()
            .unwrap()
            .insert(page, ScriptedResponse::Fail(message.to_string()));
    }

    /// Drop the whole script; every page reads as an empty listing again.
    pub fn clear(&self) {
        self.pages.lock().unwrap().clear();
    }

    /// Number of `fetch_page` calls observed so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for ScriptedPageFetcher {
    async fn fetch_page(&self, page: u32, _page_size: u32) -> Result<RawPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.pages.lock().unwrap().get(&page) {
            Some(ScriptedResponse::Page(raw)) => Ok(raw.clone()),
            Some(ScriptedResponse::Fail(message)) => Err(RegistryError::Http(message.clone())),
            None => Ok(RawPage::default()),
        }
    }
}

/// Build a wire-shaped page without going through JSON.
pub fn listing_page(records: Vec<Value>, total: u64, page_count: u32) -> RawPage {
    RawPage {
        data: records,
        meta: PageMeta {
            pagination: Pagination { total, page_count },
        },
    }
}

/// Minimal valid raw agent record for scripting listings.
pub fn raw_agent(name: &str) -> Value {
    json!({
        "name": name,
        "walletAddress": format!("0x{}", name.to_lowercase()),
        "description": format!("{} agent", name),
    })
}
